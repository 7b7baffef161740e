//! Shell command leaf.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::tasks::{Context, Task};

/// A task running `command` through the platform shell (`sh -c` / `cmd /C`).
///
/// - Every stdout/stderr line is logged.
/// - Exit status zero completes the task; anything else fails it.
/// - Abort kills the process and fails with the abort error.
pub fn shell(command: impl Into<String>) -> Task {
    let command = command.into();
    Task::new("shell", move |ctx: Context| async move {
        ctx.log(format_args!("$ {command}"));
        let mut child = match platform_shell(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                ctx.fail(format_args!("cannot spawn `{command}`: {e}"));
                return;
            }
        };
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = async {
            let (_, _, status) = tokio::join!(pump(&ctx, stdout), pump(&ctx, stderr), child.wait());
            status
        };
        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                tracing::debug!(command = %command, "killing shell command");
                ctx.fail_with(ctx.abort_error());
            }
            status = finished => match status {
                Ok(status) if status.success() => ctx.ok(""),
                Ok(status) => ctx.fail(format_args!("`{command}` {status}")),
                Err(e) => ctx.fail(format_args!("`{command}`: {e}")),
            },
        }
    })
}

#[cfg(unix)]
fn platform_shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn platform_shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

async fn pump<R>(ctx: &Context, stream: Option<R>)
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return;
    };
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        ctx.log(line);
    }
}
