//! # Example: cli
//!
//! A tiny task runner: the first argument selects a task.
//!
//! ```text
//! cargo run --example cli               # lists tasks
//! cargo run --example cli -- hello      # runs "hello"
//! cargo run --example cli -- serve      # runs until Ctrl-C, then cancels within the grace period
//! cargo run --example cli -- dev src   # restarts `cargo check` whenever src/ changes
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use taskweave::{Config, Context, LogWriter, Runner, Subscribe, Task, leaf, series, watch};
use tracing_subscriber::EnvFilter;

fn serve() -> Task {
    Task::new("serve", |ctx: Context| async move {
        let mut ticks = 0u64;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    ctx.log(format_args!("stopping after {ticks} ticks"));
                    ctx.fail_with(ctx.abort_error());
                    return;
                }
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    ticks += 1;
                    ctx.log(format_args!("tick {ticks}"));
                }
            }
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let watched = args.get(2).cloned().unwrap_or_else(|| "src".to_string());

    let cfg = Config {
        grace: Duration::from_secs(2),
        ..Config::default()
    };
    let log: Arc<dyn Subscribe> = Arc::new(LogWriter::with_config(&cfg));

    let runner = Runner::new(cfg)
        .with_subscribers(vec![log])
        .with_task("hello", leaf::ok("hello, world"))
        .with_task("check", series(vec![leaf::shell("cargo fmt --check"), leaf::shell("cargo check")]))
        .with_task("serve", serve())
        .with_task("dev", watch([watched], || leaf::shell("cargo check")));

    match runner.dispatch(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.as_message());
            ExitCode::FAILURE
        }
    }
}
