//! Failure recovery.

use super::{Child, Step, abort, drive};
use crate::tasks::{BoxTaskFuture, Context, Executor, Task};

/// Runs `attempt`; on failure runs `recover` instead of failing.
///
/// Without a `recover` branch a failure of `attempt` is swallowed and the task
/// completes with an empty message. Aborts are never caught.
pub struct TryCatch {
    attempt: Child,
    recover: Option<Child>,
}

impl TryCatch {
    pub fn new(attempt: impl Into<Child>, recover: Option<Child>) -> Self {
        Self {
            attempt: attempt.into(),
            recover,
        }
    }

    async fn run(self, ctx: Context) {
        let recover = self.recover;
        let task = match self.attempt.build() {
            Ok(task) => task,
            Err(e) => {
                if let Some(recover) = recover {
                    recover.discard();
                }
                ctx.fail_with(e);
                return;
            }
        };
        let err = match drive(&ctx, &task).await {
            Step::Done(Ok(msg)) => {
                if let Some(recover) = recover {
                    recover.discard();
                }
                ctx.ok(msg);
                return;
            }
            Step::Done(Err(e)) => e,
            Step::Aborted => {
                if let Some(recover) = recover {
                    recover.discard();
                }
                abort(&ctx, []);
                return;
            }
        };

        ctx.log(format_args!("caught: {err}"));
        let Some(recover) = recover else {
            ctx.ok("");
            return;
        };
        let task = match recover.build() {
            Ok(task) => task,
            Err(e) => {
                ctx.fail_with(e);
                return;
            }
        };
        match drive(&ctx, &task).await {
            Step::Done(result) => ctx.finish(result),
            Step::Aborted => abort(&ctx, []),
        }
    }
}

impl Executor for TryCatch {
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"trycatch"` task that swallows a failure of `attempt`.
pub fn trycatch(attempt: impl Into<Child>) -> Task {
    Task::from_executor("trycatch", TryCatch::new(attempt, None))
}

/// A `"trycatch"` task running `recover` when `attempt` fails.
pub fn trycatch_with(attempt: impl Into<Child>, recover: impl Into<Child>) -> Task {
    Task::from_executor("trycatch", TryCatch::new(attempt, Some(recover.into())))
}
