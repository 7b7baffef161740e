//! Deferred start.

use std::time::Duration;

use super::{Child, Step, abort, drive};
use crate::tasks::{BoxTaskFuture, Context, Executor, Task};

/// Waits, then completes or runs a child.
pub struct Delay {
    wait: Duration,
    child: Option<Child>,
}

impl Delay {
    pub fn new(wait: Duration, child: Option<Child>) -> Self {
        Self { wait, child }
    }

    async fn run(self, ctx: Context) {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                if let Some(child) = self.child {
                    child.discard();
                }
                abort(&ctx, []);
                return;
            }
            _ = tokio::time::sleep(self.wait) => {}
        }
        let Some(child) = self.child else {
            ctx.ok("");
            return;
        };
        let task = match child.build() {
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

impl Executor for Delay {
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"delay"` task completing after `wait`.
pub fn delay(wait: Duration) -> Task {
    Task::from_executor("delay", Delay::new(wait, None))
}

/// A `"delay"` task running `child` after `wait`.
pub fn delay_then(wait: Duration, child: impl Into<Child>) -> Task {
    Task::from_executor("delay", Delay::new(wait, Some(child.into())))
}
