//! Time-bounded execution.

use std::time::Duration;

use super::{Child, abort, stop};
use crate::error::TaskError;
use crate::tasks::{BoxTaskFuture, Context, Executor, Task};

/// Cancel reason given to a child that ran out of time.
const TIMED_OUT: &str = "timeout";

/// Races a child against a timer.
///
/// - Child settles first: its outcome is reflected as is.
/// - Timer fires first: the child is cancelled and, once it settled, the task
///   fails with [`TaskError::Timeout`].
pub struct Timeout {
    limit: Duration,
    child: Child,
}

impl Timeout {
    pub fn new(limit: Duration, child: impl Into<Child>) -> Self {
        Self {
            limit,
            child: child.into(),
        }
    }

    async fn run(self, ctx: Context) {
        if ctx.is_cancelled() {
            self.child.discard();
            abort(&ctx, []);
            return;
        }
        let task = match self.child.build() {
            Ok(task) => task,
            Err(e) => {
                ctx.fail_with(e);
                return;
            }
        };
        ctx.adopt(&task);
        let mut outcome = task.run();
        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                stop(&ctx, &task, outcome, ctx.abort_error().reason()).await;
                abort(&ctx, []);
            }
            res = &mut outcome => ctx.finish(res),
            _ = tokio::time::sleep(self.limit) => {
                tracing::debug!(task = ctx.name(), child = task.name(), limit = ?self.limit, "timed out");
                stop(&ctx, &task, outcome, TIMED_OUT).await;
                ctx.fail_with(TaskError::Timeout { timeout: self.limit });
            }
        }
    }
}

impl Executor for Timeout {
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"timeout"` task failing when `child` takes longer than `limit`.
pub fn timeout(limit: Duration, child: impl Into<Child>) -> Task {
    Task::from_executor("timeout", Timeout::new(limit, child))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sleeper(ms: u64) -> Task {
        Task::new("sleeper", move |ctx: Context| async move {
            tokio::select! {
                _ = ctx.cancelled() => ctx.fail_with(ctx.abort_error()),
                _ = tokio::time::sleep(Duration::from_millis(ms)) => ctx.ok("slept"),
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fast_child_wins() {
        let t = timeout(Duration::from_millis(100), sleeper(10));
        assert_eq!(t.run().await, Ok("slept".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_child_is_cancelled() {
        let child = sleeper(1_000);
        let t = timeout(Duration::from_millis(100), child.clone());
        assert_eq!(
            t.run().await,
            Err(TaskError::Timeout {
                timeout: Duration::from_millis(100)
            })
        );
        assert!(child.is_cancelled());
        assert_eq!(child.status(), crate::tasks::Status::Failed);
    }
}
