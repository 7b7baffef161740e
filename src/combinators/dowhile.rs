//! Post-tested loop.

use super::{Condition, Step, abort, drive, guarded};
use crate::tasks::{BoxTaskFuture, Context, Executor, IntoTask, Task};

/// Runs `f()`, then re-evaluates the condition; loops while it holds.
///
/// The body always runs at least once. A failing iteration fails the loop.
pub struct DoWhile<C, F> {
    condition: C,
    f: F,
}

impl<C, F, R> DoWhile<C, F>
where
    C: Condition,
    F: FnMut() -> R + Send + 'static,
    R: IntoTask,
{
    pub fn new(condition: C, f: F) -> Self {
        Self { condition, f }
    }

    async fn run(mut self, ctx: Context) {
        let mut iterations = 0u64;
        loop {
            if ctx.is_cancelled() {
                abort(&ctx, []);
                return;
            }
            let task = match guarded(&mut self.f) {
                Ok(task) => task,
                Err(e) => {
                    ctx.fail_with(e);
                    return;
                }
            };
            match drive(&ctx, &task).await {
                Step::Done(Ok(_)) => iterations += 1,
                Step::Done(Err(e)) => {
                    ctx.fail_with(e);
                    return;
                }
                Step::Aborted => {
                    abort(&ctx, []);
                    return;
                }
            }
            let again = tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    abort(&ctx, []);
                    return;
                }
                again = self.condition.check() => again,
            };
            if !again {
                tracing::debug!(task = ctx.name(), iterations, "loop condition no longer holds");
                ctx.ok("");
                return;
            }
        }
    }
}

impl<C, F, R> Executor for DoWhile<C, F>
where
    C: Condition,
    F: FnMut() -> R + Send + 'static,
    R: IntoTask + 'static,
{
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"dowhile"` task running `f()` until `condition` turns false.
pub fn dowhile<C, F, R>(condition: C, f: F) -> Task
where
    C: Condition,
    F: FnMut() -> R + Send + 'static,
    R: IntoTask + 'static,
{
    Task::from_executor("dowhile", DoWhile::new(condition, f))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn body_runs_until_condition_fails() {
        let runs = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&runs);
        let body = Arc::clone(&runs);

        let t = dowhile(
            move || {
                let n = seen.load(Ordering::SeqCst);
                async move { n < 3 }
            },
            move || {
                body.fetch_add(1, Ordering::SeqCst);
                Task::new("body", |ctx: Context| async move { ctx.ok("") })
            },
        );

        assert_eq!(t.run().await, Ok(String::new()));
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn runs_at_least_once() {
        let runs = Arc::new(AtomicU32::new(0));
        let body = Arc::clone(&runs);
        let t = dowhile(
            || async { false },
            move || {
                body.fetch_add(1, Ordering::SeqCst);
                Task::new("body", |ctx: Context| async move { ctx.ok("") })
            },
        );
        assert!(t.run().await.is_ok());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
