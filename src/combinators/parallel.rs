//! Concurrent composition.

use futures::StreamExt;
use futures::stream::FuturesUnordered;

use super::{Steps, abort};
use crate::error::ABORTED;
use crate::tasks::{BoxTaskFuture, Context, Executor, Task};

/// Starts every step at once.
///
/// - Completes when all steps completed (an empty list completes at once).
/// - The first failure fails the group; siblings still running are cancelled
///   and awaited first.
/// - Abort cancels every step that is still running and awaits them.
pub struct Parallel {
    steps: Steps,
}

impl Parallel {
    pub fn new(steps: impl Into<Steps>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    async fn run(self, ctx: Context) {
        let tasks = match self.steps.resolve() {
            Ok(tasks) => tasks,
            Err(e) => {
                ctx.fail_with(e);
                return;
            }
        };
        if ctx.is_cancelled() {
            abort(&ctx, tasks);
            return;
        }
        for task in &tasks {
            ctx.adopt(task);
        }
        let mut running: FuturesUnordered<_> = tasks.iter().map(Task::run).collect();

        let failure = loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => break ctx.abort_error(),
                next = running.next() => match next {
                    None => {
                        ctx.ok("");
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break e,
                },
            }
        };

        let reason = if ctx.is_cancelled() {
            ctx.abort_error().reason()
        } else {
            ABORTED.to_string()
        };
        for task in &tasks {
            task.cancel_with(reason.as_str());
        }
        while running.next().await.is_some() {}
        ctx.fail_with(failure);
    }
}

impl Executor for Parallel {
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"parallel"` task over `steps`.
pub fn parallel(steps: impl Into<Steps>) -> Task {
    Task::from_executor("parallel", Parallel::new(steps))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::TaskError;
    use crate::tasks::Status;

    fn sleeper(ms: u64) -> Task {
        Task::new("sleeper", move |ctx: Context| async move {
            tokio::select! {
                _ = ctx.cancelled() => ctx.fail_with(ctx.abort_error()),
                _ = tokio::time::sleep(Duration::from_millis(ms)) => ctx.ok(ms),
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_all() {
        let started = tokio::time::Instant::now();
        let p = parallel([sleeper(30), sleeper(10), sleeper(20)]);
        assert_eq!(p.run().await, Ok(String::new()));
        assert!(started.elapsed() < Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_cancels_siblings() {
        let slow = sleeper(1_000);
        let broken = Task::new("broken", |ctx: Context| async move { ctx.fail("nope") });
        let p = parallel([slow.clone(), broken]);

        assert_eq!(p.run().await, Err(TaskError::failed("nope")));
        assert!(slow.is_cancelled());
        assert_eq!(slow.status(), Status::Failed);
    }
}
