//! Sequential composition.

use std::collections::VecDeque;

use super::{Step, Steps, abort, drive};
use crate::tasks::{BoxTaskFuture, Context, Executor, Task};

/// Runs its steps one after another.
///
/// - Completes once the last step completes (an empty list completes at once).
/// - The first failing step fails the series; later steps never start.
/// - Abort cancels the in-flight step and every queued one.
pub struct Series {
    steps: Steps,
}

impl Series {
    pub fn new(steps: impl Into<Steps>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    async fn run(self, ctx: Context) {
        let mut queue: VecDeque<Task> = match self.steps.resolve() {
            Ok(tasks) => tasks.into(),
            Err(e) => {
                ctx.fail_with(e);
                return;
            }
        };
        let total = queue.len();
        while let Some(step) = queue.pop_front() {
            match drive(&ctx, &step).await {
                Step::Done(Ok(_)) => {}
                Step::Done(Err(e)) => {
                    tracing::debug!(
                        series = ctx.name(),
                        step = step.name(),
                        done = total - queue.len() - 1,
                        total,
                        "step failed; stopping"
                    );
                    ctx.fail_with(e);
                    return;
                }
                Step::Aborted => {
                    abort(&ctx, queue);
                    return;
                }
            }
        }
        ctx.ok("");
    }
}

impl Executor for Series {
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"series"` task over `steps`.
pub fn series(steps: impl Into<Steps>) -> Task {
    Task::from_executor("series", Series::new(steps))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::TaskError;
    use crate::tasks::Status;

    fn counted(hits: &Arc<AtomicUsize>, fail: bool) -> Task {
        let hits = Arc::clone(hits);
        Task::new("step", move |ctx| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            if fail {
                ctx.fail("broken");
            } else {
                ctx.ok("");
            }
        })
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let last = counted(&hits, false);
        let s = series(vec![counted(&hits, false), counted(&hits, true), last.clone()]);

        assert_eq!(s.run().await, Err(TaskError::failed("broken")));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(last.status(), Status::Pending);
    }

    #[tokio::test]
    async fn empty_completes() {
        assert_eq!(series(Vec::new()).run().await, Ok(String::new()));
    }

    #[tokio::test]
    async fn factory_panic_fails() {
        let s = series(Steps::from_fn(|| panic!("no steps")));
        assert!(matches!(s.run().await, Err(TaskError::Panicked { .. })));
    }
}
