//! Bounded retries of a task factory.

use super::{Step, abort, drive, guarded};
use crate::error::TaskError;
use crate::policies::BackoffPolicy;
use crate::tasks::{BoxTaskFuture, Context, Executor, IntoTask, Task};

/// Runs `f(attempt)` up to `attempts` times, stopping at the first success.
///
/// - Success of any attempt completes the retry with that attempt's message.
/// - After the last failed attempt, the retry fails with that attempt's error;
///   earlier errors are only logged.
/// - `attempts == 0` fails at once.
/// - Abort cancels the running attempt and stops further attempts.
/// - With a [`BackoffPolicy`], the retry sleeps between attempts (cancellably).
pub struct Retry<F> {
    attempts: u32,
    f: F,
    backoff: Option<BackoffPolicy>,
}

impl<F, R> Retry<F>
where
    F: FnMut(u32) -> R + Send + 'static,
    R: IntoTask + 'static,
{
    pub fn new(attempts: u32, f: F) -> Self {
        Self {
            attempts,
            f,
            backoff: None,
        }
    }

    /// Sleeps `policy.delay_after(n)` after the n-th failed attempt.
    pub fn with_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = Some(policy);
        self
    }

    /// Wraps the retry into a `"retry"` task.
    pub fn into_task(self) -> Task {
        Task::from_executor("retry", self)
    }

    async fn run(mut self, ctx: Context) {
        let mut last = None;
        for attempt in 1..=self.attempts {
            if attempt > 1 {
                if let Some(policy) = &self.backoff {
                    let wait = policy.delay_after(attempt - 1);
                    tokio::select! {
                        biased;
                        _ = ctx.cancelled() => {
                            abort(&ctx, []);
                            return;
                        }
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
            }
            if ctx.is_cancelled() {
                abort(&ctx, []);
                return;
            }
            let f = &mut self.f;
            let task = match guarded(|| f(attempt)) {
                Ok(task) => task,
                Err(e) => {
                    ctx.fail_with(e);
                    return;
                }
            };
            match drive(&ctx, &task).await {
                Step::Done(Ok(msg)) => {
                    ctx.ok(msg);
                    return;
                }
                Step::Done(Err(e)) => {
                    ctx.log(format_args!("attempt {attempt}/{} failed: {e}", self.attempts));
                    last = Some(e);
                }
                Step::Aborted => {
                    abort(&ctx, []);
                    return;
                }
            }
        }
        ctx.fail_with(last.unwrap_or_else(|| TaskError::failed("retry: no attempts allowed")));
    }
}

impl<F, R> Executor for Retry<F>
where
    F: FnMut(u32) -> R + Send + 'static,
    R: IntoTask + 'static,
{
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"retry"` task without backoff. See [`Retry`] for the builder form.
pub fn retry<F, R>(attempts: u32, f: F) -> Task
where
    F: FnMut(u32) -> R + Send + 'static,
    R: IntoTask + 'static,
{
    Retry::new(attempts, f).into_task()
}
