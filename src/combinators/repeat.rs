//! Counted repetition.

use super::{Step, abort, drive, guarded};
use crate::tasks::{BoxTaskFuture, Context, Executor, IntoTask, Task};

/// Runs `f(1)`, `f(2)`, .., `f(times)` sequentially.
///
/// The first failure fails the repeat. `times == 0` completes at once.
pub struct Repeat<F> {
    times: u32,
    f: F,
}

impl<F, R> Repeat<F>
where
    F: FnMut(u32) -> R + Send + 'static,
    R: IntoTask,
{
    pub fn new(times: u32, f: F) -> Self {
        Self { times, f }
    }

    async fn run(mut self, ctx: Context) {
        for i in 1..=self.times {
            if ctx.is_cancelled() {
                abort(&ctx, []);
                return;
            }
            let f = &mut self.f;
            let task = match guarded(|| f(i)) {
                Ok(task) => task,
                Err(e) => {
                    ctx.fail_with(e);
                    return;
                }
            };
            match drive(&ctx, &task).await {
                Step::Done(Ok(_)) => {}
                Step::Done(Err(e)) => {
                    ctx.fail_with(e);
                    return;
                }
                Step::Aborted => {
                    abort(&ctx, []);
                    return;
                }
            }
        }
        ctx.ok("");
    }
}

impl<F, R> Executor for Repeat<F>
where
    F: FnMut(u32) -> R + Send + 'static,
    R: IntoTask + 'static,
{
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// A `"repeat"` task running `f(i)` for `i` in `1..=times`.
pub fn repeat<F, R>(times: u32, f: F) -> Task
where
    F: FnMut(u32) -> R + Send + 'static,
    R: IntoTask + 'static,
{
    Task::from_executor("repeat", Repeat::new(times, f))
}
