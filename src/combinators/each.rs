//! Sequential iteration over a collection.

use std::collections::VecDeque;

use super::{Step, abort, drive, guarded};
use crate::tasks::{BoxTaskFuture, Context, Executor, IntoTask, Task};

/// Builds one task per element and runs them in order.
///
/// Tasks are built lazily: the factory for element `i + 1` is only called once
/// the task for element `i` completed. The first failure stops the iteration.
pub struct Each<T, F> {
    items: VecDeque<T>,
    f: F,
}

impl<T, F, R> Each<T, F>
where
    T: Send + 'static,
    F: FnMut(T) -> R + Send + 'static,
    R: IntoTask,
{
    pub fn new(items: impl IntoIterator<Item = T>, f: F) -> Self {
        Self {
            items: items.into_iter().collect(),
            f,
        }
    }

    async fn run(mut self, ctx: Context) {
        while let Some(item) = self.items.pop_front() {
            if ctx.is_cancelled() {
                abort(&ctx, []);
                return;
            }
            let f = &mut self.f;
            let task = match guarded(|| f(item)) {
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

impl<T, F, R> Executor for Each<T, F>
where
    T: Send + 'static,
    F: FnMut(T) -> R + Send + 'static,
    R: IntoTask + 'static,
{
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((*self).run(ctx))
    }
}

/// An `"each"` task mapping every element of `items` to a task via `f`.
pub fn each<T, F, R>(items: impl IntoIterator<Item = T>, f: F) -> Task
where
    T: Send + 'static,
    F: FnMut(T) -> R + Send + 'static,
    R: IntoTask + 'static,
{
    Task::from_executor("each", Each::new(items, f))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::TaskError;

    #[tokio::test]
    async fn visits_in_order_and_stops_on_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let t = each(["a", "b", "c"], move |item: &'static str| {
            let sink = Arc::clone(&sink);
            Task::new(item, move |ctx: Context| async move {
                sink.lock().unwrap().push(item);
                if item == "b" {
                    ctx.fail("b is bad");
                } else {
                    ctx.ok(item);
                }
            })
        });

        assert_eq!(t.run().await, Err(TaskError::failed("b is bad")));
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn factory_error_fails() {
        let t = each(1..=3, |n: u32| {
            if n == 2 {
                Err(TaskError::failed("cannot build 2"))
            } else {
                Ok(Task::new("n", |ctx: Context| async move { ctx.ok("") }))
            }
        });
        assert_eq!(t.run().await, Err(TaskError::failed("cannot build 2")));
    }
}
