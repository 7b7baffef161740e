//! # Combinators: tasks built from other tasks.
//!
//! Every combinator is an [`Executor`](crate::Executor) struct plus a convenience
//! constructor returning a ready [`Task`]. They share one protocol:
//!
//! ```text
//! combinator run
//!   ├─► build child (task or factory; panics/errors fail the combinator)
//!   ├─► ctx.adopt(child)        child events re-emitted upward
//!   ├─► child.run()
//!   └─► select! (biased)
//!         ├─ ctx.cancelled()  ─► cancel active children ─► await them ─► fail(Aborted)
//!         └─ child outcome    ─► next step / complete / propagate failure
//! ```
//!
//! ## Rules
//! - Cancellation is checked before every child is built and at every await.
//! - A combinator completes at most once (guaranteed by its [`Context`]).
//! - A combinator settles only after every child it started has settled, so
//!   child terminal events always precede the combinator's own.
//! - Child failures propagate unchanged, except where a combinator documents
//!   otherwise (`retry`, `watch`, `trycatch`).
//!
//! ## Child arguments
//! - [`Child`]: a single task or a factory closure, for `timeout`, `delay_then`,
//!   `ifelse`, `trycatch`.
//! - [`Steps`]: a task list or a factory producing one, for `series` / `parallel`.
//! - Factories return anything [`IntoTask`]: a [`Task`] or `Result<Task, E>`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::{Context, IntoTask, Outcome, Task};

mod branch;
mod condition;
mod delay;
mod dowhile;
mod dynamic;
mod each;
mod parallel;
mod repeat;
mod retry;
mod series;
mod timeout;
mod trycatch;
mod watch;

pub use branch::{IfElse, ifelse, ifthen};
pub use condition::Condition;
pub use delay::{Delay, delay, delay_then};
pub use dowhile::{DoWhile, dowhile};
pub use dynamic::build;
pub use each::{Each, each};
pub use parallel::{Parallel, parallel};
pub use repeat::{Repeat, repeat};
pub use retry::{Retry, retry};
pub use series::{Series, series};
pub use timeout::{Timeout, timeout};
pub use trycatch::{TryCatch, trycatch, trycatch_with};
pub use watch::{Watch, watch};

type ChildFactory = Box<dyn FnOnce() -> Result<Task, TaskError> + Send>;
type StepsFactory = Box<dyn FnOnce() -> Result<Vec<Task>, TaskError> + Send>;

/// A child given to a combinator: an existing task or a factory building one.
pub enum Child {
    /// A task created up front.
    Ready(Task),
    /// Built when the combinator reaches it.
    Factory(ChildFactory),
}

impl Child {
    /// Builds (or returns) the task. Panics and factory errors become `Err`.
    pub(crate) fn build(self) -> Result<Task, TaskError> {
        match self {
            Child::Ready(task) => Ok(task),
            Child::Factory(f) => guarded(f),
        }
    }

    /// Cancels a ready task that will never be started.
    pub(crate) fn discard(self) {
        if let Child::Ready(task) = self {
            task.cancel();
        }
    }
}

impl From<Task> for Child {
    fn from(task: Task) -> Self {
        Child::Ready(task)
    }
}

impl<F, R> From<F> for Child
where
    F: FnOnce() -> R + Send + 'static,
    R: IntoTask,
{
    fn from(f: F) -> Self {
        Child::Factory(Box::new(move || f().into_task()))
    }
}

/// Children of `series` / `parallel`: a task list or a factory producing one.
pub enum Steps {
    /// Tasks created up front.
    Tasks(Vec<Task>),
    /// Built when the combinator starts.
    Factory(StepsFactory),
}

impl Steps {
    /// Steps produced by `f` when the combinator starts.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() -> Vec<Task> + Send + 'static,
    {
        Steps::Factory(Box::new(move || Ok(f())))
    }

    /// Like [`Steps::from_fn`], for factories that can fail.
    pub fn try_from_fn<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<Vec<Task>, E> + Send + 'static,
        E: Into<TaskError>,
    {
        Steps::Factory(Box::new(move || f().map_err(Into::into)))
    }

    pub(crate) fn resolve(self) -> Result<Vec<Task>, TaskError> {
        match self {
            Steps::Tasks(tasks) => Ok(tasks),
            Steps::Factory(f) => catch_unwind(AssertUnwindSafe(f))
                .unwrap_or_else(|payload| Err(TaskError::from_panic(payload))),
        }
    }
}

impl From<Vec<Task>> for Steps {
    fn from(tasks: Vec<Task>) -> Self {
        Steps::Tasks(tasks)
    }
}

impl<const N: usize> From<[Task; N]> for Steps {
    fn from(tasks: [Task; N]) -> Self {
        Steps::Tasks(tasks.into())
    }
}

/// Result of driving one child.
pub(crate) enum Step {
    /// The child reached a terminal state.
    Done(Result<String, TaskError>),
    /// The combinator was aborted; the child has been cancelled.
    Aborted,
}

/// Runs `child` under `ctx`: forwards its events and races it against `ctx`'s abort.
///
/// On abort the child is cancelled and awaited, so its terminal event reaches
/// `ctx`'s listeners before `ctx` completes.
pub(crate) async fn drive(ctx: &Context, child: &Task) -> Step {
    if ctx.is_cancelled() {
        child.cancel_with(ctx.abort_error().reason());
        return Step::Aborted;
    }
    ctx.adopt(child);
    let mut outcome = child.run();
    tokio::select! {
        biased;
        _ = ctx.cancelled() => {
            stop(ctx, child, outcome, ctx.abort_error().reason()).await;
            Step::Aborted
        }
        res = &mut outcome => Step::Done(res),
    }
}

/// Cancels a running child with `reason` and waits until it settled.
pub(crate) async fn stop(ctx: &Context, child: &Task, outcome: Outcome, reason: impl Into<Arc<str>>) {
    child.cancel_with(reason);
    if let Err(e) = outcome.await {
        tracing::debug!(task = ctx.name(), child = child.name(), error = %e, "child stopped");
    }
}

/// Cancels every task in `pending` and fails `ctx` with its abort error.
///
/// Only for tasks that are not running: a running child is stopped with
/// [`stop`] (or [`drive`]) first.
pub(crate) fn abort(ctx: &Context, pending: impl IntoIterator<Item = Task>) {
    let err = ctx.abort_error();
    let reason = err.reason();
    for task in pending {
        task.cancel_with(reason.as_str());
    }
    ctx.fail_with(err);
}

/// Calls a task factory, turning a panic into an error.
pub(crate) fn guarded<R: IntoTask>(f: impl FnOnce() -> R) -> Result<Task, TaskError> {
    catch_unwind(AssertUnwindSafe(f))
        .map_err(TaskError::from_panic)
        .and_then(IntoTask::into_task)
}
