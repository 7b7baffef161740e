//! # Executor abstraction and function-backed implementation.
//!
//! An [`Executor`] is the body of a [`Task`](crate::Task): it is consumed by the
//! task's single run and receives the run's [`Context`].
//!
//! [`ExecFn`] wraps a closure `F: FnOnce(Context) -> Fut`. The closure itself is
//! called synchronously inside [`Task::run`](crate::Task::run); the future it
//! returns is spawned on the ambient tokio runtime.
//!
//! ## Example
//! ```rust
//! use taskweave::{Context, Task};
//!
//! let t = Task::new("hello", |ctx: Context| async move {
//!     ctx.log("saying hello");
//!     ctx.ok("hello");
//! });
//! assert_eq!(t.name(), "hello");
//! ```

use std::future::Future;
use std::pin::Pin;

use super::context::Context;

/// Boxed future produced by an executor.
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// # Body of a task.
///
/// Implementations call `ctx.ok(..)` or `ctx.fail(..)` exactly once (extra calls are
/// ignored) and may `log` before that. Supporting cancellation means watching
/// [`Context::cancelled`] or registering [`Context::on_abort`].
///
/// Returning from the future without completing is allowed as long as some other
/// clone of the context (e.g. moved into a spawned future) completes it later;
/// once every clone is gone the task fails with
/// [`TaskError::Abandoned`](crate::TaskError::Abandoned).
pub trait Executor: Send + 'static {
    /// Starts the body. Called at most once, synchronously from `Task::run`.
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture;
}

/// Function-backed executor.
pub struct ExecFn<F> {
    f: F,
}

impl<F> ExecFn<F> {
    /// Wraps a closure as an executor.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> Executor for ExecFn<F>
where
    F: FnOnce(Context) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn execute(self: Box<Self>, ctx: Context) -> BoxTaskFuture {
        Box::pin((self.f)(ctx))
    }
}
