//! # Task abstractions.
//!
//! This module provides the core task-related types:
//! - [`Task`] - run-once handle with lifecycle, listeners and cancellation
//! - [`Context`] - capability object handed to an executor (`log`/`ok`/`fail`/`on_abort`)
//! - [`Executor`] - trait for the body of a task; [`ExecFn`] backs it with a closure
//! - [`Outcome`] - the settle-once future returned by [`Task::run`]
//! - [`format_message`] - message joining rules shared by `log`/`ok`/`fail`

mod context;
mod executor;
mod format;
mod task;

pub use context::Context;
pub use executor::{BoxTaskFuture, ExecFn, Executor};
pub use format::format_message;
pub use task::{IntoTask, Outcome, Status, Task};
