//! # Leaf tasks and change sources.
//!
//! Leaves are tasks without children. They follow the leaf contract:
//! log any number of times, then call `ok` or `fail` exactly once, and react to
//! aborts either through [`Context::on_abort`](crate::Context::on_abort) or by
//! selecting on [`Context::cancelled`](crate::Context::cancelled).
//!
//! - [`ok`], [`fail`], [`noop`]: constant outcomes, handy as placeholders.
//! - [`shell`]: runs a command through the platform shell, logging its output.
//! - [`ChangeSource`]: file-change notifications consumed by [`watch`](crate::watch),
//!   implemented by [`PollWatcher`] and [`ChannelSource`].

mod basic;
mod shell;
mod watcher;

pub use basic::{fail, noop, ok};
pub use shell::shell;
pub use watcher::{ChangeSource, ChannelSource, PollWatcher};
