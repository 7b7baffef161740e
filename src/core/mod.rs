//! Runtime core: command-line dispatch and process lifecycle.
//!
//! - [`runner`]: maps a task name from the command line to a registered task,
//!   runs it with the configured subscribers and handles shutdown signals;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod runner;
mod shutdown;

pub use runner::Runner;
