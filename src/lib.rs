//! # taskweave
//!
//! **Taskweave** composes asynchronous units of work ("tasks") into workflows.
//!
//! Every task has the same run-once lifecycle, cooperative cancellation and a
//! structured event stream. Combinators (`series`, `parallel`, `retry`,
//! `timeout`, `watch`, ..) are tasks themselves, so workflows nest freely.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  leaf task   │   │  leaf task   │   │  leaf task   │
//!     │ (shell, ok..)│   │  (closure)   │   │  (closure)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Combinator task (series / parallel / retry / timeout / watch ..) │
//! │  - adopts children (re-emits their events)                        │
//! │  - drives them: select!{ cancelled, child outcome, timer }        │
//! │  - on abort: cancels active children, fails "aborted"             │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                    Context::emit (synchronous)
//!                                ▼
//!                ┌───────────────┼────────────────┐
//!                ▼               ▼                ▼
//!            LogWriter       Bus (broadcast)   Fn(&Event)
//!           (stdout line)   ─► async receivers
//! ```
//!
//! ### Lifecycle
//! ```text
//! Task::new(name, |ctx| async { .. })
//!   │
//!   ├─► subscribe(listener)*          only while Pending
//!   ├─► run() ──► Outcome (Deferred<String>)
//!   │     ├─ emit Started
//!   │     ├─ executor(ctx) called synchronously, future spawned
//!   │     ├─ ctx.log(..)*             Log events
//!   │     └─ ctx.ok(..) | ctx.fail(..) first call wins ─► Completed | Failed
//!   │
//!   └─► cancel()
//!         ├─ Pending: run() is refused
//!         └─ Running: ctx.cancelled() fires, on_abort hook runs once
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / functions                          |
//! |-------------------|-------------------------------------------------------------|------------------------------------------------|
//! | **Tasks**         | Run-once units of work and their execution context.         | [`Task`], [`Context`], [`Executor`]            |
//! | **Combinators**   | Compose tasks into sequential/concurrent workflows.         | [`series`], [`parallel`], [`retry`], [`watch`] |
//! | **Deferred**      | Settle-once result futures.                                 | [`Deferred`], [`Resolver`]                     |
//! | **Events**        | Structured lifecycle stream and listeners.                  | [`Event`], [`Subscribe`], [`Bus`]              |
//! | **Policies**      | Delays between retry attempts.                              | [`BackoffPolicy`], [`JitterPolicy`]            |
//! | **Dispatch**      | Loosely-typed construction via overload tables.             | [`combinators::build`], [`signature`]          |
//! | **Runner**        | Pick a named task from the command line, handle signals.    | [`Runner`], [`Config`]                         |
//! | **Errors**        | Typed errors for tasks, dispatch and the runner.            | [`TaskError`], [`RuntimeError`]                |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskweave::{Context, Task, TaskError, leaf, parallel, retry, series, timeout};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     let fetch = |attempt: u32| {
//!         Task::new("fetch", move |ctx: Context| async move {
//!             if attempt < 2 {
//!                 ctx.fail("connection reset");
//!             } else {
//!                 ctx.ok("payload");
//!             }
//!         })
//!     };
//!
//!     let flow = series(vec![
//!         leaf::ok("prepared"),
//!         parallel(vec![
//!             retry(3, fetch),
//!             timeout(Duration::from_secs(1), leaf::noop()),
//!         ]),
//!     ]);
//!
//!     flow.run_with(|ev: &taskweave::Event| println!("{} {}", ev.kind.as_label(), ev.task))
//!         .await?;
//!     Ok(())
//! }
//! ```
pub mod combinators;
mod config;
mod core;
mod deferred;
mod error;
mod events;
pub mod leaf;
mod policies;
pub mod signature;
mod subscribers;
mod sync;
mod tasks;

// ---- Public re-exports ----

pub use combinators::{
    Child, Condition, Steps, delay, delay_then, dowhile, each, ifelse, ifthen, parallel, repeat,
    retry, series, timeout, trycatch, trycatch_with, watch,
};
pub use config::Config;
pub use crate::core::Runner;
pub use deferred::{Deferred, Resolver};
pub use error::{ABORTED, RuntimeError, SignatureError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{LogWriter, Subscribe, format_event};
pub use tasks::{BoxTaskFuture, Context, ExecFn, Executor, IntoTask, Outcome, Status, Task, format_message};
