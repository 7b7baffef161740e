//! Task events: data model and broadcast bus.
//!
//! This module groups the event **data model** emitted by every task run and
//! the **bus** used to hand events to asynchronous consumers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: every running [`Context`](crate::Context) (own events) and every
//!   combinator (re-emitted child events).
//! - **Consumers**: listeners registered with [`Task::subscribe`](crate::Task::subscribe);
//!   the [`Bus`] is one such listener that fans events out to async receivers.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
