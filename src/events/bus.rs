//! # Event bus for handing task events to async consumers.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. It implements
//! [`Subscribe`], so it can be attached to any task with
//! [`Task::subscribe`](crate::Task::subscribe); every event the task (and its
//! children, via combinator re-emission) produces is published on the bus.
//!
//! ## Architecture
//! ```text
//! Task tree (sync listeners):          Async consumers (many):
//!   child ──► combinator ──► Bus ───────► receiver 1 (e.g. a log shipper)
//!                       (broadcast chan)└► receiver N
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;
use crate::subscribers::Subscribe;

/// Broadcast channel for task events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately (send clones internally).
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// - Capacity is **shared** across all receivers (not per-receiver).
    /// - The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// A receiver only gets events **sent after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Subscribe for Bus {
    fn on_event(&self, event: &Event) {
        let _ = self.tx.send(event.clone());
    }

    fn name(&self) -> &'static str {
        "bus"
    }
}
