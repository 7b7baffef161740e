//! # Events emitted by running tasks.
//!
//! The [`EventKind`] enum classifies what happened during a run:
//! - **Entry**: `Started`, emitted once when `run` begins
//! - **Progress**: `Log`, emitted zero or more times by the executor
//! - **Terminal**: `Completed` or `Failed`, emitted exactly once
//!
//! The [`Event`] struct carries the emitting task's id and name, a timestamp and
//! an optional message (`data`).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Events of one task are delivered to its listeners in emission order; a combinator
//! re-emits child events unchanged, so the `id`/`task` fields still name the child.
//!
//! ## Example
//! ```rust
//! use taskweave::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Failed, 7, "build").with_data("boom");
//!
//! assert_eq!(ev.kind, EventKind::Failed);
//! assert_eq!(&*ev.task, "build");
//! assert_eq!(ev.data.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of task events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The task entered `Running`.
    ///
    /// Sets:
    /// - `id`, `task`: emitting task
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Started,

    /// The executor logged a message.
    ///
    /// Sets:
    /// - `id`, `task`: emitting task
    /// - `data`: formatted message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Log,

    /// The task completed successfully.
    ///
    /// Sets:
    /// - `id`, `task`: emitting task
    /// - `data`: success message (omitted when empty)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Completed,

    /// The task failed (including cancellation and timeouts).
    ///
    /// Sets:
    /// - `id`, `task`: emitting task
    /// - `data`: failure reason
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Failed,
}

impl EventKind {
    /// Short lowercase label used by formatters.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Started => "started",
            EventKind::Log => "log",
            EventKind::Completed => "completed",
            EventKind::Failed => "failed",
        }
    }

    /// True for `Completed` and `Failed`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::Completed | EventKind::Failed)
    }
}

/// Task event with optional message.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Id of the emitting task.
    pub id: u64,
    /// Name of the emitting task.
    pub task: Arc<str>,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Formatted message, if any.
    pub data: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind, id: u64, task: impl Into<Arc<str>>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            id,
            task: task.into(),
            at: SystemTime::now(),
            kind,
            data: None,
        }
    }

    /// Attaches a message. Empty messages are not stored.
    #[inline]
    pub fn with_data(mut self, data: impl Into<Arc<str>>) -> Self {
        let data = data.into();
        self.data = (!data.is_empty()).then_some(data);
        self
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::Started, 1, "a");
        let b = Event::new(EventKind::Log, 1, "a");
        assert!(b.seq > a.seq);
    }

    #[test]
    fn empty_data_is_dropped() {
        let ev = Event::new(EventKind::Completed, 1, "a").with_data("");
        assert!(ev.data.is_none());
        assert!(ev.is_terminal());
        assert_eq!(ev.kind.as_label(), "completed");
    }
}
