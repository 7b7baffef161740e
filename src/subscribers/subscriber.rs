//! # Event listener trait.
//!
//! Provides [`Subscribe`] the extension point for observing task events.
//!
//! ## Rules
//! - Listeners are called **synchronously**, on the thread that emitted the event,
//!   in the order the task emits events. A slow listener slows the task.
//! - Listeners must not call back into the task that is emitting
//!   (`cancel`, `subscribe`); hand the event to a channel (see [`Bus`](crate::Bus))
//!   when heavier processing is needed.
//! - Any `Fn(&Event) + Send + Sync` closure is a listener.

use crate::events::Event;

/// Event listener for task observability.
///
/// ### Implementation requirements
/// - Return quickly; do not block.
/// - Handle errors internally; do not panic.
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    fn on_event(&self, event: &Event);

    /// Returns the listener name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> Subscribe for F
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}
