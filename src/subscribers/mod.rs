//! # Event listeners.
//!
//! This module provides the [`Subscribe`] trait and the built-in [`LogWriter`]
//! sink that renders events as fixed-width text lines.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Context ── emit(Event) ──► task listeners (in registration order)
//!                                   │
//!                                   ├──► parent combinator (re-emits upward)
//!                                   ├──► LogWriter (stdout line)
//!                                   ├──► Bus (broadcast to async receivers)
//!                                   └──► any Fn(&Event)
//! ```
//!
//! ## Implementing custom listeners
//! ```
//! use taskweave::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter(std::sync::atomic::AtomicUsize);
//!
//! impl Subscribe for FailureCounter {
//!     fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::Failed {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//! }
//! ```

mod log;
mod subscriber;

pub use log::{LogWriter, format_event};
pub use subscriber::Subscribe;
