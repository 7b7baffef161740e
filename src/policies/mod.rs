//! Delay policies between retry attempts.
//!
//! ## Contents
//! - [`BackoffPolicy`] how delays evolve between failed attempts (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization applied on top of the computed delay
//!
//! ## Quick wiring
//! ```text
//! Retry::new(n, factory).with_backoff(policy)
//!      └─► after failed attempt k (1-based), sleeps policy.delay_after(k)
//!          before starting attempt k + 1 (the sleep is cancellable)
//! ```
//!
//! Without a policy `retry` starts the next attempt immediately.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
