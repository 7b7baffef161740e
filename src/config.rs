//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for the runner and the combinators that
//! need tunable timing.
//!
//! Config is used in three places:
//! 1. **Runner creation**: `Runner::new(config)` (grace period, bus capacity)
//! 2. **Watch defaults**: `watch(..)` picks up `Config::default().debounce`
//! 3. **Formatting**: `LogWriter::with_config(&config)` (name column width)
//!
//! ## Sentinel values
//! - `grace = 0s` → after a shutdown signal, only a task that fails right away
//!   (synchronously on cancel) is reported as failed; anything else exceeds the grace

use std::time::Duration;

/// Global configuration for the runtime.
///
/// ## Field semantics
/// - `grace`: How long a cancelled task may take to fail after a shutdown signal
/// - `debounce`: Minimal quiet interval before a `watch` restarts its child
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `name_width`: Width of the task-name column rendered by `LogWriter`
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for the running task to fail after it was cancelled
    /// by a shutdown signal.
    pub grace: Duration,

    /// Quiet interval applied to file-change notifications before a `watch`
    /// restarts its child. Bursts of changes inside the interval coalesce.
    pub debounce: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages
    /// receive `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,

    /// Width of the task-name column in formatted log lines.
    pub name_width: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    /// - `debounce = 100ms`
    /// - `bus_capacity = 1024`
    /// - `name_width = 24`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            debounce: Duration::from_millis(100),
            bus_capacity: 1024,
            name_width: 24,
        }
    }
}
