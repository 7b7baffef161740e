//! Small synchronization helpers shared across the crate.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `m`, recovering the guard if a previous holder panicked.
///
/// Listeners may run while a lock is held (a context dispatches events under its
/// state lock to keep them ordered), but each call is wrapped in `catch_unwind`,
/// so only a panic in crate code can poison a lock. Crate code updates guarded
/// fields with plain assignments, so a poisoned lock carries no torn state.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
