//! Lock helper shared by the serialized components.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Acquire a component lock, recovering from poisoning.
///
/// Every component mutates its state in a single step per operation, so a
/// panic in another holder cannot leave a half-applied write behind.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
