//! Thread-safe listener registry
//!
//! An ordered list of listener references guarded by a mutex. The lock is
//! held only for add/remove/copy; dispatch always runs against a
//! point-in-time snapshot taken under the lock, so registration changes
//! never interleave with a fan-out in progress.

use std::sync::{Arc, Mutex, PoisonError};

use super::listener::StatsListener;

/// Ordered, identity-keyed set of listeners
///
/// Insertion order is preserved and is the fan-out order. Adding the same
/// instance twice registers it twice (every registration is delivered);
/// removing an instance drops every registration of it. Removing an
/// instance that was never added is a no-op.
#[derive(Default)]
pub struct ListenerRegistry {
    inner: Mutex<Vec<Arc<dyn StatsListener>>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; it receives every event dispatched after this call
    pub fn add(&self, listener: Arc<dyn StatsListener>) {
        self.lock().push(listener);
    }

    /// Remove every registration of this listener instance
    pub fn remove(&self, listener: &Arc<dyn StatsListener>) {
        self.lock().retain(|kept| !Arc::ptr_eq(kept, listener));
    }

    /// Point-in-time copy for one dispatch
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn StatsListener>> {
        self.lock().clone()
    }

    /// Number of current registrations
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn StatsListener>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish()
    }
}
