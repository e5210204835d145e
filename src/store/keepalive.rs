use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::TabId;

/// Time-boxed manual suspension overrides, keyed by tab id.
///
/// A tab is kept alive iff its entry's `expires_at` is in the future.
/// Entries are not garbage-collected; stale ones are harmless and checked
/// lazily against the caller's clock.
#[derive(Debug, Clone, Default)]
pub struct KeepAliveRegistry {
    inner: Arc<Mutex<HashMap<TabId, i64>>>,
}

impl KeepAliveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TabId, i64>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register or extend a keep-alive until `expires_at_ms`.
    pub fn set(&self, tab_id: TabId, expires_at_ms: i64) {
        self.lock().insert(tab_id, expires_at_ms);
    }

    /// Whether the tab holds an unexpired keep-alive at `now_ms`.
    pub fn is_kept_alive(&self, tab_id: TabId, now_ms: i64) -> bool {
        self.lock()
            .get(&tab_id)
            .is_some_and(|expires_at| *expires_at > now_ms)
    }

    /// Ids of tabs whose keep-alive is still live at `now_ms`.
    pub fn live_tabs(&self, now_ms: i64) -> Vec<TabId> {
        let mut ids: Vec<TabId> = self
            .lock()
            .iter()
            .filter(|(_, expires_at)| **expires_at > now_ms)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
