use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::{TabId, TabState};

/// Shared keyed store of per-tab activity records.
///
/// Signal ingestion and scheduler ticks both mutate the same records
/// concurrently; every mutation goes through [`TabStateStore::update`],
/// which runs the whole read-modify-write inside one critical section so
/// neither side can clobber the other.
#[derive(Debug, Clone, Default)]
pub struct TabStateStore {
    inner: Arc<Mutex<HashMap<TabId, TabState>>>,
}

impl TabStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TabId, TabState>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of a tab's record, if one exists.
    pub fn get(&self, tab_id: TabId) -> Option<TabState> {
        self.lock().get(&tab_id).cloned()
    }

    /// Mutate a tab's record in place, creating an empty one first if the
    /// tab was never seen.
    pub fn update<F>(&self, tab_id: TabId, mutate: F)
    where
        F: FnOnce(&mut TabState),
    {
        let mut map = self.lock();
        mutate(map.entry(tab_id).or_default());
    }

    /// Drop a tab's record entirely (the tab closed).
    pub fn remove(&self, tab_id: TabId) {
        self.lock().remove(&tab_id);
    }

    /// Ids of all tabs with an outstanding warning.
    pub fn warned_tabs(&self) -> Vec<TabId> {
        let mut ids: Vec<TabId> = self
            .lock()
            .iter()
            .filter(|(_, state)| state.is_warned())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_creates_record_lazily() {
        let store = TabStateStore::new();
        assert!(store.get(7).is_none());

        store.update(7, |state| state.record_input(1_000));
        assert_eq!(store.get(7).unwrap().last_input_at, Some(1_000));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_preserves_other_fields() {
        let store = TabStateStore::new();
        store.update(1, |state| state.media_playing = true);
        store.update(1, |state| state.record_input(5));

        let state = store.get(1).unwrap();
        assert!(state.media_playing);
        assert_eq!(state.last_input_at, Some(5));
    }

    #[test]
    fn test_remove_drops_record() {
        let store = TabStateStore::new();
        store.update(3, |state| state.record_input(1));
        store.remove(3);
        assert!(store.get(3).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_warned_tabs_lists_only_warned() {
        let store = TabStateStore::new();
        store.update(1, |state| state.record_input(0));
        store.update(2, |state| state.warned_at = Some(100));
        store.update(5, |state| state.warned_at = Some(200));

        assert_eq!(store.warned_tabs(), vec![2, 5]);
    }
}
