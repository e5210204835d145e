//! The seam between the scheduler and the environment that owns the tabs.
//!
//! The scheduler only ever enumerates snapshots and requests discards
//! through [`TabHost`]; what sits behind the trait (the bridge-fed
//! registry in the daemon, a mock in tests) is interchangeable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::models::{TabId, TabSnapshot};

/// Outcome of a fire-and-forget side effect. Failures are logged by the
/// scheduler and retried naturally on a later tick; they never abort it.
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("tab {0} is not tracked by the host")]
    UnknownTab(TabId),
    #[error("tab enumeration failed: {0}")]
    Enumerate(String),
    #[error("discard rejected for tab {0}: {1}")]
    Discard(TabId, String),
    #[error("alert delivery failed for tab {0}: {1}")]
    Alert(TabId, String),
}

/// Host environment holding the tabs: enumerate them, deactivate one.
pub trait TabHost: Send + Sync {
    /// Snapshot of every tab the host currently tracks.
    fn list_tabs(&self) -> Result<Vec<TabSnapshot>, EffectError>;

    /// Request deactivation of a tab. Must be idempotent: discarding an
    /// already-discarded tab succeeds without doing anything.
    fn discard(&self, tab_id: TabId) -> Result<(), EffectError>;
}

/// In-memory snapshot registry, kept current by tab lifecycle messages
/// from the bridge. Serves as the canonical tab list for the scheduler.
#[derive(Debug, Clone, Default)]
pub struct TabRegistry {
    inner: Arc<Mutex<HashMap<TabId, TabSnapshot>>>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TabId, TabSnapshot>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or refresh a tab's snapshot.
    pub fn upsert(&self, snapshot: TabSnapshot) {
        self.lock().insert(snapshot.id, snapshot);
    }

    /// Forget a closed tab. Returns whether it was tracked.
    pub fn remove(&self, tab_id: TabId) -> bool {
        self.lock().remove(&tab_id).is_some()
    }

    pub fn get(&self, tab_id: TabId) -> Option<TabSnapshot> {
        self.lock().get(&tab_id).cloned()
    }

    pub fn list(&self) -> Vec<TabSnapshot> {
        let mut tabs: Vec<TabSnapshot> = self.lock().values().cloned().collect();
        tabs.sort_by_key(|t| t.id);
        tabs
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Mark a tab discarded, reporting whether anything changed.
    ///
    /// `Ok(false)` means the tab was already discarded (idempotent no-op);
    /// an unknown tab is an error the caller downgrades to a log line.
    pub fn mark_discarded(&self, tab_id: TabId) -> Result<bool, EffectError> {
        let mut map = self.lock();
        let tab = map.get_mut(&tab_id).ok_or(EffectError::UnknownTab(tab_id))?;
        if tab.discarded {
            return Ok(false);
        }
        tab.discarded = true;
        Ok(true)
    }
}
