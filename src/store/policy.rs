use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::models::Policy;

/// Source of the current policy for the scheduler.
///
/// The scheduler reads the policy fresh at the start of each tick. A
/// file-backed source re-reads the TOML file every time so edits take
/// effect on the next tick without a restart; if a re-read fails the last
/// good policy keeps being served and the failure is logged, matching the
/// skip-and-retry handling of other collaborator failures.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: Option<PathBuf>,
    current: Arc<Mutex<Policy>>,
}

impl PolicyStore {
    /// File-backed store; `initial` is the policy loaded at startup.
    pub fn file_backed(path: PathBuf, initial: Policy) -> Self {
        Self {
            path: Some(path),
            current: Arc::new(Mutex::new(initial)),
        }
    }

    /// Fixed in-memory policy, used by tests and one-shot commands.
    pub fn fixed(policy: Policy) -> Self {
        Self {
            path: None,
            current: Arc::new(Mutex::new(policy)),
        }
    }

    /// The policy to use for this tick.
    pub fn current(&self) -> Policy {
        if let Some(path) = &self.path {
            match Policy::load_or_default(path) {
                Ok(policy) => {
                    let mut guard = self
                        .current
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    *guard = policy.clone();
                    return policy;
                }
                Err(e) => {
                    warn!("policy reload failed, keeping last good policy: {e:#}");
                }
            }
        }
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the in-memory policy (fixed stores only; file-backed stores
    /// pick up the next `current()` from disk regardless).
    pub fn replace(&self, policy: Policy) {
        let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = policy;
    }
}
