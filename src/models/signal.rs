use serde::{Deserialize, Serialize};

use super::tab::{HeuristicSample, TabState};

/// Activity events pushed into the core by per-tab reporters.
///
/// Payload fields carry serde defaults so a malformed or partial payload
/// degrades to the neutral value instead of being rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalEvent {
    /// User interacted with the tab (pointer, keyboard, scroll).
    UserInput,
    /// A network call was observed.
    NetworkActivity,
    /// Media playback started or stopped.
    MediaPlaying {
        #[serde(default)]
        playing: bool,
    },
    /// A live socket opened or closed.
    SocketActive {
        #[serde(default)]
        active: bool,
    },
    /// Periodic responsiveness sample.
    Heuristics {
        #[serde(flatten)]
        sample: HeuristicSample,
    },
}

impl SignalEvent {
    /// Fold the event into a tab's state record. Runs inside the store's
    /// critical section, so the read-modify-write is atomic with respect
    /// to scheduler ticks.
    pub fn apply(&self, state: &mut TabState, now_ms: i64) {
        match self {
            Self::UserInput => state.record_input(now_ms),
            Self::NetworkActivity => state.record_network(now_ms),
            Self::MediaPlaying { playing } => state.media_playing = *playing,
            Self::SocketActive { active } => state.websocket_active = *active,
            Self::Heuristics { sample } => state.last_heuristics = Some(*sample),
        }
    }
}
