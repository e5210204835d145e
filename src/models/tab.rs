use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_RAF_FPS;

/// Stable integer id assigned to a tab by the host environment.
pub type TabId = u32;

/// Last reported responsiveness sample for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicSample {
    /// Event-loop lag in milliseconds.
    #[serde(default)]
    pub jank_ms: f64,
    /// Observed requestAnimationFrame rate.
    #[serde(default = "default_raf_fps")]
    pub raf_fps: f64,
}

fn default_raf_fps() -> f64 {
    DEFAULT_RAF_FPS
}

impl Default for HeuristicSample {
    /// A tab that never reported a sample is assumed healthy.
    fn default() -> Self {
        Self {
            jank_ms: 0.0,
            raf_fps: DEFAULT_RAF_FPS,
        }
    }
}

/// Mutable per-tab activity record, keyed by [`TabId`].
///
/// Created lazily on the first observed signal or the first scheduler
/// encounter, and removed when the tab closes. All timestamps are epoch
/// milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabState {
    /// Last user interaction; `None` until first observed ("unseen").
    pub last_input_at: Option<i64>,
    /// Last network activity; 0 means long idle for network purposes.
    #[serde(default)]
    pub last_network_at: i64,
    /// Last reported media-playback state.
    #[serde(default)]
    pub media_playing: bool,
    /// Last reported live-socket state.
    #[serde(default)]
    pub websocket_active: bool,
    /// Last reported responsiveness sample, if any.
    pub last_heuristics: Option<HeuristicSample>,
    /// When a suspension warning was raised; `None` while not warned.
    pub warned_at: Option<i64>,
}

impl TabState {
    /// State seeded at first scheduler encounter: the idle clock starts
    /// now, so the tab is only evaluated from the following tick.
    pub fn seeded(now_ms: i64) -> Self {
        Self {
            last_input_at: Some(now_ms),
            ..Self::default()
        }
    }

    pub fn record_input(&mut self, now_ms: i64) {
        self.last_input_at = Some(now_ms);
    }

    pub fn record_network(&mut self, now_ms: i64) {
        self.last_network_at = now_ms;
    }

    /// The last sample, or healthy defaults if none was ever reported.
    pub fn heuristics(&self) -> HeuristicSample {
        self.last_heuristics.unwrap_or_default()
    }

    pub fn is_warned(&self) -> bool {
        self.warned_at.is_some()
    }

    pub fn clear_warning(&mut self) {
        self.warned_at = None;
    }
}

/// What the host environment reports about a tab on each enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: TabId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Currently focused tab.
    #[serde(default)]
    pub active: bool,
    /// Already suspended by the host.
    #[serde(default)]
    pub discarded: bool,
    #[serde(default)]
    pub pinned: bool,
    /// Host-observed audio output.
    #[serde(default)]
    pub audible: bool,
    /// Fully loaded; partially loaded tabs are not evaluated.
    #[serde(default = "default_loaded")]
    pub loaded: bool,
}

fn default_loaded() -> bool {
    true
}

impl TabSnapshot {
    /// Only ordinary web pages are candidates for suspension; privileged
    /// and internal schemes are never touched.
    pub fn has_suspendable_url(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}
