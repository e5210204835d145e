//! Heuristic tab health scoring.
//!
//! Turns responsiveness samples and idle duration into a 0–100 proxy for
//! how much the tab would mind being suspended. 100 is healthy; low
//! scores make an over-idle tab a suspension candidate.

use crate::models::constants::{minutes_to_ms, score};

/// Compute the health score for a tab.
///
/// Deterministic and side-effect-free: the same inputs always produce the
/// same score, and more jank or less fps never raises it.
pub fn health_score(
    idle_ms: i64,
    jank_ms: f64,
    raf_fps: f64,
    network_active: bool,
    media_playing: bool,
) -> u8 {
    let mut value = 100.0;

    if idle_ms > minutes_to_ms(score::LONG_IDLE_REFERENCE_MINUTES) {
        value -= score::LONG_IDLE_PENALTY;
    }

    value -= (jank_ms / score::JANK_DIVISOR).clamp(0.0, score::JANK_PENALTY_CAP);

    if raf_fps < score::LOW_FPS_THRESHOLD {
        value -= score::LOW_FPS_PENALTY;
    }

    if network_active {
        value -= score::NETWORK_PENALTY;
    }

    if media_playing {
        value -= score::MEDIA_PENALTY;
    }

    value.round().clamp(0.0, 100.0) as u8
}
