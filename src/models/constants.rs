/// Idle duration after which a tab is suspended regardless of its health
/// score. This is a failsafe ceiling, independent of the configured
/// `idle_minutes` threshold.
pub const LONG_IDLE_MINUTES: u32 = 30;

/// Health score below which an over-idle tab enters the warn sequence.
pub const UNHEALTHY_SCORE: u8 = 40;

/// Window after the last network event during which a tab counts as
/// network-active for the `do_not_suspend_network_active` exemption.
pub const NETWORK_ACTIVE_WINDOW_MS: i64 = 20_000;

/// Frame rate assumed for tabs that never reported a heuristic sample.
pub const DEFAULT_RAF_FPS: f64 = 60.0;

/// Health score deductions. The score starts at 100 and each signal
/// subtracts its penalty; the result is clamped to [0, 100].
pub mod score {
    /// Deducted when the tab has been idle longer than [`super::minutes_to_ms`] (10).
    pub const LONG_IDLE_PENALTY: f64 = 10.0;

    /// Idle duration above which the long-idle penalty applies (minutes).
    pub const LONG_IDLE_REFERENCE_MINUTES: u32 = 10;

    /// Event-loop lag is divided by this before being deducted.
    pub const JANK_DIVISOR: f64 = 50.0;

    /// Cap on the event-loop lag deduction.
    pub const JANK_PENALTY_CAP: f64 = 40.0;

    /// Frame rates below this incur the low-fps penalty.
    pub const LOW_FPS_THRESHOLD: f64 = 20.0;

    /// Deducted when the reported frame rate is below the threshold.
    pub const LOW_FPS_PENALTY: f64 = 20.0;

    /// Deducted while network activity is in flight.
    pub const NETWORK_PENALTY: f64 = 10.0;

    /// Deducted while media is playing.
    pub const MEDIA_PENALTY: f64 = 30.0;
}

/// Convert whole minutes to milliseconds.
pub const fn minutes_to_ms(n: u32) -> i64 {
    n as i64 * 60 * 1000
}

/// Convert whole seconds to milliseconds.
pub const fn seconds_to_ms(n: u32) -> i64 {
    n as i64 * 1000
}
