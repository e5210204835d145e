//! Per-tick suspension decisions and the warn→grace→suspend machine.
//!
//! Each tick reads policy, tab state, and keep-alive overrides, and
//! produces one decision per tab. [`decide`] is pure; [`Scheduler`]
//! applies decisions through the host and alert seams and owns the
//! resulting state transitions.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::alerts::AlertSink;
use crate::health::health_score;
use crate::host::TabHost;
use crate::models::constants::{
    minutes_to_ms, LONG_IDLE_MINUTES, NETWORK_ACTIVE_WINDOW_MS, UNHEALTHY_SCORE,
};
use crate::models::{Policy, TabId, TabSnapshot, TabState};
use crate::store::{KeepAliveRegistry, PolicyStore, TabStateStore};

/// Why a tab was passed over this tick. Exemptions are re-checked every
/// tick, before any idle or health evaluation, so an exempt tab can never
/// progress toward suspension no matter how idle it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    /// Internal or privileged scheme; never a candidate.
    PrivilegedUrl,
    /// The currently focused tab.
    ActiveTab,
    /// Unexpired manual keep-alive override.
    KeptAlive,
    /// Pinned while pinned tabs are whitelisted.
    Pinned,
    /// Hostname matches the domain whitelist.
    Whitelisted,
    /// Host reports audio output.
    Audible,
    /// Reporter says media is playing.
    MediaPlaying,
    /// Reporter says a live socket is open.
    RealtimeSocket,
    /// Network activity within the last 20 seconds.
    NetworkActive,
}

/// Outcome of evaluating one tab on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Skip; if a warning is outstanding it must be withdrawn.
    Exempt(Exemption),
    /// First sighting: start the idle clock, evaluate from the next tick.
    Seed,
    /// Nothing to do (not idle, or idle but healthy).
    None,
    /// Over threshold and unhealthy-or-very-idle: raise the warning.
    Warn,
    /// Warned, grace period still running: hold, no re-alert.
    Hold,
    /// Warned and grace elapsed: discard now.
    Suspend,
    /// No longer over the idle threshold while warned: cancel.
    ClearWarning,
}

/// The exemption that applies to this tab right now, if any.
fn exemption_for(
    tab: &TabSnapshot,
    state: &TabState,
    policy: &Policy,
    kept_alive: bool,
    now_ms: i64,
) -> Option<Exemption> {
    if !tab.has_suspendable_url() {
        return Some(Exemption::PrivilegedUrl);
    }
    if tab.active {
        return Some(Exemption::ActiveTab);
    }
    if kept_alive {
        return Some(Exemption::KeptAlive);
    }
    if policy.whitelist_pinned && tab.pinned {
        return Some(Exemption::Pinned);
    }
    if policy.is_whitelisted(&tab.url) {
        return Some(Exemption::Whitelisted);
    }
    if policy.do_not_suspend_audible && tab.audible {
        return Some(Exemption::Audible);
    }
    if policy.do_not_suspend_media_playing && state.media_playing {
        return Some(Exemption::MediaPlaying);
    }
    if policy.do_not_suspend_realtime_apps && state.websocket_active {
        return Some(Exemption::RealtimeSocket);
    }
    if policy.do_not_suspend_network_active
        && now_ms - state.last_network_at < NETWORK_ACTIVE_WINDOW_MS
    {
        return Some(Exemption::NetworkActive);
    }
    None
}

/// Evaluate one tab. Pure: reads its inputs, mutates nothing.
///
/// The caller is expected to have filtered out discarded and
/// not-yet-loaded tabs before calling.
pub fn decide(
    tab: &TabSnapshot,
    state: &TabState,
    policy: &Policy,
    kept_alive: bool,
    now_ms: i64,
) -> Decision {
    if let Some(exemption) = exemption_for(tab, state, policy, kept_alive, now_ms) {
        return Decision::Exempt(exemption);
    }

    // Never-observed tab: seed the idle clock and check it next cycle, so
    // a freshly opened tab is not misread as idle-since-epoch.
    let Some(last_input_at) = state.last_input_at else {
        return Decision::Seed;
    };

    let idle_ms = now_ms - last_input_at;
    if idle_ms < policy.idle_threshold_ms() {
        if state.is_warned() {
            return Decision::ClearWarning;
        }
        return Decision::None;
    }

    let very_idle = idle_ms >= minutes_to_ms(LONG_IDLE_MINUTES);
    let sample = state.heuristics();
    let network_active = now_ms - state.last_network_at < NETWORK_ACTIVE_WINDOW_MS;
    let score = health_score(
        idle_ms,
        sample.jank_ms,
        sample.raf_fps,
        network_active,
        state.media_playing,
    );
    let unhealthy = score < UNHEALTHY_SCORE;

    // Either condition alone is enough: a tab that is merely idle but
    // healthy stays untouched until it crosses the long-idle ceiling.
    if !unhealthy && !very_idle {
        return Decision::None;
    }

    match state.warned_at {
        None => Decision::Warn,
        Some(warned_at) if now_ms - warned_at >= policy.grace_period_ms() => Decision::Suspend,
        Some(_) => Decision::Hold,
    }
}

/// Counts of what one tick did, for logging and the status surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick did not run: overlapped a running one or enumeration failed.
    pub skipped: bool,
    /// Policy is disabled; the tick short-circuited.
    pub disabled: bool,
    pub evaluated: usize,
    pub seeded: usize,
    pub exempt: usize,
    pub warned: usize,
    pub suspended: usize,
    pub cleared: usize,
}

impl TickSummary {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }
}

/// Drives the decision machine against the real stores and collaborators.
pub struct Scheduler {
    policy: PolicyStore,
    tabs: TabStateStore,
    keep_alive: KeepAliveRegistry,
    host: Arc<dyn TabHost>,
    alerts: Arc<dyn AlertSink>,
    /// Serializes ticks: a tick that would overlap a running one is
    /// skipped outright rather than queued.
    tick_gate: Mutex<()>,
}

impl Scheduler {
    pub fn new(
        policy: PolicyStore,
        tabs: TabStateStore,
        keep_alive: KeepAliveRegistry,
        host: Arc<dyn TabHost>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            policy,
            tabs,
            keep_alive,
            host,
            alerts,
            tick_gate: Mutex::new(()),
        }
    }

    /// The policy the next tick would use.
    pub fn policy(&self) -> Policy {
        self.policy.current()
    }

    /// Tabs currently in the warn/grace window.
    pub fn at_risk(&self) -> Vec<TabId> {
        self.tabs.warned_tabs()
    }

    /// Run one evaluation pass over every tab the host reports.
    ///
    /// Failures stay contained: a tab whose side effect fails is left for
    /// the next tick, and nothing here propagates an error to the driver.
    pub fn tick(&self, now_ms: i64) -> TickSummary {
        let Ok(_guard) = self.tick_gate.try_lock() else {
            debug!("previous tick still running; skipping this one");
            return TickSummary::skipped();
        };

        let policy = self.policy.current();
        if !policy.enabled {
            return TickSummary::disabled();
        }

        let tabs = match self.host.list_tabs() {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!("tab enumeration failed, tick skipped: {e}");
                return TickSummary::skipped();
            }
        };

        let mut summary = TickSummary::default();
        for tab in &tabs {
            if tab.discarded || !tab.loaded {
                continue;
            }
            summary.evaluated += 1;

            let state = self.tabs.get(tab.id).unwrap_or_default();
            let kept_alive = self.keep_alive.is_kept_alive(tab.id, now_ms);

            match decide(tab, &state, &policy, kept_alive, now_ms) {
                Decision::Exempt(exemption) => {
                    summary.exempt += 1;
                    if state.is_warned() {
                        debug!(tab = tab.id, ?exemption, "warned tab became exempt");
                        self.stand_down(tab.id);
                        summary.cleared += 1;
                    }
                }
                Decision::Seed => {
                    // Guard against a user-input signal that landed between
                    // the read above and this write.
                    self.tabs.update(tab.id, |s| {
                        if s.last_input_at.is_none() {
                            s.last_input_at = Some(now_ms);
                        }
                    });
                    summary.seeded += 1;
                }
                Decision::None | Decision::Hold => {}
                Decision::ClearWarning => {
                    debug!(tab = tab.id, "tab active again; warning withdrawn");
                    self.stand_down(tab.id);
                    summary.cleared += 1;
                }
                Decision::Warn => {
                    self.tabs.update(tab.id, |s| s.warned_at = Some(now_ms));
                    summary.warned += 1;
                    info!(tab = tab.id, "tab warned, grace period running");
                    // A failed alert leaves the tab silently warned; the
                    // grace clock runs either way.
                    if let Err(e) = self.alerts.show(tab) {
                        warn!(tab = tab.id, "warning alert failed: {e}");
                    }
                }
                Decision::Suspend => {
                    if self.discard_and_clear(tab.id) {
                        summary.suspended += 1;
                    }
                }
            }
        }

        debug!(?summary, "tick complete");
        summary
    }

    /// Manual keep-alive: exempt the tab for the policy's keep-alive
    /// window and withdraw any outstanding warning.
    pub fn keep_alive(&self, tab_id: TabId, now_ms: i64) {
        let policy = self.policy.current();
        self.keep_alive.set(tab_id, now_ms + policy.keep_alive_ms());
        if self.tabs.get(tab_id).is_some_and(|s| s.is_warned()) {
            self.stand_down(tab_id);
        }
        info!(
            tab = tab_id,
            minutes = policy.keep_alive_minutes,
            "keep-alive registered"
        );
    }

    /// Manual suspend-now: discard immediately, ignoring the grace timer.
    /// The discard's own idempotence still applies; an already-discarded
    /// or unknown tab is left alone. Returns whether a discard happened.
    pub fn suspend_now(&self, tab_id: TabId) -> bool {
        self.discard_and_clear(tab_id)
    }

    /// A tab closed: drop its state record. The keep-alive entry, if any,
    /// goes stale harmlessly.
    pub fn tab_closed(&self, tab_id: TabId) {
        self.tabs.remove(tab_id);
    }

    fn discard_and_clear(&self, tab_id: TabId) -> bool {
        match self.host.discard(tab_id) {
            Ok(()) => {
                info!(tab = tab_id, "tab suspended");
                self.stand_down(tab_id);
                true
            }
            Err(e) => {
                // Stays warned; retried on the next tick past grace.
                warn!(tab = tab_id, "discard failed: {e}");
                false
            }
        }
    }

    /// Withdraw the warning and dismiss its alert.
    fn stand_down(&self, tab_id: TabId) {
        self.tabs.update(tab_id, TabState::clear_warning);
        if let Err(e) = self.alerts.clear(tab_id) {
            debug!(tab = tab_id, "alert dismissal failed: {e}");
        }
    }
}
