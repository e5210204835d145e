//! End-to-end scheduler scenarios through the public API: real stores,
//! the bridge host over a registry, and a recording alert sink.

use std::sync::Arc;

use drowse::daemon::{BridgeHost, EffectBus};
use drowse::host::TabRegistry;
use drowse::models::constants::{minutes_to_ms, seconds_to_ms};
use drowse::models::{HeuristicSample, Policy, SignalEvent, TabId};
use drowse::scheduler::Scheduler;
use drowse::store::{KeepAliveRegistry, PolicyStore, TabStateStore};

use crate::helpers::{tab, RecordingAlerts};

const T0: i64 = 1_700_000_000_000;

struct World {
    scheduler: Scheduler,
    tabs: TabStateStore,
    registry: TabRegistry,
    alerts: Arc<RecordingAlerts>,
}

fn world(policy: Policy) -> World {
    let tabs = TabStateStore::new();
    let keep_alive = KeepAliveRegistry::new();
    let registry = TabRegistry::new();
    let host = Arc::new(BridgeHost::new(registry.clone(), EffectBus::new()));
    let alerts = Arc::new(RecordingAlerts::default());

    let scheduler = Scheduler::new(
        PolicyStore::fixed(policy),
        tabs.clone(),
        keep_alive,
        host,
        alerts.clone(),
    );

    World {
        scheduler,
        tabs,
        registry,
        alerts,
    }
}

/// Deliver a signal the way the daemon's ingestion path does.
fn signal(world: &World, tab_id: TabId, event: SignalEvent, now_ms: i64) {
    world
        .tabs
        .update(tab_id, |state| event.apply(state, now_ms));
}

fn laggy_sample() -> SignalEvent {
    SignalEvent::Heuristics {
        sample: HeuristicSample {
            jank_ms: 2_000.0,
            raf_fps: 10.0,
        },
    }
}

#[test]
fn test_fresh_tab_survives_until_idle_accumulates() {
    let w = world(Policy::default());
    w.registry.upsert(tab(1));

    // First sighting seeds the clock; a tick right after does nothing.
    w.scheduler.tick(T0);
    w.scheduler.tick(T0 + seconds_to_ms(10));
    assert!(w.alerts.shown.lock().unwrap().is_empty());
    assert!(!w.registry.get(1).unwrap().discarded);
}

#[test]
fn test_unhealthy_idle_tab_walks_the_full_protocol() {
    let w = world(Policy::default());
    w.registry.upsert(tab(1));
    signal(&w, 1, SignalEvent::UserInput, T0 - minutes_to_ms(11));
    signal(&w, 1, laggy_sample(), T0 - minutes_to_ms(5));

    // Warn.
    w.scheduler.tick(T0);
    assert_eq!(*w.alerts.shown.lock().unwrap(), vec![1]);
    assert_eq!(w.scheduler.at_risk(), vec![1]);

    // Hold inside the grace period.
    w.scheduler.tick(T0 + seconds_to_ms(30));
    assert_eq!(w.alerts.shown.lock().unwrap().len(), 1);
    assert!(!w.registry.get(1).unwrap().discarded);

    // Suspend once grace elapses.
    w.scheduler.tick(T0 + seconds_to_ms(65));
    assert!(w.registry.get(1).unwrap().discarded);
    assert!(w.scheduler.at_risk().is_empty());
    assert_eq!(*w.alerts.cleared.lock().unwrap(), vec![1]);
}

#[test]
fn test_user_input_cancels_pending_suspension() {
    let w = world(Policy::default());
    w.registry.upsert(tab(1));
    signal(&w, 1, SignalEvent::UserInput, T0 - minutes_to_ms(11));
    signal(&w, 1, laggy_sample(), T0);

    w.scheduler.tick(T0);
    assert_eq!(w.scheduler.at_risk(), vec![1]);

    // The user comes back before grace runs out.
    signal(&w, 1, SignalEvent::UserInput, T0 + seconds_to_ms(40));

    w.scheduler.tick(T0 + seconds_to_ms(65));
    assert!(w.scheduler.at_risk().is_empty());
    assert!(!w.registry.get(1).unwrap().discarded);
}

#[test]
fn test_whitelisted_tab_is_never_warned() {
    let w = world(Policy::default());
    let mut youtube = tab(1);
    youtube.url = "https://music.youtube.com/watch?v=abc".to_string();
    w.registry.upsert(youtube);
    signal(&w, 1, SignalEvent::UserInput, T0 - minutes_to_ms(120));
    signal(&w, 1, laggy_sample(), T0);

    w.scheduler.tick(T0);
    assert!(w.alerts.shown.lock().unwrap().is_empty());
    assert!(w.scheduler.at_risk().is_empty());
}

#[test]
fn test_media_start_mid_grace_stands_the_tab_down() {
    let w = world(Policy::default());
    w.registry.upsert(tab(1));
    signal(&w, 1, SignalEvent::UserInput, T0 - minutes_to_ms(11));
    signal(&w, 1, laggy_sample(), T0);

    w.scheduler.tick(T0);
    assert_eq!(w.scheduler.at_risk(), vec![1]);

    signal(
        &w,
        1,
        SignalEvent::MediaPlaying { playing: true },
        T0 + seconds_to_ms(10),
    );

    w.scheduler.tick(T0 + seconds_to_ms(65));
    assert!(w.scheduler.at_risk().is_empty());
    assert!(!w.registry.get(1).unwrap().discarded);
    assert_eq!(*w.alerts.cleared.lock().unwrap(), vec![1]);
}

#[test]
fn test_very_idle_tab_suspends_despite_good_health() {
    let w = world(Policy::default());
    w.registry.upsert(tab(1));
    signal(&w, 1, SignalEvent::UserInput, T0 - minutes_to_ms(35));

    w.scheduler.tick(T0);
    assert_eq!(w.scheduler.at_risk(), vec![1]);

    w.scheduler.tick(T0 + seconds_to_ms(61));
    assert!(w.registry.get(1).unwrap().discarded);
}

#[test]
fn test_keep_alive_outlasts_repeated_ticks() {
    let w = world(Policy::default());
    w.registry.upsert(tab(1));
    signal(&w, 1, SignalEvent::UserInput, T0 - minutes_to_ms(60));

    w.scheduler.keep_alive(1, T0);

    for offset_min in [0, 30, 60, 119] {
        w.scheduler.tick(T0 + minutes_to_ms(offset_min));
    }
    assert!(w.alerts.shown.lock().unwrap().is_empty());
    assert!(!w.registry.get(1).unwrap().discarded);

    // Once the keep-alive lapses, the warn sequence finally begins.
    w.scheduler.tick(T0 + minutes_to_ms(121));
    assert_eq!(w.scheduler.at_risk(), vec![1]);
}

#[test]
fn test_independent_tabs_progress_independently() {
    let w = world(Policy::default());
    w.registry.upsert(tab(1));
    w.registry.upsert(tab(2));
    signal(&w, 1, SignalEvent::UserInput, T0 - minutes_to_ms(35));
    signal(&w, 2, SignalEvent::UserInput, T0 - minutes_to_ms(2));

    w.scheduler.tick(T0);
    assert_eq!(w.scheduler.at_risk(), vec![1]);

    w.scheduler.tick(T0 + seconds_to_ms(65));
    assert!(w.registry.get(1).unwrap().discarded);
    assert!(!w.registry.get(2).unwrap().discarded);
}
