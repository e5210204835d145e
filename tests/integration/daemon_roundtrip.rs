//! Daemon socket round-trips: signal ingestion, queries, overrides, and
//! effect subscription against a live server on a temp runtime dir.

use std::os::unix::net::UnixStream;
use std::time::Duration;

use serial_test::serial;

use drowse::daemon::protocol::{read_message, write_message};
use drowse::daemon::server::socket_path;
use drowse::daemon::{Daemon, Effect, Request, Response};
use drowse::models::SignalEvent;

use crate::helpers::{quiet_policy, send, tab, DaemonFixture};

#[test]
#[serial]
fn test_ping_and_stop() {
    let mut fixture = DaemonFixture::start(quiet_policy());

    assert_eq!(send(&fixture.runtime_dir, &Request::Ping), Response::Pong);
    assert!(Daemon::is_running(&fixture.runtime_dir));

    fixture.stop();
    assert!(!Daemon::is_running(&fixture.runtime_dir));
}

#[test]
#[serial]
fn test_signals_feed_the_at_risk_query() {
    let fixture = DaemonFixture::start(quiet_policy());
    let dir = &fixture.runtime_dir;

    send(dir, &Request::TabUpsert { tab: tab(1) });
    send(
        dir,
        &Request::Signal {
            tab_id: 1,
            event: SignalEvent::UserInput,
        },
    );

    // Nothing has warned this tab.
    assert_eq!(
        send(dir, &Request::AtRiskTabs),
        Response::AtRiskTabs { tab_ids: vec![] }
    );
}

#[test]
#[serial]
fn test_status_reflects_tracked_state() {
    let fixture = DaemonFixture::start(quiet_policy());
    let dir = &fixture.runtime_dir;

    send(dir, &Request::TabUpsert { tab: tab(1) });
    send(dir, &Request::TabUpsert { tab: tab(2) });
    send(dir, &Request::KeepAlive { tab_id: 2 });

    let Response::Status(report) = send(dir, &Request::Status) else {
        panic!("expected status report");
    };
    assert!(!report.enabled);
    assert_eq!(report.tracked_tabs, 2);
    assert_eq!(report.kept_alive_tabs, vec![2]);
    assert!(report.warned_tabs.is_empty());
}

#[test]
#[serial]
fn test_tab_removal_drops_state() {
    let fixture = DaemonFixture::start(quiet_policy());
    let dir = &fixture.runtime_dir;

    send(dir, &Request::TabUpsert { tab: tab(5) });
    send(
        dir,
        &Request::Signal {
            tab_id: 5,
            event: SignalEvent::UserInput,
        },
    );
    send(dir, &Request::TabRemoved { tab_id: 5 });

    let Response::Status(report) = send(dir, &Request::Status) else {
        panic!("expected status report");
    };
    assert_eq!(report.tracked_tabs, 0);
}

#[test]
#[serial]
fn test_unknown_tab_override_is_a_noop() {
    let fixture = DaemonFixture::start(quiet_policy());

    // Never errors back to the caller; the daemon just logs it.
    assert_eq!(
        send(&fixture.runtime_dir, &Request::SuspendNow { tab_id: 404 }),
        Response::Ok
    );
}

#[test]
#[serial]
fn test_suspend_now_reaches_effect_subscribers() {
    let fixture = DaemonFixture::start(quiet_policy());
    let dir = &fixture.runtime_dir;

    send(dir, &Request::TabUpsert { tab: tab(9) });

    // Subscribe a dedicated connection to outbound effects.
    let mut subscriber = UnixStream::connect(socket_path(dir)).expect("connect");
    subscriber
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("timeout");
    write_message(&mut subscriber, &Request::SubscribeEffects).expect("subscribe");
    let ack: Response = read_message(&mut subscriber).expect("ack");
    assert_eq!(ack, Response::Ok);

    send(dir, &Request::SuspendNow { tab_id: 9 });

    let pushed: Response = read_message(&mut subscriber).expect("effect");
    assert_eq!(pushed, Response::Effect(Effect::Discard { tab_id: 9 }));
}
