//! Shared fixtures for the integration tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tempfile::TempDir;

use drowse::alerts::AlertSink;
use drowse::daemon::{client, Daemon, Request, Response};
use drowse::host::EffectError;
use drowse::models::{Policy, TabId, TabSnapshot};
use drowse::store::PolicyStore;

pub fn tab(id: TabId) -> TabSnapshot {
    TabSnapshot {
        id,
        url: format!("https://example.com/{id}"),
        title: format!("tab {id}"),
        active: false,
        discarded: false,
        pinned: false,
        audible: false,
        loaded: true,
    }
}

/// Alert sink that records what the scheduler asked for.
#[derive(Default)]
pub struct RecordingAlerts {
    pub shown: Mutex<Vec<TabId>>,
    pub cleared: Mutex<Vec<TabId>>,
}

impl AlertSink for RecordingAlerts {
    fn show(&self, tab: &TabSnapshot) -> Result<(), EffectError> {
        self.shown.lock().unwrap().push(tab.id);
        Ok(())
    }

    fn clear(&self, tab_id: TabId) -> Result<(), EffectError> {
        self.cleared.lock().unwrap().push(tab_id);
        Ok(())
    }
}

/// A daemon running against a temp runtime dir, stopped on drop.
pub struct DaemonFixture {
    pub runtime_dir: PathBuf,
    _dir: TempDir,
    handle: Option<JoinHandle<()>>,
}

impl DaemonFixture {
    /// Start a daemon with the given policy and wait until it answers.
    pub fn start(policy: Policy) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let runtime_dir = dir.path().join("run");

        let store = PolicyStore::fixed(policy);
        let daemon_dir = runtime_dir.clone();
        let handle = thread::spawn(move || {
            let daemon = Daemon::new(&daemon_dir, store, false);
            daemon.run().expect("daemon run");
        });

        let fixture = Self {
            runtime_dir,
            _dir: dir,
            handle: Some(handle),
        };
        fixture.wait_until_ready();
        fixture
    }

    fn wait_until_ready(&self) {
        for _ in 0..100 {
            if client::request(&self.runtime_dir, &Request::Ping).is_ok() {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
        panic!("daemon did not come up");
    }

    pub fn stop(&mut self) {
        let _ = client::request(&self.runtime_dir, &Request::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DaemonFixture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A policy that keeps the daemon's own tick loop inert so tests control
/// all state transitions through the socket.
pub fn quiet_policy() -> Policy {
    Policy {
        enabled: false,
        ..Policy::default()
    }
}

/// Send one request, panicking on transport errors.
pub fn send(runtime_dir: &Path, request: &Request) -> Response {
    client::request(runtime_dir, request).expect("daemon request")
}
