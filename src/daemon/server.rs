use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::bridge::{BridgeAlerts, BridgeHost, EffectBus};
use super::protocol::{read_message, write_message, Request, Response, StatusReport};
use crate::host::TabRegistry;
use crate::scheduler::{Scheduler, TickDriver};
use crate::store::{KeepAliveRegistry, PolicyStore, TabStateStore};

/// Socket file name inside the runtime directory.
const SOCKET_FILE: &str = "drowse.sock";

/// Pid file name inside the runtime directory.
const PID_FILE: &str = "drowse.pid";

pub fn socket_path(runtime_dir: &Path) -> PathBuf {
    runtime_dir.join(SOCKET_FILE)
}

pub fn pid_path(runtime_dir: &Path) -> PathBuf {
    runtime_dir.join(PID_FILE)
}

/// Everything a client connection handler needs, cloneable into threads.
#[derive(Clone)]
struct ServerContext {
    scheduler: Arc<Scheduler>,
    registry: TabRegistry,
    tabs: TabStateStore,
    keep_alive: KeepAliveRegistry,
    bus: EffectBus,
    shutdown: Arc<AtomicBool>,
}

/// The drowse daemon: unix socket server plus the scheduler tick loop.
pub struct Daemon {
    runtime_dir: PathBuf,
    context: ServerContext,
}

impl Daemon {
    /// Assemble the daemon: stores, bridge seams, scheduler.
    pub fn new(runtime_dir: &Path, policy: PolicyStore, desktop_notifications: bool) -> Self {
        let tabs = TabStateStore::new();
        let keep_alive = KeepAliveRegistry::new();
        let registry = TabRegistry::new();
        let bus = EffectBus::new();

        let host = Arc::new(BridgeHost::new(registry.clone(), bus.clone()));
        let alerts = Arc::new(BridgeAlerts::new(bus.clone(), desktop_notifications));
        let scheduler = Arc::new(Scheduler::new(
            policy,
            tabs.clone(),
            keep_alive.clone(),
            host,
            alerts,
        ));

        Self {
            runtime_dir: runtime_dir.to_path_buf(),
            context: ServerContext {
                scheduler,
                registry,
                tabs,
                keep_alive,
                bus,
                shutdown: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Flag checked by the accept loop and the tick driver; flip it to
    /// shut the daemon down from a signal handler.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.context.shutdown)
    }

    /// Check whether a daemon is already running in this runtime dir.
    pub fn is_running(runtime_dir: &Path) -> bool {
        let pid_file = pid_path(runtime_dir);
        if let Some(pid) = Self::read_pid(runtime_dir) {
            // Probe with signal 0; a dead pid means a stale file.
            let pid_exists = unsafe { libc::kill(pid as i32, 0) == 0 };
            if !pid_exists {
                let _ = fs::remove_file(pid_file);
                return false;
            }
            true
        } else {
            false
        }
    }

    /// Read the pid recorded by a running daemon, if any.
    pub fn read_pid(runtime_dir: &Path) -> Option<u32> {
        fs::read_to_string(pid_path(runtime_dir))
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
    }

    /// Ask a running daemon to stop, over its socket.
    pub fn stop(runtime_dir: &Path) -> Result<()> {
        if !Self::is_running(runtime_dir) {
            anyhow::bail!("Daemon is not running");
        }

        let mut stream = UnixStream::connect(socket_path(runtime_dir))
            .context("Failed to connect to daemon socket")?;
        write_message(&mut stream, &Request::Stop).context("Failed to send stop request")?;

        let response: Response =
            read_message(&mut stream).context("Failed to read stop response")?;
        match response {
            Response::Ok => Ok(()),
            Response::Error { message } => anyhow::bail!("Daemon returned error: {message}"),
            _ => anyhow::bail!("Unexpected response from daemon"),
        }
    }

    /// Run in the foreground: write the pid file, bind the socket, start
    /// the tick driver, and accept connections until shutdown.
    pub fn run(&self) -> Result<()> {
        fs::create_dir_all(&self.runtime_dir).with_context(|| {
            format!(
                "Failed to create runtime directory: {}",
                self.runtime_dir.display()
            )
        })?;

        if Self::is_running(&self.runtime_dir) {
            anyhow::bail!(
                "A daemon is already running (pid file: {})",
                pid_path(&self.runtime_dir).display()
            );
        }

        let pid_file = pid_path(&self.runtime_dir);
        fs::write(&pid_file, format!("{}", std::process::id()))
            .context("Failed to write pid file")?;

        let sock = socket_path(&self.runtime_dir);
        if sock.exists() {
            fs::remove_file(&sock).context("Failed to remove stale socket file")?;
        }

        let listener = UnixListener::bind(&sock).context("Failed to bind unix socket")?;
        // Nonblocking so the accept loop can observe the shutdown flag.
        listener
            .set_nonblocking(true)
            .context("Failed to set socket to non-blocking")?;

        info!(socket = %sock.display(), "daemon listening");

        let driver_handle = self.spawn_tick_driver();

        while !self.context.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, _addr)) => {
                    let context = self.context.clone();
                    thread::spawn(move || {
                        if let Err(e) = handle_client_connection(stream, context) {
                            debug!("client handler ended with error: {e}");
                        }
                    });
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    warn!("accept error: {e}");
                    break;
                }
            }
        }

        let _ = driver_handle.join();
        self.cleanup();
        Ok(())
    }

    fn spawn_tick_driver(&self) -> thread::JoinHandle<()> {
        let scheduler = Arc::clone(&self.context.scheduler);
        let shutdown = Arc::clone(&self.context.shutdown);
        thread::spawn(move || {
            TickDriver::new(scheduler, shutdown).run();
        })
    }

    fn cleanup(&self) {
        let _ = fs::remove_file(socket_path(&self.runtime_dir));
        let _ = fs::remove_file(pid_path(&self.runtime_dir));
        info!("daemon stopped");
    }
}

/// Serve one client connection until it disconnects or unsubscribes.
fn handle_client_connection(mut stream: UnixStream, context: ServerContext) -> Result<()> {
    loop {
        let request: Request = match read_message(&mut stream) {
            Ok(request) => request,
            // Client disconnected or sent garbage; either way this
            // connection is done.
            Err(_) => break,
        };

        let now_ms = Utc::now().timestamp_millis();
        match request {
            Request::Ping => {
                write_message(&mut stream, &Response::Pong)?;
            }
            Request::Stop => {
                write_message(&mut stream, &Response::Ok)?;
                context.shutdown.store(true, Ordering::Relaxed);
                break;
            }
            Request::Unsubscribe => {
                write_message(&mut stream, &Response::Ok)?;
                break;
            }
            Request::TabUpsert { tab } => {
                debug!(tab = tab.id, "tab snapshot updated");
                context.registry.upsert(tab);
                write_message(&mut stream, &Response::Ok)?;
            }
            Request::TabRemoved { tab_id } => {
                debug!(tab = tab_id, "tab closed");
                context.registry.remove(tab_id);
                context.scheduler.tab_closed(tab_id);
                write_message(&mut stream, &Response::Ok)?;
            }
            Request::Signal { tab_id, event } => {
                // Signals may race ahead of the tab's first snapshot;
                // state records are created on demand either way.
                context.tabs.update(tab_id, |state| event.apply(state, now_ms));
                write_message(&mut stream, &Response::Ok)?;
            }
            Request::KeepAlive { tab_id } => {
                context.scheduler.keep_alive(tab_id, now_ms);
                write_message(&mut stream, &Response::Ok)?;
            }
            Request::SuspendNow { tab_id } => {
                if !context.scheduler.suspend_now(tab_id) {
                    debug!(tab = tab_id, "suspend-now had nothing to do");
                }
                write_message(&mut stream, &Response::Ok)?;
            }
            Request::AtRiskTabs => {
                let tab_ids = context.scheduler.at_risk();
                write_message(&mut stream, &Response::AtRiskTabs { tab_ids })?;
            }
            Request::Status => {
                let policy = context.scheduler.policy();
                let report = StatusReport {
                    enabled: policy.enabled,
                    idle_minutes: policy.idle_minutes,
                    grace_period_sec: policy.grace_period_sec,
                    check_interval_sec: policy.check_interval_sec,
                    tracked_tabs: context.registry.len(),
                    warned_tabs: context.tabs.warned_tabs(),
                    kept_alive_tabs: context.keep_alive.live_tabs(now_ms),
                };
                write_message(&mut stream, &Response::Status(report))?;
            }
            Request::SubscribeEffects => {
                match stream.try_clone() {
                    Ok(stream_clone) => {
                        context.bus.subscribe(stream_clone);
                        write_message(&mut stream, &Response::Ok)?;
                    }
                    Err(e) => {
                        write_message(
                            &mut stream,
                            &Response::Error {
                                message: format!("Failed to clone stream: {e}"),
                            },
                        )?;
                    }
                }
            }
        }
    }

    Ok(())
}
