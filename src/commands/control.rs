//! One-shot daemon control: overrides, ping, stop.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::daemon::client;
use crate::daemon::{Daemon, Request, Response};
use crate::models::TabId;

/// Register a manual keep-alive for a tab.
pub fn keep_alive(runtime_dir: &Path, tab_id: TabId) -> Result<()> {
    client::expect_ok(runtime_dir, &Request::KeepAlive { tab_id })?;
    println!("Keep-alive registered for tab {}", tab_id.to_string().green());
    Ok(())
}

/// Force immediate suspension of a tab.
pub fn suspend(runtime_dir: &Path, tab_id: TabId) -> Result<()> {
    client::expect_ok(runtime_dir, &Request::SuspendNow { tab_id })?;
    println!("Suspension requested for tab {tab_id}");
    Ok(())
}

/// Check whether the daemon answers.
pub fn ping(runtime_dir: &Path) -> Result<()> {
    match client::request(runtime_dir, &Request::Ping)? {
        Response::Pong => {
            println!("{}", "Daemon is running.".green());
            Ok(())
        }
        other => anyhow::bail!("Unexpected response from daemon: {other:?}"),
    }
}

/// Stop a running daemon.
pub fn stop(runtime_dir: &Path) -> Result<()> {
    Daemon::stop(runtime_dir)?;
    println!("Daemon stopped.");
    Ok(())
}
