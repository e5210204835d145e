//! Show a snapshot of what the daemon is tracking.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::daemon::client;
use crate::daemon::{Request, Response};

pub fn execute(runtime_dir: &Path) -> Result<()> {
    let response = client::request(runtime_dir, &Request::Status)?;
    let Response::Status(report) = response else {
        anyhow::bail!("Unexpected response from daemon: {response:?}");
    };

    println!("{}", "drowse status".bold().blue());
    println!("{}", "=".repeat(40));

    let enabled = if report.enabled {
        "enabled".green()
    } else {
        "disabled".red()
    };
    println!("  Suspension:     {enabled}");
    println!("  Idle threshold: {} min", report.idle_minutes);
    println!("  Grace period:   {} s", report.grace_period_sec);
    println!("  Tick interval:  {} s", report.check_interval_sec);
    println!();
    println!("  Tracked tabs:   {}", report.tracked_tabs);

    if report.warned_tabs.is_empty() {
        println!("  At risk:        (none)");
    } else {
        println!(
            "  At risk:        {}",
            format_ids(&report.warned_tabs).yellow()
        );
    }

    if report.kept_alive_tabs.is_empty() {
        println!("  Kept alive:     (none)");
    } else {
        println!(
            "  Kept alive:     {}",
            format_ids(&report.kept_alive_tabs).green()
        );
    }

    Ok(())
}

fn format_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
