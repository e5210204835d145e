//! Start the daemon in the foreground.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use crate::daemon::Daemon;
use crate::models::Policy;
use crate::store::PolicyStore;

pub struct RunOptions {
    pub runtime_dir: PathBuf,
    pub policy_path: PathBuf,
    /// Skip desktop notifications; warnings go to effect subscribers only.
    pub no_desktop_notifications: bool,
}

pub fn execute(options: RunOptions) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("drowse=info")),
        )
        .init();

    let initial = Policy::load_or_default(&options.policy_path)
        .context("Failed to load suspension policy")?;
    if !options.policy_path.exists() {
        // First run: materialize the defaults so there is a file to edit.
        initial.save(&options.policy_path)?;
        println!(
            "Wrote default policy to {}",
            options.policy_path.display().to_string().bold()
        );
    }

    let policy = PolicyStore::file_backed(options.policy_path, initial);
    let daemon = Daemon::new(
        &options.runtime_dir,
        policy,
        !options.no_desktop_notifications,
    );

    let shutdown = daemon.shutdown_flag();
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::Relaxed);
    })
    .context("Failed to install shutdown handler")?;

    println!("{}", "drowse daemon starting".bold());
    println!(
        "  socket: {}",
        crate::daemon::server::socket_path(&options.runtime_dir).display()
    );

    daemon.run()
}
