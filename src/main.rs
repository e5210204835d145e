use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use drowse::commands::{at_risk, config, control, run, status};
use drowse::daemon::{default_policy_path, default_runtime_dir};
use drowse::models::TabId;

#[derive(Parser)]
#[command(name = "drowse")]
#[command(about = "Idle-tab suspension daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Runtime directory holding the daemon socket and pid file
    #[arg(long, global = true)]
    runtime_dir: Option<PathBuf>,

    /// Path to the policy file
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon in the foreground
    Run {
        /// Disable desktop notifications for suspension warnings
        #[arg(long)]
        no_desktop_notifications: bool,
    },

    /// Show what the daemon is tracking
    Status,

    /// List tabs currently in the warn/grace window
    AtRisk,

    /// Exempt a tab from suspension for the configured keep-alive window
    KeepAlive {
        /// Tab id reported by the host environment
        tab_id: TabId,
    },

    /// Suspend a tab immediately, skipping the grace period
    Suspend {
        /// Tab id reported by the host environment
        tab_id: TabId,
    },

    /// Check whether the daemon answers
    Ping,

    /// Stop a running daemon
    Stop,

    /// Print the effective policy
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime_dir = cli.runtime_dir.unwrap_or_else(default_runtime_dir);
    let policy_path = cli.policy.unwrap_or_else(default_policy_path);

    match cli.command {
        Commands::Run {
            no_desktop_notifications,
        } => run::execute(run::RunOptions {
            runtime_dir,
            policy_path,
            no_desktop_notifications,
        }),
        Commands::Status => status::execute(&runtime_dir),
        Commands::AtRisk => at_risk::execute(&runtime_dir),
        Commands::KeepAlive { tab_id } => control::keep_alive(&runtime_dir, tab_id),
        Commands::Suspend { tab_id } => control::suspend(&runtime_dir, tab_id),
        Commands::Ping => control::ping(&runtime_dir),
        Commands::Stop => control::stop(&runtime_dir),
        Commands::Config => config::execute(&policy_path),
    }
}
