//! Unix-socket daemon: signal ingestion, response routing, and the
//! bridge-facing side of the scheduler's collaborator seams.

pub mod bridge;
pub mod client;
pub mod protocol;
pub mod server;

use std::path::PathBuf;

pub use bridge::{BridgeAlerts, BridgeHost, EffectBus};
pub use protocol::{Effect, Request, Response, StatusReport};
pub use server::Daemon;

/// Default runtime directory for the socket and pid file.
pub fn default_runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("drowse")
}

/// Default location of the policy file.
pub fn default_policy_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("drowse")
        .join("policy.toml")
}
