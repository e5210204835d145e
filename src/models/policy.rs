use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

use super::constants::{minutes_to_ms, seconds_to_ms};

/// User-configured suspension policy.
///
/// Read fresh at the start of every scheduler tick and treated as
/// immutable within it. Every field has a serde default so a partial
/// policy file works; an absent file yields [`Policy::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Master switch; a disabled policy short-circuits the whole tick.
    pub enabled: bool,
    /// No user input for this many minutes marks a tab over-idle.
    pub idle_minutes: u32,
    /// Approximate memory budget surfaced on the options page. The
    /// decision loop works from activity heuristics, not real counters.
    pub memory_limit_mb: u32,
    /// Approximate CPU budget, likewise heuristic-only.
    pub cpu_limit_percent: u32,
    /// Seconds between the warning and the suspension it announces.
    pub grace_period_sec: u32,
    /// Scheduler tick interval in seconds.
    pub check_interval_sec: u32,
    /// Domains exempt from suspension, matched as hostname suffixes.
    pub whitelist_domains: Vec<String>,
    /// Exempt pinned tabs.
    pub whitelist_pinned: bool,
    pub do_not_suspend_audible: bool,
    pub do_not_suspend_media_playing: bool,
    pub do_not_suspend_network_active: bool,
    pub do_not_suspend_realtime_apps: bool,
    /// Duration of a manual keep-alive override, in minutes.
    pub keep_alive_minutes: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_minutes: 10,
            memory_limit_mb: 250,
            cpu_limit_percent: 30,
            grace_period_sec: 60,
            check_interval_sec: 10,
            whitelist_domains: vec![
                "youtube.com".to_string(),
                "music.youtube.com".to_string(),
                "docs.google.com".to_string(),
            ],
            whitelist_pinned: true,
            do_not_suspend_audible: true,
            do_not_suspend_media_playing: true,
            do_not_suspend_network_active: true,
            do_not_suspend_realtime_apps: true,
            keep_alive_minutes: 120,
        }
    }
}

impl Policy {
    /// Load the policy from a TOML file, or fall back to defaults when the
    /// file does not exist. A file that exists but fails to parse is an
    /// error; silently reverting a user's thresholds would be worse.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse policy file: {}", path.display()))
    }

    /// Write the policy as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let raw = toml::to_string_pretty(self).context("Failed to serialize policy")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write policy file: {}", path.display()))
    }

    /// Whether the url's hostname matches the whitelist. Matching is
    /// suffix-based: whitelisting `youtube.com` also exempts
    /// `music.youtube.com`.
    pub fn is_whitelisted(&self, url: &str) -> bool {
        let Some(host) = hostname_of(url) else {
            return false;
        };
        self.whitelist_domains
            .iter()
            .any(|domain| host.ends_with(domain.as_str()))
    }

    pub fn idle_threshold_ms(&self) -> i64 {
        minutes_to_ms(self.idle_minutes)
    }

    pub fn grace_period_ms(&self) -> i64 {
        seconds_to_ms(self.grace_period_sec)
    }

    pub fn keep_alive_ms(&self) -> i64 {
        minutes_to_ms(self.keep_alive_minutes)
    }
}

/// Extract the hostname from a url, if it has one.
fn hostname_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
