//! Print the effective suspension policy.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::models::Policy;

pub fn execute(policy_path: &Path) -> Result<()> {
    let policy = Policy::load_or_default(policy_path)?;

    let source = if policy_path.exists() {
        policy_path.display().to_string()
    } else {
        format!("{} (not present; built-in defaults)", policy_path.display())
    };
    println!("{} {source}", "Policy:".bold());
    println!();

    let rendered = toml::to_string_pretty(&policy).context("Failed to render policy")?;
    print!("{rendered}");
    Ok(())
}
