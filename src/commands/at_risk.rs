//! List tabs currently in the warn/grace window.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::daemon::client;
use crate::daemon::{Request, Response};

pub fn execute(runtime_dir: &Path) -> Result<()> {
    let response = client::request(runtime_dir, &Request::AtRiskTabs)?;
    let Response::AtRiskTabs { tab_ids } = response else {
        anyhow::bail!("Unexpected response from daemon: {response:?}");
    };

    if tab_ids.is_empty() {
        println!("No tabs are at risk of suspension.");
        return Ok(());
    }

    println!("{}", "Tabs at risk of suspension:".bold());
    for tab_id in tab_ids {
        println!("  {}", tab_id.to_string().yellow());
    }
    Ok(())
}
