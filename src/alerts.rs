//! Suspension warnings shown to the user.
//!
//! The scheduler talks to an [`AlertSink`]; the daemon's sink broadcasts
//! the alert to bridge subscribers (which render the two response
//! actions) and mirrors it to a desktop notification, using notify-send
//! on Linux and osascript on macOS.

use std::process::Command;

use crate::host::EffectError;
use crate::models::{TabId, TabSnapshot};

/// Title used for every suspension warning.
pub const WARN_TITLE: &str = "drowse will suspend a tab";

/// The two response actions offered with a warning, in wire order: the
/// bridge reports the chosen index back (0 = keep alive, 1 = suspend now).
pub const WARN_ACTIONS: [&str; 2] = ["Keep Alive", "Suspend Now"];

/// Body text for a warning about the given tab.
pub fn warn_message(tab: &TabSnapshot) -> String {
    let label = if tab.title.is_empty() {
        tab.url.as_str()
    } else {
        tab.title.as_str()
    };
    format!("The tab \"{}\" is idle and will be suspended to save memory.", truncate(label, 120))
}

/// Destination for suspension warnings.
///
/// Showing must replace any outstanding warning for the same tab rather
/// than stacking a second one; the scheduler already never re-shows while
/// one is pending, so this only matters for out-of-band callers.
pub trait AlertSink: Send + Sync {
    /// Raise (or replace) the warning for a tab.
    fn show(&self, tab: &TabSnapshot) -> Result<(), EffectError>;

    /// Dismiss an outstanding warning once it is resolved.
    fn clear(&self, tab_id: TabId) -> Result<(), EffectError>;
}

/// Best-effort desktop notification sink.
///
/// Response actions cannot come back through this channel; they arrive
/// over the daemon socket. Clearing is a no-op since desktop
/// notifications expire on their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl AlertSink for DesktopNotifier {
    fn show(&self, tab: &TabSnapshot) -> Result<(), EffectError> {
        send_desktop_notification(WARN_TITLE, &warn_message(tab))
            .map_err(|e| EffectError::Alert(tab.id, e))
    }

    fn clear(&self, _tab_id: TabId) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Send a desktop notification using platform tools.
pub fn send_desktop_notification(title: &str, body: &str) -> Result<(), String> {
    if cfg!(target_os = "macos") {
        send_macos_notification(title, body)
    } else {
        send_linux_notification(title, body)
    }
}

fn send_linux_notification(title: &str, body: &str) -> Result<(), String> {
    Command::new("notify-send")
        .arg("--urgency=normal")
        .arg("--app-name=drowse")
        .arg(title)
        .arg(body)
        .output()
        .map_err(|e| format!("notify-send failed: {e}"))
        .and_then(|output| {
            if output.status.success() {
                Ok(())
            } else {
                Err(format!("notify-send exited with: {}", output.status))
            }
        })
}

fn send_macos_notification(title: &str, body: &str) -> Result<(), String> {
    let script = format!(
        r#"display notification "{}" with title "{}""#,
        body.replace('"', r#"\""#),
        title.replace('"', r#"\""#)
    );

    Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .output()
        .map_err(|e| format!("osascript failed: {e}"))
        .and_then(|output| {
            if output.status.success() {
                Ok(())
            } else {
                Err(format!("osascript exited with: {}", output.status))
            }
        })
}

/// Truncate a label to `max_len` characters, adding an ellipsis if needed.
fn truncate(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let cut: String = label.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
