use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::models::{SignalEvent, TabId, TabSnapshot};

/// Upper bound on a single wire message; anything larger is a framing
/// error, not a legitimate payload.
const MAX_MESSAGE_BYTES: u32 = 1024 * 1024;

/// Client request to the daemon.
///
/// The bridge collaborator uses the tab lifecycle and signal variants;
/// CLI commands and alert surfaces use the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Ping to check if the daemon is alive.
    Ping,
    /// Request daemon shutdown.
    Stop,
    /// Disconnect cleanly.
    Unsubscribe,
    /// A tab appeared or its snapshot changed.
    TabUpsert { tab: TabSnapshot },
    /// A tab closed; its state record is dropped.
    TabRemoved { tab_id: TabId },
    /// An activity signal observed inside a tab.
    Signal { tab_id: TabId, event: SignalEvent },
    /// Manual keep-alive override (quick toggle, or alert action 0).
    KeepAlive { tab_id: TabId },
    /// Force immediate suspension (alert action 1).
    SuspendNow { tab_id: TabId },
    /// Ids of tabs currently in the warn/grace window.
    AtRiskTabs,
    /// Daemon status snapshot.
    Status,
    /// Subscribe this connection to outbound effects.
    SubscribeEffects,
}

/// Side effects the core asks its collaborators to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Deactivate the tab.
    Discard { tab_id: TabId },
    /// Show (or replace) the suspension warning for a tab. `actions` are
    /// the response buttons in wire order; the surface reports the chosen
    /// index back as keep-alive (0) or suspend-now (1).
    ShowAlert {
        tab_id: TabId,
        title: String,
        message: String,
        actions: Vec<String>,
    },
    /// Dismiss an outstanding warning.
    ClearAlert { tab_id: TabId },
}

/// Daemon response to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Pong,
    Error { message: String },
    AtRiskTabs { tab_ids: Vec<TabId> },
    Status(StatusReport),
    /// Pushed to effect subscribers; never a direct reply.
    Effect(Effect),
}

/// Point-in-time view of the daemon for the status command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub enabled: bool,
    pub idle_minutes: u32,
    pub grace_period_sec: u32,
    pub check_interval_sec: u32,
    pub tracked_tabs: usize,
    pub warned_tabs: Vec<TabId>,
    pub kept_alive_tabs: Vec<TabId>,
}

/// Write a length-prefixed JSON message to a stream.
///
/// Format: 4-byte big-endian length prefix + JSON data.
pub fn write_message<T: Serialize, W: Write>(stream: &mut W, message: &T) -> Result<()> {
    let json = serde_json::to_vec(message).context("Failed to serialize message")?;
    let len = json.len() as u32;

    stream
        .write_all(&len.to_be_bytes())
        .context("Failed to write message length")?;
    stream
        .write_all(&json)
        .context("Failed to write message body")?;
    stream.flush().context("Failed to flush stream")?;

    Ok(())
}

/// Read a length-prefixed JSON message from a stream.
pub fn read_message<T: for<'de> Deserialize<'de>, R: Read>(stream: &mut R) -> Result<T> {
    let mut len_bytes = [0u8; 4];
    stream
        .read_exact(&mut len_bytes)
        .context("Failed to read message length")?;

    let len = u32::from_be_bytes(len_bytes);
    if len > MAX_MESSAGE_BYTES {
        anyhow::bail!("Message length {len} exceeds limit");
    }

    let mut body = vec![0u8; len as usize];
    stream
        .read_exact(&mut body)
        .context("Failed to read message body")?;

    serde_json::from_slice(&body).context("Failed to deserialize message")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(request: &Request) -> Request {
        let mut buffer = Vec::new();
        write_message(&mut buffer, request).unwrap();
        read_message(&mut Cursor::new(buffer)).unwrap()
    }

    #[test]
    fn test_request_round_trip() {
        let requests = [
            Request::Ping,
            Request::AtRiskTabs,
            Request::KeepAlive { tab_id: 7 },
            Request::Signal {
                tab_id: 3,
                event: SignalEvent::UserInput,
            },
        ];
        for request in requests {
            assert_eq!(round_trip(&request), request);
        }
    }

    #[test]
    fn test_effect_round_trip() {
        let effect = Effect::ShowAlert {
            tab_id: 4,
            title: "title".to_string(),
            message: "message".to_string(),
            actions: vec!["Keep Alive".to_string(), "Suspend Now".to_string()],
        };
        let response = Response::Effect(effect);

        let mut buffer = Vec::new();
        write_message(&mut buffer, &response).unwrap();
        let back: Response = read_message(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn test_oversized_message_is_rejected() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&(MAX_MESSAGE_BYTES + 1).to_be_bytes());
        let result: Result<Request> = read_message(&mut Cursor::new(buffer));
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_body_is_an_error() {
        let mut buffer = Vec::new();
        write_message(&mut buffer, &Request::Ping).unwrap();
        buffer.truncate(buffer.len() - 1);
        let result: Result<Request> = read_message(&mut Cursor::new(buffer));
        assert!(result.is_err());
    }
}
