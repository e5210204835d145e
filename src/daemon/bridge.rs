//! Daemon-side implementations of the scheduler's collaborator seams.
//!
//! Tab snapshots come in over the socket and live in a [`TabRegistry`];
//! discard and alert effects go back out to every connected effect
//! subscriber. Effects are fire-and-forget: a dead subscriber is dropped,
//! and having no subscriber at all only means nobody is listening yet.

use std::os::unix::net::UnixStream;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::protocol::{write_message, Effect, Response};
use crate::alerts::{warn_message, AlertSink, DesktopNotifier, WARN_ACTIONS, WARN_TITLE};
use crate::host::{EffectError, TabHost, TabRegistry};
use crate::models::{TabId, TabSnapshot};

/// Fan-out channel for outbound effects.
#[derive(Clone, Default)]
pub struct EffectBus {
    subscribers: Arc<Mutex<Vec<UnixStream>>>,
}

impl EffectBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection that wants to receive effects.
    pub fn subscribe(&self, stream: UnixStream) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stream);
    }

    /// Send an effect to every subscriber, dropping the dead ones.
    pub fn publish(&self, effect: Effect) {
        let response = Response::Effect(effect);
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subs.retain_mut(|stream| write_message(stream, &response).is_ok());
    }
}

/// [`TabHost`] backed by the bridge-fed registry. Discards are applied to
/// the local snapshot immediately (so the scheduler stops evaluating the
/// tab) and published for the bridge to execute in the real host.
pub struct BridgeHost {
    registry: TabRegistry,
    bus: EffectBus,
}

impl BridgeHost {
    pub fn new(registry: TabRegistry, bus: EffectBus) -> Self {
        Self { registry, bus }
    }
}

impl TabHost for BridgeHost {
    fn list_tabs(&self) -> Result<Vec<TabSnapshot>, EffectError> {
        Ok(self.registry.list())
    }

    fn discard(&self, tab_id: TabId) -> Result<(), EffectError> {
        if self.registry.mark_discarded(tab_id)? {
            self.bus.publish(Effect::Discard { tab_id });
        }
        Ok(())
    }
}

/// [`AlertSink`] that publishes warnings to effect subscribers and
/// mirrors them to a desktop notification.
pub struct BridgeAlerts {
    bus: EffectBus,
    desktop: Option<DesktopNotifier>,
}

impl BridgeAlerts {
    pub fn new(bus: EffectBus, desktop_notifications: bool) -> Self {
        Self {
            bus,
            desktop: desktop_notifications.then_some(DesktopNotifier),
        }
    }
}

impl AlertSink for BridgeAlerts {
    fn show(&self, tab: &TabSnapshot) -> Result<(), EffectError> {
        self.bus.publish(Effect::ShowAlert {
            tab_id: tab.id,
            title: WARN_TITLE.to_string(),
            message: warn_message(tab),
            actions: WARN_ACTIONS.iter().map(|a| a.to_string()).collect(),
        });

        if let Some(desktop) = &self.desktop {
            // The socket effect already went out; a missing notify-send
            // binary downgrades to a log line, not a failed warning.
            if let Err(e) = desktop.show(tab) {
                debug!(tab = tab.id, "desktop notification failed: {e}");
            }
        }
        Ok(())
    }

    fn clear(&self, tab_id: TabId) -> Result<(), EffectError> {
        self.bus.publish(Effect::ClearAlert { tab_id });
        Ok(())
    }
}
