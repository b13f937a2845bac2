//! Inbound event subscription registry.
//!
//! An explicit registry keyed by [`EventKind`] with single-handler-per-kind
//! semantics: registering a handler replaces any prior one, so registration
//! is idempotent. The registry's lifetime is independent of connection
//! churn: handlers registered once at startup survive every reconnect,
//! which closes the duplicate-delivery bug class where listeners pile up
//! per reconnect.

use std::collections::HashMap;

use palaver_proto::{EventKind, InboundEvent};

/// Boxed event handler.
type Handler = Box<dyn FnMut(InboundEvent) + Send>;

/// Subscription registry over inbound event kinds.
#[derive(Default)]
pub struct Subscriptions {
    handlers: HashMap<EventKind, Handler>,
}

impl Subscriptions {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for an event kind, replacing any prior one.
    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(InboundEvent) + Send + 'static) {
        if self.handlers.insert(kind, Box::new(handler)).is_some() {
            tracing::debug!(?kind, "replaced existing subscription");
        }
    }

    /// Remove the handler for an event kind. Returns whether one existed.
    pub fn off(&mut self, kind: EventKind) -> bool {
        self.handlers.remove(&kind).is_some()
    }

    /// Whether a handler is registered for this kind.
    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Route an event to its handler. Returns whether anyone consumed it.
    pub fn dispatch(&mut self, event: InboundEvent) -> bool {
        match self.handlers.get_mut(&event.kind()) {
            Some(handler) => {
                handler(event);
                true
            },
            None => {
                tracing::debug!(kind = ?event.kind(), "no subscriber for inbound event");
                false
            },
        }
    }
}

impl std::fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions").field("kinds", &self.handlers.keys()).finish()
    }
}
