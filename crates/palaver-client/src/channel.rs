//! Channel lifecycle state machine.
//!
//! Owns the single long-lived connection's lifecycle: the authentication
//! handshake, reconnect policy, and gating of outbound sends. Uses the
//! action pattern: methods mutate pure state and return actions for the
//! driver to execute, so every transition is testable without a server.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  connect   ┌────────────┐  transport_opened  ┌───────────┐
//! │ Disconnected │───────────>│ Connecting │───────────────────>│ Connected │
//! └──────────────┘            └────────────┘                    └───────────┘
//!        ^                          ^     transport_closed            │
//!        │                          └─────────────────────────────────┤
//!        │                    disconnect                              │
//!        └────────────────────────────────────────────────────────────┘
//! ```
//!
//! A dropped transport moves back to `Connecting` (the driver redials with
//! the current credential); only an explicit `disconnect` reaches
//! `Disconnected`. Inbound `error` events are delivered to the caller and
//! never tear the connection down.

use palaver_proto::{InboundEvent, OutboundEvent, Packet};

use crate::{credential::Credential, error::ChannelError};

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No transport, no pending dial.
    Disconnected,
    /// Dial in progress (initial connect or transport-layer retry).
    Connecting,
    /// Transport open, credential presented.
    Connected,
}

/// Actions returned by the channel state machine.
///
/// The driver executes these:
/// - `Open`: dial the transport, presenting the token in the handshake
/// - `Transmit`: send the packet over the open transport
/// - `Deliver`: route the inbound event to the subscription registry
/// - `Close`: tear the transport down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelAction {
    /// Dial the transport with this handshake token.
    Open {
        /// Current credential, presented verbatim.
        token: String,
    },

    /// Send this packet to the server.
    Transmit(Packet),

    /// Route this inbound event to its subscriber.
    Deliver(InboundEvent),

    /// Tear down the transport.
    Close,
}

/// Channel lifecycle state machine.
///
/// An explicitly owned, injectable instance with a defined lifecycle:
/// constructed at session start, discarded at logout. Nothing else may
/// open or close the transport.
#[derive(Debug, Clone)]
pub struct ChannelClient {
    state: ChannelState,
    credential: Option<Credential>,
}

impl ChannelClient {
    /// Create a disconnected channel with no credential configured.
    pub fn new() -> Self {
        Self { state: ChannelState::Disconnected, credential: None }
    }

    /// Current connection state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Token to present on the next dial. Always reflects the current
    /// credential, never a cached stale one.
    pub fn auth_token(&self) -> Option<&str> {
        self.credential.as_ref().map(Credential::as_str)
    }

    /// Set the handshake credential. Must be called before [`connect`].
    ///
    /// Replaces any previous credential; a redial after this point presents
    /// the new token.
    ///
    /// [`connect`]: Self::connect
    pub fn configure_auth(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    /// Initiate the transport handshake carrying the credential.
    ///
    /// # Errors
    ///
    /// - `ChannelError::NotConfigured` if no credential is set
    /// - `ChannelError::InvalidState` if not `Disconnected`
    pub fn connect(&mut self) -> Result<Vec<ChannelAction>, ChannelError> {
        if self.state != ChannelState::Disconnected {
            return Err(ChannelError::InvalidState { state: self.state, operation: "connect" });
        }
        let token = self.credential.as_ref().ok_or(ChannelError::NotConfigured)?.as_str().into();

        self.state = ChannelState::Connecting;
        Ok(vec![ChannelAction::Open { token }])
    }

    /// Transport reported an open connection.
    ///
    /// Connection state is not assumed to survive across opens: the caller
    /// re-issues its room join when the server acknowledges the session
    /// with a `connected` event.
    pub fn transport_opened(&mut self) -> Vec<ChannelAction> {
        if self.state == ChannelState::Disconnected {
            // Stale callback from a transport we already tore down.
            tracing::warn!("transport opened after disconnect; ignoring");
            return vec![];
        }
        self.state = ChannelState::Connected;
        vec![]
    }

    /// Transport reported a dropped connection.
    ///
    /// Non-terminal: session state is preserved and the returned `Open`
    /// has the driver redial with the current credential.
    pub fn transport_closed(&mut self) -> Vec<ChannelAction> {
        match (self.state, &self.credential) {
            (ChannelState::Disconnected, _) => vec![],
            (_, Some(credential)) => {
                self.state = ChannelState::Connecting;
                vec![ChannelAction::Open { token: credential.as_str().into() }]
            },
            (_, None) => {
                self.state = ChannelState::Disconnected;
                vec![]
            },
        }
    }

    /// Tear down the transport deterministically. Idempotent.
    pub fn disconnect(&mut self) -> Vec<ChannelAction> {
        if self.state == ChannelState::Disconnected {
            return vec![];
        }
        self.state = ChannelState::Disconnected;
        vec![ChannelAction::Close]
    }

    /// Outbound send.
    ///
    /// Silently dropped unless `Connected`; gating sends on application
    /// state (e.g. an empty message body) is the caller's job.
    pub fn emit(&mut self, event: OutboundEvent) -> Vec<ChannelAction> {
        if self.state != ChannelState::Connected {
            tracing::debug!(event = event.wire_name(), state = ?self.state, "dropping outbound event");
            return vec![];
        }
        vec![ChannelAction::Transmit(event.into_packet())]
    }

    /// Process a raw inbound frame.
    ///
    /// Known events produce a `Deliver` action; unknown event names are
    /// logged and skipped. A server `error` event is delivered like any
    /// other; it never tears the connection down.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Protocol` if the frame is not a valid packet
    /// or a known event's payload cannot be interpreted.
    pub fn handle_frame(&mut self, raw: &str) -> Result<Vec<ChannelAction>, ChannelError> {
        if self.state == ChannelState::Disconnected {
            tracing::debug!("frame received after disconnect; ignoring");
            return Ok(vec![]);
        }

        let packet = Packet::decode(raw)?;
        match InboundEvent::from_packet(&packet)? {
            Some(event) => Ok(vec![ChannelAction::Deliver(event)]),
            None => {
                tracing::warn!(event = %packet.event, "unknown inbound event; skipping");
                Ok(vec![])
            },
        }
    }
}

impl Default for ChannelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn connected_channel() -> ChannelClient {
        let mut channel = ChannelClient::new();
        channel.configure_auth(Credential::new("tok-1"));
        let _ = channel.connect().unwrap();
        let _ = channel.transport_opened();
        channel
    }

    #[test]
    fn connect_requires_credential() {
        let mut channel = ChannelClient::new();
        assert_eq!(channel.connect(), Err(ChannelError::NotConfigured));
        assert_eq!(channel.state(), ChannelState::Disconnected);
    }

    #[test]
    fn connect_presents_configured_token() {
        let mut channel = ChannelClient::new();
        channel.configure_auth(Credential::new("tok-1"));

        let actions = channel.connect().unwrap();
        assert_eq!(actions, vec![ChannelAction::Open { token: "tok-1".into() }]);
        assert_eq!(channel.state(), ChannelState::Connecting);
    }

    #[test]
    fn connect_twice_is_an_error() {
        let mut channel = ChannelClient::new();
        channel.configure_auth(Credential::new("tok-1"));
        let _ = channel.connect().unwrap();

        assert!(matches!(
            channel.connect(),
            Err(ChannelError::InvalidState { state: ChannelState::Connecting, .. })
        ));
    }

    #[test]
    fn emit_is_gated_on_connected() {
        let mut channel = ChannelClient::new();
        channel.configure_auth(Credential::new("tok-1"));

        let join = OutboundEvent::Join { room: "general".into() };
        assert!(channel.emit(join.clone()).is_empty());

        let _ = channel.connect().unwrap();
        assert!(channel.emit(join.clone()).is_empty());

        let _ = channel.transport_opened();
        let actions = channel.emit(join.clone());
        assert_eq!(actions, vec![ChannelAction::Transmit(join.into_packet())]);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut channel = connected_channel();
        assert_eq!(channel.disconnect(), vec![ChannelAction::Close]);
        assert_eq!(channel.disconnect(), vec![]);
        assert_eq!(channel.state(), ChannelState::Disconnected);
    }

    #[test]
    fn dropped_transport_redials_with_current_credential() {
        let mut channel = connected_channel();

        let actions = channel.transport_closed();
        assert_eq!(actions, vec![ChannelAction::Open { token: "tok-1".into() }]);
        assert_eq!(channel.state(), ChannelState::Connecting);
    }

    #[test]
    fn redial_presents_replacement_credential_not_stale_one() {
        let mut channel = connected_channel();
        channel.configure_auth(Credential::new("tok-2"));

        let actions = channel.transport_closed();
        assert_eq!(actions, vec![ChannelAction::Open { token: "tok-2".into() }]);
    }

    #[test]
    fn transport_callbacks_after_disconnect_are_ignored() {
        let mut channel = connected_channel();
        let _ = channel.disconnect();

        assert!(channel.transport_closed().is_empty());
        assert!(channel.transport_opened().is_empty());
        assert_eq!(channel.state(), ChannelState::Disconnected);

        let actions = channel.handle_frame(r#"{"event":"typing","data":{"user":"bob"}}"#).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn inbound_frames_are_delivered() {
        let mut channel = connected_channel();

        let actions = channel.handle_frame(r#"{"event":"typing","data":{"user":"bob"}}"#).unwrap();
        assert_eq!(
            actions,
            vec![ChannelAction::Deliver(InboundEvent::Typing { user: "bob".into() })]
        );
    }

    #[test]
    fn server_error_is_delivered_not_fatal() {
        let mut channel = connected_channel();

        let actions =
            channel.handle_frame(r#"{"event":"error","data":{"message":"room is full"}}"#).unwrap();
        assert_eq!(
            actions,
            vec![ChannelAction::Deliver(InboundEvent::ServerError {
                message: "room is full".into()
            })]
        );
        assert_eq!(channel.state(), ChannelState::Connected);
    }

    #[test]
    fn unknown_event_is_skipped() {
        let mut channel = connected_channel();
        let actions = channel.handle_frame(r#"{"event":"reaction","data":{}}"#).unwrap();
        assert!(actions.is_empty());
        assert_eq!(channel.state(), ChannelState::Connected);
    }

    #[test]
    fn malformed_frame_is_a_protocol_error() {
        let mut channel = connected_channel();
        assert!(matches!(channel.handle_frame("not json"), Err(ChannelError::Protocol(_))));
    }
}
