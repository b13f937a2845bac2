//! Chat events.
//!
//! Outbound events are built by the client and always well-formed, so their
//! packet conversion is infallible. Inbound events come from servers whose
//! payload shapes drift between deployments (presence snapshots in
//! particular), so decoding is deliberately tolerant: unknown event names
//! are skipped, optional fields default, and only a known event with an
//! uninterpretable payload is an error.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{Packet, ProtocolError};

/// Inbound event kinds.
///
/// Used as subscription registry keys; each [`InboundEvent`] maps to exactly
/// one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Server acknowledged the authenticated connection.
    Connected,
    /// A chat message was delivered.
    Message,
    /// Full replacement list of users online in a room.
    PresenceSnapshot,
    /// A peer is composing a message.
    Typing,
    /// Protocol-level error notice; non-fatal to the connection.
    ServerError,
}

impl EventKind {
    /// Event name as it appears on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Message => "message",
            Self::PresenceSnapshot => "online_users",
            Self::Typing => "typing",
            Self::ServerError => "error",
        }
    }

    /// Parse a wire event name. `None` for unknown names.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "connected" => Some(Self::Connected),
            "message" => Some(Self::Message),
            "online_users" => Some(Self::PresenceSnapshot),
            "typing" => Some(Self::Typing),
            "error" => Some(Self::ServerError),
            _ => None,
        }
    }
}

/// A chat message as delivered by the server.
///
/// Immutable once received. The timestamp is server-assigned and opaque to
/// the client; insertion order in the log is arrival order, not timestamp
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author's display identity.
    pub user: String,

    /// Message body.
    pub message: String,

    /// Server-assigned timestamp. Empty when the server omits it.
    #[serde(default)]
    pub timestamp: String,

    /// Room the message belongs to. Older deployments omit the tag, in
    /// which case scope is inferred client-side from the active room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// Full replacement list of users online in a room.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PresenceSnapshot {
    /// Room the snapshot is scoped to, when the server tags it.
    pub room: Option<String>,

    /// Users currently online. The server is the sole source of truth;
    /// this list replaces any previous one wholesale.
    pub users: Vec<String>,
}

/// Wire shapes observed for presence snapshots across deployments.
#[derive(Deserialize)]
#[serde(untagged)]
enum PresenceWire {
    Envelope {
        #[serde(default)]
        room: Option<String>,
        #[serde(default)]
        users: Vec<String>,
    },
    Bare(Vec<String>),
}

impl From<PresenceWire> for PresenceSnapshot {
    fn from(wire: PresenceWire) -> Self {
        match wire {
            PresenceWire::Envelope { room, users } => Self { room, users },
            PresenceWire::Bare(users) => Self { room: None, users },
        }
    }
}

/// Events the server sends to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Authenticated connection acknowledged. Payload contents vary by
    /// deployment and carry nothing the client needs, so they are dropped.
    Connected,

    /// A chat message was delivered.
    Message(ChatMessage),

    /// Presence snapshot for a room.
    Presence(PresenceSnapshot),

    /// A peer is composing a message.
    Typing {
        /// Identity of the typing user.
        user: String,
    },

    /// Protocol-level error notice. Surfaced to the caller, never fatal to
    /// the connection.
    ServerError {
        /// Human-readable description from the server.
        message: String,
    },
}

impl InboundEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected => EventKind::Connected,
            Self::Message(_) => EventKind::Message,
            Self::Presence(_) => EventKind::PresenceSnapshot,
            Self::Typing { .. } => EventKind::Typing,
            Self::ServerError { .. } => EventKind::ServerError,
        }
    }

    /// Decode an inbound event from a packet.
    ///
    /// Returns `Ok(None)` for event names this client does not know about.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidPayload` if the payload does not match
    /// the shape required for a known event.
    pub fn from_packet(packet: &Packet) -> Result<Option<Self>, ProtocolError> {
        let Some(kind) = EventKind::from_wire(&packet.event) else {
            return Ok(None);
        };

        let invalid = |reason: String| ProtocolError::InvalidPayload {
            event: packet.event.clone(),
            reason,
        };

        let event = match kind {
            EventKind::Connected => Self::Connected,
            EventKind::Message => {
                let message: ChatMessage = serde_json::from_value(packet.data.clone())
                    .map_err(|e| invalid(e.to_string()))?;
                Self::Message(message)
            },
            EventKind::PresenceSnapshot => {
                let wire: PresenceWire = serde_json::from_value(packet.data.clone())
                    .map_err(|e| invalid(e.to_string()))?;
                Self::Presence(wire.into())
            },
            EventKind::Typing => {
                #[derive(Deserialize)]
                struct TypingWire {
                    user: String,
                }
                let wire: TypingWire = serde_json::from_value(packet.data.clone())
                    .map_err(|e| invalid(e.to_string()))?;
                Self::Typing { user: wire.user }
            },
            EventKind::ServerError => Self::ServerError { message: error_text(&packet.data) },
        };

        Ok(Some(event))
    }
}

/// Extract a human-readable message from an error payload.
///
/// Servers send `{"message": ..}`, a bare string, or arbitrary debris; all
/// of it is surfaced as a notice rather than rejected.
fn error_text(data: &Value) -> String {
    match data {
        Value::Object(map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => message.to_owned(),
            None => data.to_string(),
        },
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Events the client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Join a room.
    Join {
        /// Room to join.
        room: String,
    },

    /// Leave a room.
    Leave {
        /// Room to leave.
        room: String,
    },

    /// Send a chat message to a room.
    Message {
        /// Message body.
        message: String,
        /// Target room.
        room: String,
    },

    /// Signal that the local user is composing a message.
    Typing {
        /// Room the composer is scoped to.
        room: String,
    },
}

impl OutboundEvent {
    /// Wire event name for this event.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Message { .. } => "message",
            Self::Typing { .. } => "typing",
        }
    }

    /// Build the packet for this event.
    pub fn into_packet(self) -> Packet {
        let name = self.wire_name();
        let data = match self {
            Self::Join { room } | Self::Leave { room } | Self::Typing { room } => {
                json!({ "room": room })
            },
            Self::Message { message, room } => json!({ "message": message, "room": room }),
        };
        Packet::new(name, data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn decode(event: &str, data: Value) -> Result<Option<InboundEvent>, ProtocolError> {
        InboundEvent::from_packet(&Packet::new(event, data))
    }

    #[test]
    fn presence_envelope_shape() {
        let event = decode("online_users", json!({"room": "general", "users": ["alice", "bob"]}))
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            InboundEvent::Presence(PresenceSnapshot {
                room: Some("general".into()),
                users: vec!["alice".into(), "bob".into()],
            })
        );
    }

    #[test]
    fn presence_bare_list_shape() {
        let event = decode("online_users", json!(["alice"])).unwrap().unwrap();
        assert_eq!(
            event,
            InboundEvent::Presence(PresenceSnapshot { room: None, users: vec!["alice".into()] })
        );
    }

    #[test]
    fn presence_missing_users_defaults_to_empty() {
        let event = decode("online_users", json!({"room": "general"})).unwrap().unwrap();
        assert_eq!(
            event,
            InboundEvent::Presence(PresenceSnapshot { room: Some("general".into()), users: vec![] })
        );
    }

    #[test]
    fn message_without_room_tag() {
        let event = decode("message", json!({"user": "bob", "message": "hi", "timestamp": "12:00"}))
            .unwrap()
            .unwrap();
        let InboundEvent::Message(message) = event else {
            panic!("expected message event");
        };
        assert_eq!(message.room, None);
        assert_eq!(message.user, "bob");
    }

    #[test]
    fn message_missing_body_is_invalid() {
        assert!(matches!(
            decode("message", json!({"user": "bob"})),
            Err(ProtocolError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn unknown_event_is_skipped() {
        assert_eq!(decode("reaction", json!({"emoji": "wave"})).unwrap(), None);
    }

    #[test]
    fn error_payload_shapes() {
        let event = decode("error", json!({"message": "room is full"})).unwrap().unwrap();
        assert_eq!(event, InboundEvent::ServerError { message: "room is full".into() });

        let event = decode("error", json!("unauthorized")).unwrap().unwrap();
        assert_eq!(event, InboundEvent::ServerError { message: "unauthorized".into() });
    }

    #[test]
    fn outbound_message_packet_shape() {
        let packet =
            OutboundEvent::Message { message: "hello".into(), room: "general".into() }.into_packet();
        assert_eq!(packet.event, "message");
        assert_eq!(packet.data, json!({"message": "hello", "room": "general"}));
    }

    #[test]
    fn kind_round_trips_through_wire_name() {
        for kind in [
            EventKind::Connected,
            EventKind::Message,
            EventKind::PresenceSnapshot,
            EventKind::Typing,
            EventKind::ServerError,
        ] {
            assert_eq!(EventKind::from_wire(kind.wire_name()), Some(kind));
        }
    }
}
