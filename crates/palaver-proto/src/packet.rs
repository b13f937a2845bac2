//! JSON packet envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProtocolError;

/// The envelope carried by the transport: an event name plus its payload.
///
/// The event name selects the payload shape; the payload itself stays a raw
/// [`Value`] until an [`crate::InboundEvent`] is decoded from it, so that
/// unknown events can be skipped without failing the whole stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Wire event name (`join`, `message`, `online_users`, ...).
    pub event: String,

    /// Event payload. Defaults to `null` when the server omits it.
    #[serde(default)]
    pub data: Value,
}

impl Packet {
    /// Create a packet from an event name and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self { event: event.into(), data }
    }

    /// Encode to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Encode` if serialization fails.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode from a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::MalformedPacket` if the frame is not a valid
    /// envelope.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }
}
