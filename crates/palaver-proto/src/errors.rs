//! Protocol error types.
//!
//! Covers packet envelope and payload failures. Unknown event names are not
//! errors (deployments add events freely, so the decoder skips them), but
//! a known event with a payload that cannot be interpreted is.

use thiserror::Error;

/// Errors that can occur while encoding or decoding packets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Packet is not a valid JSON envelope
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// Payload does not match the shape expected for its event name
    #[error("invalid payload for event {event:?}: {reason}")]
    InvalidPayload {
        /// Event name from the envelope
        event: String,
        /// What went wrong during payload decoding
        reason: String,
    },

    /// Value could not be serialized to JSON
    #[error("encode error: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPacket(err.to_string())
    }
}
