//! Error types for the client layer.
//!
//! Strongly-typed errors per concern: credential decoding, token storage,
//! the auth boundary, and channel lifecycle. The split matters because the
//! failure policies differ: a [`DecodeError`] is terminal for the session
//! and forces a storage clear, while a dropped connection is transient and
//! preserves room membership intent.

use palaver_proto::ProtocolError;
use thiserror::Error;

use crate::channel::ChannelState;

/// Errors extracting an identity from a stored credential.
///
/// Any of these means the session is unestablished: the caller must clear
/// the stored credential and never retry it automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Credential is not a decodable token
    #[error("malformed credential: {0}")]
    Malformed(String),

    /// Credential carries an expiry in the past
    #[error("credential expired")]
    Expired,

    /// Credential decodes but has no identity claim
    #[error("credential has no identity claim")]
    MissingIdentity,
}

impl From<jsonwebtoken::errors::Error> for DecodeError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        // A missing `sub` is not surfaced here: the claim is optional at
        // the decode level and mapped to `MissingIdentity` by the caller.
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Errors from the durable token slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying storage I/O failed
    #[error("token store I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors from the HTTP auth boundary.
///
/// Terminal for the login attempt, never for an established session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Backend rejected the credentials or registration. The message is
    /// the server's, surfaced verbatim.
    #[error("{message}")]
    Rejected {
        /// Server-provided failure description.
        message: String,
    },

    /// Request never produced a response (network, DNS, TLS)
    #[error("auth transport error: {0}")]
    Transport(String),
}

/// Errors from the channel state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// `connect` called before `configure_auth`
    #[error("no credential configured: call configure_auth before connect")]
    NotConfigured,

    /// Invalid state transition attempted
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when the error occurred
        state: ChannelState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Inbound frame could not be interpreted
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
