//! Wire types for the Palaver chat protocol.
//!
//! The chat server speaks a small JSON event protocol over a persistent
//! bidirectional channel: every packet is an envelope `{"event": ..,
//! "data": ..}` where the event name selects the payload shape. Payloads
//! use JSON rather than a binary encoding because the server is
//! self-describing and deployments disagree on optional fields; tolerant
//! decoding matters more than compactness here.
//!
//! # Components
//!
//! - [`Packet`]: the JSON envelope carried by the transport
//! - [`OutboundEvent`]: client-to-server events (join, leave, message,
//!   typing)
//! - [`InboundEvent`]: server-to-client events (connected, message,
//!   presence snapshot, typing, error)
//! - [`EventKind`]: inbound event kinds, used as subscription keys
//! - [`auth`]: request/response bodies for the HTTP auth boundary
//!
//! # Invariants
//!
//! Each inbound event maps to exactly one [`EventKind`]. Encoding an
//! [`OutboundEvent`] and decoding the resulting packet's data must produce
//! an equivalent value.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod auth;
mod errors;
mod event;
mod packet;

pub use errors::ProtocolError;
pub use event::{ChatMessage, EventKind, InboundEvent, OutboundEvent, PresenceSnapshot};
pub use packet::Packet;
