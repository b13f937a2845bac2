//! Client
//!
//! Session credential handling and the channel state machine for the
//! Palaver chat client.
//!
//! # Architecture
//!
//! The channel follows the Sans-IO and action-based patterns: methods on
//! [`ChannelClient`] consume transport events and application intents,
//! mutate pure state, and return [`ChannelAction`]s for the driver to
//! execute. No I/O happens inside the state machine, which keeps every
//! lifecycle transition testable without a server.
//!
//! # Components
//!
//! - [`ChannelClient`]: connection lifecycle state machine
//! - [`Subscriptions`]: inbound event registry, decoupled from connection
//!   churn so reconnects can never double-register a handler
//! - [`Credential`] / [`Session`]: token decoding and identity extraction
//! - [`TokenStore`]: durable credential slot
//!
//! # Optional features
//!
//! - `http`: [`auth::AuthApi`], a `reqwest`-based client for the login and
//!   registration endpoints
//! - `transport`: [`transport::ConnectedChannel`], a WebSocket transport
//!   bridging packets over channels

#![forbid(unsafe_code)]
#![deny(missing_docs)]

#[cfg(feature = "http")]
pub mod auth;
mod channel;
mod credential;
mod dispatch;
mod error;
mod token_store;
#[cfg(feature = "transport")]
pub mod transport;

pub use channel::{ChannelAction, ChannelClient, ChannelState};
pub use credential::{Credential, Session};
pub use dispatch::Subscriptions;
pub use error::{AuthError, ChannelError, DecodeError, StoreError};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
