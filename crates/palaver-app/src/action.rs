//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents
//! instructions produced by the [`crate::App`] state machine for the
//! runtime to execute.

use palaver_client::Credential;
use palaver_proto::OutboundEvent;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Configure the channel with this credential and connect.
    Connect {
        /// Credential to present in the handshake.
        credential: Credential,
    },

    /// Tear the channel down.
    Disconnect,

    /// Send an event to the server.
    Emit(OutboundEvent),

    /// Empty the durable token slot.
    ClearToken,
}
