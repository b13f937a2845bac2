//! Platform abstraction for the runtime.
//!
//! A [`Driver`] supplies everything the [`crate::Runtime`] needs from the
//! outside world: user commands, the authentication endpoint, the wire
//! transport, a clock, and a render sink. Production drivers wrap real I/O;
//! test drivers script all of it in memory with virtual time.

use std::{future::Future, ops::Add, time::Duration};

use palaver_client::AuthError;
use palaver_proto::Packet;

use crate::{App, Command};

/// Transport lifecycle notifications surfaced by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The transport link came up.
    Opened,
    /// The transport link dropped.
    Closed,
    /// A raw frame arrived from the server.
    Frame(String),
}

/// Everything the runtime needs from the platform.
///
/// Poll methods must resolve promptly with `None` when nothing is pending;
/// a driver may park briefly inside a poll, but must never block the loop
/// indefinitely, so that both sources and the periodic tick stay live.
pub trait Driver: Send {
    /// Failures from the platform's I/O.
    type Error: std::error::Error + Send + 'static;

    /// Monotonic instant used for typing expiry. Virtual in tests.
    type Instant: Copy + Ord + Send + Sync + Add<Duration, Output = Self::Instant>;

    /// Next user command, if one is pending.
    fn poll_command(
        &mut self,
    ) -> impl Future<Output = Result<Option<Command>, Self::Error>> + Send;

    /// Exchange credentials for a bearer token.
    fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<String, AuthError>> + Send;

    /// Create an account. Does not log in.
    fn register(
        &mut self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Dial the server, presenting the token.
    ///
    /// Completion means the dial was initiated; the link is up only once
    /// [`TransportEvent::Opened`] is observed.
    fn open_channel(
        &mut self,
        token: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send an encoded packet over the open transport.
    fn send_packet(
        &mut self,
        packet: Packet,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next transport notification, if one is pending.
    fn poll_transport(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Tear the transport down. Idempotent.
    fn close_channel(&mut self) -> impl Future<Output = ()> + Send;

    /// Current instant.
    fn now(&self) -> Self::Instant;

    /// Present the application state to the user.
    fn render(&mut self, app: &App<Self::Instant>);
}
