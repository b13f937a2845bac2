//! Session state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the chat client completely decoupled from I/O and
//! transport mechanics: the session lifecycle, the room membership
//! transaction, and the room-scoped message/presence/typing state.
//!
//! This is a pure state machine: commands and inbound events mutate state
//! and produce [`crate::AppAction`] instructions for the runtime to
//! execute. Time is passed in as a parameter, never read from a clock.
//!
//! # Room switching
//!
//! The room switch is the one sequence here that must be treated as a
//! transaction: leave is emitted, room-scoped state is cleared, the active
//! room changes, and join is emitted, all within a single call under
//! single-threaded event dispatch. In-flight inbound events from the old
//! room are then excluded by tag filtering: an event tagged with a room
//! other than the active one is discarded, and untagged messages and
//! typing signals are discarded while the join is still unacknowledged
//! ([`RoomPhase`] tracks that window). The window opens only for a switch
//! on a live connection; a fresh transport carries no stale traffic, so
//! membership is settled as soon as the server acknowledges a connect.
//! Presence snapshots close the window even untagged, since they replace
//! wholesale and the next snapshot corrects any stale one, which keeps
//! deployments that never tag their events fully live.

use std::{ops::Add, time::Duration};

use palaver_client::{ChannelState, Credential, DecodeError, Session};
use palaver_proto::{InboundEvent, OutboundEvent};

use crate::{
    AppAction,
    message_log::{Message, MessageLog},
    presence::PresenceTracker,
    typing::TypingSignal,
};

/// Room joined on login and after logout reset.
pub const DEFAULT_ROOM: &str = "general";

/// Where the session stands relative to its room membership.
///
/// `Leaving` and `Joining` bracket the switch transaction; the join window
/// closes when the first room-tagged inbound event for the target room
/// arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomPhase {
    /// Membership settled; untagged inbound events belong to the active
    /// room.
    Idle,

    /// Leave emitted, state clears in progress.
    Leaving {
        /// Room being left.
        room: String,
    },

    /// Join emitted, not yet acknowledged; untagged messages and typing
    /// signals may still be stale traffic and are discarded.
    Joining {
        /// Room being joined.
        room: String,
    },
}

/// Session state machine.
///
/// Pure state machine that processes commands and inbound events and
/// produces actions. It has no I/O dependencies, so it is fully testable
/// with a fake driver and virtual time.
#[derive(Debug, Clone)]
pub struct App<I> {
    /// Established session. `None` when unauthenticated.
    session: Option<Session>,
    /// Connection state as shown to the presentation layer.
    connection: ChannelState,
    /// Currently active room.
    current_room: String,
    /// Membership phase for the active room.
    room_phase: RoomPhase,
    /// Messages scoped to the active room.
    log: MessageLog,
    /// Users online in the active room.
    presence: PresenceTracker,
    /// Ephemeral typing indicator.
    typing: TypingSignal<I>,
    /// Composer contents.
    input: String,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl<I> App<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create an unauthenticated App.
    pub fn new() -> Self {
        Self {
            session: None,
            connection: ChannelState::Disconnected,
            current_room: DEFAULT_ROOM.to_owned(),
            room_phase: RoomPhase::Idle,
            log: MessageLog::new(),
            presence: PresenceTracker::new(),
            typing: TypingSignal::new(),
            input: String::new(),
            status_message: None,
        }
    }

    /// Establish a session from a credential and initiate the connection.
    ///
    /// Replaces any existing session and resets room-scoped state to the
    /// default room.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the credential does not yield an
    /// identity. The caller must then clear the stored credential and make
    /// no connection attempt.
    pub fn authenticate(&mut self, credential: Credential) -> Result<Vec<AppAction>, DecodeError> {
        let session = Session::establish(credential.clone())?;
        self.session = Some(session);
        self.connection = ChannelState::Connecting;
        self.reset_room_state();
        self.status_message = None;
        Ok(vec![AppAction::Connect { credential }, AppAction::Render])
    }

    /// End the session: disconnect, clear the stored token, reset state.
    ///
    /// Cancels any pending typing expiry so nothing fires after teardown.
    pub fn logout(&mut self) -> Vec<AppAction> {
        self.session = None;
        self.connection = ChannelState::Disconnected;
        self.reset_room_state();
        self.status_message = None;
        self.input.clear();
        vec![AppAction::Disconnect, AppAction::ClearToken, AppAction::Render]
    }

    /// Switch the active room.
    ///
    /// No-op when the target equals the active room: no leave/join is
    /// emitted and nothing is cleared. Otherwise the transaction runs to
    /// completion in this call: leave, clear, switch, join.
    pub fn switch_room(&mut self, room: impl Into<String>) -> Vec<AppAction> {
        let room = room.into();
        if self.session.is_none() || room.is_empty() || room == self.current_room {
            return vec![];
        }

        let previous = std::mem::replace(&mut self.current_room, room.clone());
        self.room_phase = RoomPhase::Leaving { room: previous.clone() };
        self.reset_room_scoped_views();
        self.room_phase = RoomPhase::Joining { room: room.clone() };

        vec![
            AppAction::Emit(OutboundEvent::Leave { room: previous }),
            AppAction::Emit(OutboundEvent::Join { room }),
            AppAction::Render,
        ]
    }

    /// Send the composer contents to the active room.
    ///
    /// No-op if the composer trims to empty. No optimistic local echo: the
    /// message appears only when the server echoes it back, so sender and
    /// receivers observe identical ordering.
    pub fn send(&mut self) -> Vec<AppAction> {
        let body = self.input.trim();
        if self.session.is_none() || body.is_empty() {
            return vec![];
        }

        let message = body.to_owned();
        self.input.clear();
        vec![
            AppAction::Emit(OutboundEvent::Message { message, room: self.current_room.clone() }),
            AppAction::Render,
        ]
    }

    /// Update the composer and signal typing to the active room.
    ///
    /// The receiver debounces; every edit emits.
    pub fn input_changed(&mut self, text: impl Into<String>) -> Vec<AppAction> {
        self.input = text.into();
        if self.session.is_none() {
            return vec![AppAction::Render];
        }
        vec![
            AppAction::Emit(OutboundEvent::Typing { room: self.current_room.clone() }),
            AppAction::Render,
        ]
    }

    /// Process an inbound event delivered by the channel.
    pub fn handle_inbound(&mut self, event: InboundEvent, now: I) -> Vec<AppAction> {
        match event {
            InboundEvent::Connected => {
                // Server acknowledged the session (first connect or a
                // reconnect). Membership never survives the transport, so
                // re-issue the join either way. A fresh transport cannot
                // carry stale traffic, so membership is settled at once;
                // the join window exists only for switches on a live
                // connection.
                self.connection = ChannelState::Connected;
                self.room_phase = RoomPhase::Idle;
                vec![
                    AppAction::Emit(OutboundEvent::Join { room: self.current_room.clone() }),
                    AppAction::Render,
                ]
            },
            InboundEvent::Message(message) => {
                if !self.admit(message.room.as_deref()) {
                    tracing::debug!(room = ?message.room, "discarding message outside active room");
                    return vec![];
                }
                self.log.append(Message {
                    author: message.user,
                    body: message.message,
                    timestamp: message.timestamp,
                });
                vec![AppAction::Render]
            },
            InboundEvent::Presence(snapshot) => {
                if !self.admit_snapshot(snapshot.room.as_deref()) {
                    tracing::debug!(room = ?snapshot.room, "discarding presence outside active room");
                    return vec![];
                }
                self.presence.replace(snapshot.users);
                vec![AppAction::Render]
            },
            InboundEvent::Typing { user } => {
                if self.identity() == Some(user.as_str()) {
                    // Our own signal echoed back.
                    return vec![];
                }
                if !matches!(self.room_phase, RoomPhase::Idle) {
                    return vec![];
                }
                self.typing.observe(user, now);
                vec![AppAction::Render]
            },
            InboundEvent::ServerError { message } => {
                // Non-fatal notice; the connection stays up.
                self.status_message = Some(message);
                vec![AppAction::Render]
            },
        }
    }

    /// The transport dropped; the channel redials while the session and
    /// room membership intent are preserved.
    pub fn channel_closed(&mut self) -> Vec<AppAction> {
        if self.session.is_none() {
            return vec![];
        }
        self.connection = ChannelState::Connecting;
        vec![AppAction::Render]
    }

    /// Periodic maintenance: expire the typing indicator.
    pub fn tick(&mut self, now: I) -> Vec<AppAction> {
        if self.typing.tick(now) { vec![AppAction::Render] } else { vec![] }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Decide whether an inbound event belongs to the active room.
    ///
    /// A matching tag also acknowledges a pending join, closing the window
    /// in which untagged events are discarded as potentially stale.
    fn admit(&mut self, tag: Option<&str>) -> bool {
        match tag {
            Some(room) if room == self.current_room => {
                self.room_phase = RoomPhase::Idle;
                true
            },
            Some(_) => false,
            None => matches!(self.room_phase, RoomPhase::Idle),
        }
    }

    /// Like [`admit`](Self::admit), but an untagged snapshot also closes a
    /// pending join: the server sends a fresh roster on join, snapshots
    /// replace wholesale, and a stale one is corrected by the next. This
    /// keeps deployments that never tag their events live after a switch.
    fn admit_snapshot(&mut self, tag: Option<&str>) -> bool {
        match tag {
            Some(room) if room != self.current_room => false,
            _ => {
                self.room_phase = RoomPhase::Idle;
                true
            },
        }
    }

    /// Reset membership to the default room with cleared views.
    fn reset_room_state(&mut self) {
        self.current_room = DEFAULT_ROOM.to_owned();
        self.room_phase = RoomPhase::Idle;
        self.reset_room_scoped_views();
    }

    /// Clear everything scoped to the active room.
    fn reset_room_scoped_views(&mut self) {
        self.log.clear();
        self.presence.clear();
        self.typing.clear();
    }

    /// Display identity. `None` when unauthenticated.
    pub fn identity(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.identity.as_str())
    }

    /// Connection state as shown to the presentation layer.
    pub fn connection(&self) -> ChannelState {
        self.connection
    }

    /// Currently active room.
    pub fn current_room(&self) -> &str {
        &self.current_room
    }

    /// Membership phase for the active room.
    pub fn room_phase(&self) -> &RoomPhase {
        &self.room_phase
    }

    /// Messages in the active room, in arrival order.
    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    /// Users online in the active room.
    pub fn online_users(&self) -> &[String] {
        self.presence.users()
    }

    /// Identity currently shown as typing, if any.
    pub fn typing_user(&self) -> Option<&str> {
        self.typing.user()
    }

    /// Composer contents.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

impl<I> Default for App<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    fn default() -> Self {
        Self::new()
    }
}
