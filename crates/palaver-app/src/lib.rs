//! Application layer for Palaver
//!
//! Pure state machines and a generic runtime for session and room
//! orchestration, enabling deterministic testing with the same code that
//! runs in production.
//!
//! # Components
//!
//! - [`App`]: session state machine (room membership transactions, message
//!   log, presence, typing)
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop wiring the [`App`], the
//!   channel state machine, and the subscription registry together
//! - [`SimClock`]: virtual time for deterministic tests

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod command;
mod driver;
mod message_log;
mod presence;
mod runtime;
mod sim;
mod typing;

pub use action::AppAction;
pub use app::{App, DEFAULT_ROOM, RoomPhase};
pub use command::Command;
pub use driver::{Driver, TransportEvent};
pub use message_log::{Message, MessageLog};
pub use presence::PresenceTracker;
pub use runtime::{Runtime, RuntimeError};
pub use sim::{SimClock, SimInstant};
pub use typing::{TYPING_TIMEOUT, TypingSignal};
