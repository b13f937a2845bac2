//! Per-room message log.

/// A message in the active room's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Author's display identity.
    pub author: String,
    /// Message body.
    pub body: String,
    /// Server-assigned timestamp, kept as an opaque string.
    pub timestamp: String,
}

/// Ordered, append-only view of messages for the active room.
///
/// Insertion order is arrival order: no reordering, no deduplication;
/// each server-delivered message is appended exactly once. Room scoping is
/// enforced by the session machine before a message reaches the log, and
/// the log is cleared synchronously with every room switch.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop everything. Called as part of the room-switch transaction.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
