//! Online-user tracking for the active room.

/// Set of users online in the active room.
///
/// Replaced wholesale on every accepted server snapshot; there are no
/// incremental add/remove semantics, which keeps the client from diverging
/// from the server's view. Snapshots for non-active rooms are discarded by
/// the session machine before they reach the tracker.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    users: Vec<String>,
}

impl PresenceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole user list with a server snapshot.
    pub fn replace(&mut self, users: Vec<String>) {
        self.users = users;
    }

    /// Drop everything. Called as part of the room-switch transaction.
    pub fn clear(&mut self) {
        self.users.clear();
    }

    /// Users currently online, in server order.
    pub fn users(&self) -> &[String] {
        &self.users
    }
}
