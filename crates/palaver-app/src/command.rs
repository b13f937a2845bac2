//! Commands issued by the presentation layer.

/// User intents the runtime accepts from a frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Exchange credentials for a session and connect.
    Login {
        /// Account name.
        username: String,
        /// Plaintext password.
        password: String,
    },

    /// Create an account. Does not log in.
    Register {
        /// Account name.
        username: String,
        /// Plaintext password.
        password: String,
    },

    /// End the session: disconnect, clear the stored token, reset state.
    Logout,

    /// Switch the active room.
    SwitchRoom(
        /// Target room name.
        String,
    ),

    /// Send the composer contents to the active room.
    Send,

    /// The composer text changed.
    InputChanged(
        /// New composer contents.
        String,
    ),

    /// Quit the application.
    Quit,
}
