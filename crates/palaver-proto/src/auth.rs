//! Request and response bodies for the HTTP auth boundary.
//!
//! The auth backend is an external collaborator; these types only pin down
//! the JSON contract the client consumes. Any non-2xx response carries an
//! [`ApiError`] whose message is surfaced to the user verbatim.

use serde::{Deserialize, Serialize};

/// Body for `POST /login` and `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    /// Account name.
    pub username: String,
    /// Plaintext password; the backend owns hashing and storage.
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed session credential. Opaque to everything except
    /// identity extraction.
    pub access_token: String,
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable failure description.
    #[serde(default)]
    pub message: String,
}
