//! HTTP client for the auth backend.
//!
//! Thin boundary over `POST /login` and `POST /register`. Any non-2xx
//! response is an auth failure whose server message is surfaced verbatim;
//! the session is only created once the returned token decodes.

use palaver_proto::auth::{ApiError, AuthRequest, TokenResponse};

use crate::error::AuthError;

/// Client for the login and registration endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    base_url: String,
    http: reqwest::Client,
}

impl AuthApi {
    /// Create a client for a backend at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// - `AuthError::Rejected` with the server's message on non-2xx
    /// - `AuthError::Transport` if the request never produced a response
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let response = self
            .post("/login", &AuthRequest { username: username.into(), password: password.into() })
            .await?;
        response.json().await.map_err(|e| AuthError::Transport(e.to_string()))
    }

    /// Create an account. Success carries no body worth keeping.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`login`](Self::login); a username conflict is a
    /// `Rejected` with the backend's message.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        self.post("/register", &AuthRequest { username: username.into(), password: password.into() })
            .await?;
        Ok(())
    }

    async fn post(&self, path: &str, body: &AuthRequest) -> Result<reqwest::Response, AuthError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = match response.json::<ApiError>().await {
            Ok(error) if !error.message.is_empty() => error.message,
            _ => status.to_string(),
        };
        Err(AuthError::Rejected { message })
    }
}
