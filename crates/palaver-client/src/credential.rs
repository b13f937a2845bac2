//! Session credentials.
//!
//! A [`Credential`] is the opaque signed token issued by the auth backend.
//! The client never verifies the signature (the server is the verifier);
//! it only extracts the embedded identity claim to display who is logged
//! in, without network access. Expiry is still checked locally so a stale
//! token forces a fresh login instead of a doomed connection attempt.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::error::DecodeError;

/// Identity claims embedded in the credential.
///
/// The backend puts the account name in `sub`.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
}

/// Opaque signed session credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    raw: String,
}

impl Credential {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Raw token value, presented verbatim in the connection handshake.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Extract the identity claim without contacting the server.
    ///
    /// # Errors
    ///
    /// - `DecodeError::Malformed` if the token is not decodable
    /// - `DecodeError::Expired` if the embedded expiry is in the past
    /// - `DecodeError::MissingIdentity` if there is no `sub` claim
    pub fn decode_identity(&self) -> Result<String, DecodeError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Identity extraction only; the server remains the verifier.
        validation.insecure_disable_signature_validation();
        validation.validate_aud = false;

        let token = decode::<Claims>(&self.raw, &DecodingKey::from_secret(&[]), &validation)?;

        token.claims.sub.ok_or(DecodeError::MissingIdentity)
    }
}

/// The authenticated runtime context: an identity bound to the credential
/// that proved it.
///
/// Created only when a credential decodes successfully; destroyed on
/// logout, decode failure, or explicit disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Display identity from the credential's `sub` claim.
    pub identity: String,

    /// The credential that established this session.
    pub credential: Credential,
}

impl Session {
    /// Establish a session by decoding the credential's identity.
    ///
    /// # Errors
    ///
    /// Propagates [`DecodeError`] from identity extraction. On failure the
    /// caller must treat the session as unestablished and clear the stored
    /// credential.
    pub fn establish(credential: Credential) -> Result<Self, DecodeError> {
        let identity = credential.decode_identity()?;
        Ok(Self { identity, credential })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct TestClaims {
        sub: Option<&'static str>,
        exp: u64,
    }

    fn token(sub: Option<&'static str>, exp: u64) -> String {
        encode(&Header::default(), &TestClaims { sub, exp }, &EncodingKey::from_secret(b"server"))
            .unwrap()
    }

    const FAR_FUTURE: u64 = 4_000_000_000; // year 2096

    #[test]
    fn identity_comes_from_sub_claim() {
        let credential = Credential::new(token(Some("alice"), FAR_FUTURE));
        assert_eq!(credential.decode_identity().unwrap(), "alice");
    }

    #[test]
    fn session_binds_identity_to_credential() {
        let raw = token(Some("alice"), FAR_FUTURE);
        let session = Session::establish(Credential::new(raw.clone())).unwrap();
        assert_eq!(session.identity, "alice");
        assert_eq!(session.credential.as_str(), raw);
    }

    #[test]
    fn garbage_is_malformed() {
        let credential = Credential::new("abc.def.ghi");
        assert!(matches!(credential.decode_identity(), Err(DecodeError::Malformed(_))));

        let credential = Credential::new("");
        assert!(matches!(credential.decode_identity(), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let credential = Credential::new(token(Some("alice"), 1_000_000)); // 1970
        assert_eq!(credential.decode_identity(), Err(DecodeError::Expired));
    }

    #[test]
    fn missing_sub_is_rejected() {
        let credential = Credential::new(token(None, FAR_FUTURE));
        assert_eq!(credential.decode_identity(), Err(DecodeError::MissingIdentity));
    }
}
