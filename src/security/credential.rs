//! Server-held bearer credential.
//!
//! The secret is read once at startup and never leaves this type except as
//! a pre-built `Authorization` header value or as the `token` query
//! parameter on the upstream URI.

use axum::http::HeaderValue;

use crate::config::validation::ValidationError;

/// Bearer credential injected into every forwarded request.
#[derive(Clone)]
pub struct BearerCredential {
    secret: String,
    header: HeaderValue,
}

impl BearerCredential {
    /// Build a credential, failing if it cannot be carried in a header.
    pub fn new(secret: impl Into<String>) -> Result<Self, ValidationError> {
        let secret = secret.into();
        let mut header = HeaderValue::from_str(&format!("Bearer {}", secret))
            .map_err(|_| ValidationError::InvalidBearerToken)?;
        header.set_sensitive(true);
        Ok(Self { secret, header })
    }

    /// `Bearer <secret>`, marked sensitive so HPACK and debug output skip it.
    pub fn authorization_header(&self) -> &HeaderValue {
        &self.header
    }

    /// Raw secret for the `token` query parameter.
    pub(crate) fn expose_secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerCredential(<redacted>)")
    }
}
