//! Request header translation.
//!
//! # Responsibilities
//! - Strip `host`, `connection`, `content-length`, `authorization`
//! - Keep every other caller header unchanged, repeated values included
//! - Inject the server-held `Authorization: Bearer` header
//!
//! The caller never gets to choose the upstream credential, and framing
//! headers are recomputed by the client for the body actually sent.

use axum::http::{header, HeaderMap, HeaderName};

use crate::security::credential::BearerCredential;

/// Headers never copied from the caller to the upstream.
pub const STRIPPED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::AUTHORIZATION,
];

/// Copy the caller's headers, minus the stripped set.
pub fn filter_request_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut outgoing = HeaderMap::with_capacity(incoming.len());
    for (name, value) in incoming {
        // HeaderName is always lowercase, so equality is case-insensitive.
        if STRIPPED_REQUEST_HEADERS.contains(name) {
            continue;
        }
        outgoing.append(name.clone(), value.clone());
    }
    outgoing
}

/// Set `Authorization` from the server credential, if one is configured.
pub fn inject_credential(headers: &mut HeaderMap, credential: Option<&BearerCredential>) {
    if let Some(credential) = credential {
        headers.insert(header::AUTHORIZATION, credential.authorization_header().clone());
    }
}
