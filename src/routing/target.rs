//! Upstream target derivation.
//!
//! # Responsibilities
//! - Strip the mount prefix and append the remainder to the base URL
//! - Copy caller query pairs verbatim, except `token`
//! - Append the server credential as `token`
//!
//! # Design Decisions
//! - The path remainder is forwarded still percent-encoded
//! - Duplicate query keys and pair order are preserved
//! - Dot segments are rejected; they would escape the base path

use axum::http::Uri;
use url::form_urlencoded;
use url::Url;

use crate::error::ProxyError;
use crate::routing::upstream::UpstreamSettings;
use crate::security::BearerCredential;

/// Query parameter reserved for the server credential.
pub const TOKEN_PARAM: &str = "token";

/// Where a single request is forwarded to.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    url: Url,
}

impl UpstreamTarget {
    /// Derive the upstream target for a request path under `mount_path`.
    pub fn resolve(
        settings: &UpstreamSettings,
        mount_path: &str,
        request_uri: &Uri,
    ) -> Result<Self, ProxyError> {
        let remainder = path_remainder(mount_path, request_uri.path()).ok_or_else(|| {
            ProxyError::InvalidTarget(format!("path is not under {}", mount_path))
        })?;
        if has_dot_segment(remainder) {
            return Err(ProxyError::InvalidTarget("dot segments are not allowed".into()));
        }

        let mut url = settings.base_url().clone();
        let base_path = settings.base_path();
        if remainder.is_empty() {
            url.set_path(base_path);
        } else {
            url.set_path(&format!("{}/{}", base_path, remainder));
        }

        let query = forwarded_query(request_uri.query(), settings.credential());
        url.set_query(query.as_deref());

        Ok(Self { url })
    }

    /// The full target URI, credential included.
    pub fn uri(&self) -> Result<Uri, ProxyError> {
        self.url
            .as_str()
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| ProxyError::InvalidTarget(e.to_string()))
    }

    /// Target path without the query; safe to log.
    pub fn log_path(&self) -> &str {
        self.url.path()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Path segments after the mount point, without the leading slash.
fn path_remainder<'a>(mount_path: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix(mount_path)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix('/')
}

fn has_dot_segment(remainder: &str) -> bool {
    remainder.split('/').any(|segment| {
        let lower = segment.to_ascii_lowercase().replace("%2e", ".");
        lower == "." || lower == ".."
    })
}

fn is_token_pair(pair: &str) -> bool {
    let raw_key = pair.split('=').next().unwrap_or(pair);
    form_urlencoded::parse(raw_key.as_bytes())
        .next()
        .is_some_and(|(key, _)| key.eq_ignore_ascii_case(TOKEN_PARAM))
}

fn forwarded_query(query: Option<&str>, credential: Option<&BearerCredential>) -> Option<String> {
    let mut pairs: Vec<String> = query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_token_pair(pair))
        .map(str::to_owned)
        .collect();

    if let Some(credential) = credential {
        let encoded: String =
            form_urlencoded::byte_serialize(credential.expose_secret().as_bytes()).collect();
        pairs.push(format!("{}={}", TOKEN_PARAM, encoded));
    }

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("&"))
    }
}
