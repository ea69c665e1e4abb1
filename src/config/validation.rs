//! Configuration validation.
//!
//! Semantic checks only; serde handles the syntax. Every rule is evaluated
//! so an operator sees all problems at once, not just the first.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::BffConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url '{url}' is not a valid URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("upstream.base_url scheme must be http, got '{0}'")]
    UnsupportedScheme(String),

    #[error("upstream.base_url must not carry a query or fragment")]
    BaseUrlHasQuery,

    #[error("upstream.bearer_token is not a valid header value")]
    InvalidBearerToken,

    #[error("upstream.connect_timeout_secs must be greater than zero")]
    ZeroConnectTimeout,

    #[error("proxy.mount_path '{0}' must start with '/', not end with '/', and not be the root")]
    InvalidMountPath(String),

    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &BffConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.base_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::BaseUrlHasQuery);
            }
        }
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if let Some(token) = &config.upstream.bearer_token {
        if HeaderValue::from_str(&format!("Bearer {}", token)).is_err() {
            errors.push(ValidationError::InvalidBearerToken);
        }
    }

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    let mount = &config.proxy.mount_path;
    if !mount.starts_with('/') || mount.ends_with('/') || mount.contains('{') {
        errors.push(ValidationError::InvalidMountPath(mount.clone()));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
