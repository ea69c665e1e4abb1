//! Errors raised while forwarding a request.
//!
//! Upstream error statuses (4xx/5xx) are not errors here; they are relayed
//! to the caller untouched. Only failures of the proxy itself end up in
//! [`ProxyError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failure of a single forwarding attempt.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream could not be reached, or the connection failed before
    /// response headers arrived.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[from] hyper_util::client::legacy::Error),

    /// The caller's path or query cannot be turned into an upstream URI.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    /// The outgoing request could not be assembled.
    #[error("failed to build upstream request: {0}")]
    RequestBuild(#[from] axum::http::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::RequestBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::UpstreamUnreachable(_) => "upstream_unreachable",
            ProxyError::InvalidTarget(_) => "invalid_target",
            ProxyError::RequestBuild(_) => "request_build_failed",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
