//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the caller did not send one
//! - Translate the caller's request into the upstream request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, and forwarded
//!   upstream like any other header
//! - The caller body is moved into the upstream request, never buffered

use axum::body::Body;
use axum::http::{request::Parts, HeaderName, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::ProxyError;
use crate::routing::UpstreamTarget;
use crate::security::{filter_request_headers, inject_credential, BearerCredential};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Request ID of an incoming request, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// GET and HEAD never carry a body upstream.
pub fn forwards_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Build the outgoing request for `target` from the caller's parts and body.
pub fn build_upstream_request(
    parts: &Parts,
    body: Body,
    target: &UpstreamTarget,
    credential: Option<&BearerCredential>,
) -> Result<Request<Body>, ProxyError> {
    let mut headers = filter_request_headers(&parts.headers);
    inject_credential(&mut headers, credential);

    let body = if forwards_body(&parts.method) {
        body
    } else {
        Body::empty()
    };

    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(target.uri()?)
        .body(body)?;
    *request.headers_mut() = headers;

    Ok(request)
}
