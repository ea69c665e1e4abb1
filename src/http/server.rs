//! HTTP server setup and the forwarding handler.
//!
//! # Responsibilities
//! - Create the Axum router for the mount point
//! - Wire up middleware (request ID, tracing)
//! - Forward every request to the upstream and relay its response
//!
//! # Request lifecycle
//! ```text
//! Received → Translating → AwaitingUpstream → Relaying → Done
//!                                 └──────────→ Failed (502)
//! ```
//!
//! No timeout layer: SSE responses stay open for as long as the wallboard
//! is connected.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{request_id::SetRequestIdLayer, trace::TraceLayer};

use crate::config::{BffConfig, Environment, ValidationError};
use crate::error::ProxyError;
use crate::http::request::{build_upstream_request, request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::{is_event_stream, relay_response};
use crate::lifecycle::startup::warn_missing_credential;
use crate::observability::metrics;
use crate::routing::{UpstreamSettings, UpstreamTarget};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<UpstreamSettings>,
    pub mount_path: Arc<str>,
    pub environment: Environment,
}

/// HTTP server for the BFF.
pub struct HttpServer {
    router: Router,
    config: BffConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given (validated) configuration.
    pub fn new(config: BffConfig) -> Result<Self, ValidationError> {
        let upstream = Arc::new(UpstreamSettings::from_config(&config.upstream)?);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(upstream.connect_timeout()));
        connector.set_nodelay(true);

        // The legacy client never follows redirects; 3xx come back as-is.
        // Requests on a pooled connection that closed early are not replayed.
        let client = Client::builder(TokioExecutor::new())
            .retry_canceled_requests(false)
            .build(connector);

        let state = AppState {
            client,
            upstream,
            mount_path: Arc::from(config.proxy.mount_path.as_str()),
            environment: config.environment,
        };

        let router = Self::build_router(&config.proxy.mount_path, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(mount_path: &str, state: AppState) -> Router {
        Router::new()
            .route(mount_path, forward_methods())
            .route(&format!("{mount_path}/"), forward_methods())
            .route(&format!("{mount_path}/{{*path}}"), forward_methods())
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span)),
            )
    }

    /// Run the server until `shutdown` resolves, then drain connections.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.proxy.mount_path,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BffConfig {
        &self.config
    }

    /// The router, for serving through something other than [`HttpServer::run`].
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// One handler for every supported verb.
fn forward_methods() -> MethodRouter<AppState> {
    get(forward)
        .head(forward)
        .post(forward)
        .put(forward)
        .patch(forward)
        .delete(forward)
        .options(forward)
}

// Path only: the query may carry a caller-supplied token.
fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "bff",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}

async fn forward(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    match forward_request(&state, request).await {
        Ok(response) => {
            metrics::record_upstream_response(method.as_str(), start);
            metrics::record_request(method.as_str(), response.status().as_u16());
            response
        }
        Err(err) => {
            record_failure(method.as_str(), &err);
            err.into_response()
        }
    }
}

// Failed requests never produced upstream headers, so they stay out of
// the latency histogram.
fn record_failure(method: &str, err: &ProxyError) {
    match err {
        ProxyError::UpstreamUnreachable(_) => {
            metrics::record_upstream_failure();
            tracing::error!(error = %err, "Upstream request failed");
        }
        _ => tracing::warn!(error = %err, "Rejected request"),
    }
    metrics::record_request(method, err.status().as_u16());
}

/// Forward one request upstream and relay the response.
pub async fn forward_request(
    state: &AppState,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let target = UpstreamTarget::resolve(&state.upstream, &state.mount_path, &parts.uri)?;
    let credential = state.upstream.credential();
    warn_missing_credential(credential.is_some(), state.environment);

    let outgoing = build_upstream_request(&parts, body, &target, credential)?;
    tracing::debug!(
        method = %parts.method,
        upstream_path = %target.log_path(),
        "Forwarding request"
    );

    let upstream = state.client.request(outgoing).await?;
    let response = relay_response(upstream);

    tracing::debug!(
        status = %response.status(),
        event_stream = is_event_stream(&response),
        "Relaying upstream response"
    );
    Ok(response)
}
