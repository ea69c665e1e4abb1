//! Startup orchestration.
//!
//! Config is already loaded and validated by the time we get here. Order:
//! metrics, credential check, bind, serve. A shutdown signal starts a drain
//! bounded by `lifecycle.shutdown_grace_secs`, since open SSE streams would
//! otherwise keep the process alive indefinitely.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{BffConfig, Environment};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::ValidationError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Warn when no credential is configured outside production.
/// Returns whether a warning was emitted.
pub fn warn_missing_credential(configured: bool, environment: Environment) -> bool {
    if configured || environment.is_production() {
        return false;
    }
    tracing::warn!(
        "upstream.bearer_token / BACKEND_BEARER_TOKEN is not set; backend calls will likely 401"
    );
    true
}

/// Startup variant of [`warn_missing_credential`].
pub fn check_credential(config: &BffConfig) {
    warn_missing_credential(config.upstream.bearer_token.is_some(), config.environment);
}

/// Run the BFF until a shutdown signal arrives.
pub async fn run(config: BffConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    check_credential(&config);

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let grace = Duration::from_secs(config.lifecycle.shutdown_grace_secs);
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        signal_shutdown.trigger();
    });

    let drain_deadline = {
        let signalled = shutdown.signalled();
        async move {
            signalled.await;
            tokio::time::sleep(grace).await;
        }
    };

    tokio::select! {
        result = server.run(listener, shutdown.signalled()) => result?,
        _ = drain_deadline => {
            tracing::warn!(grace_secs = grace.as_secs(), "Open streams did not drain in time, exiting");
        }
    }

    Ok(())
}
