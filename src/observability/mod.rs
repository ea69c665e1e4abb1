//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! forward handler
//!     → logging.rs (tracing events, one span per request with request ID)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the span and to the upstream
//! - Upstream URIs are logged by path only; the query carries the token
//! - Metrics are off by default

pub mod logging;
pub mod metrics;
