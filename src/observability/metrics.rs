//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bff_requests_total` (counter): forwarded requests by method, status
//! - `bff_upstream_response_seconds` (histogram): time until upstream
//!   response headers; streams are not timed end-to-end
//! - `bff_upstream_failures_total` (counter): requests that never got a
//!   response from the upstream
//!
//! Recording is a no-op until [`init_metrics`] installs a recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a finished request, whether relayed or answered by the proxy.
pub fn record_request(method: &str, status: u16) {
    metrics::counter!(
        "bff_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Time until the upstream's response headers arrived.
pub fn record_upstream_response(method: &str, start: Instant) {
    metrics::histogram!("bff_upstream_response_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record an upstream connection failure.
pub fn record_upstream_failure() {
    metrics::counter!("bff_upstream_failures_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_counter_does_not_touch_latency_histogram() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || record_request("GET", 400));

        let rendered = handle.render();
        assert!(rendered.contains("bff_requests_total"), "got: {rendered}");
        assert!(!rendered.contains("bff_upstream_response_seconds"), "got: {rendered}");
    }
}
