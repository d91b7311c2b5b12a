//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wirepool_connections_total` (counter): accepted connections by admission outcome
//! - `wirepool_requests_total` (counter): completed requests by method, status
//! - `wirepool_request_duration_seconds` (histogram): claim-to-close latency
//! - `wirepool_connection_errors_total` (counter): worker-boundary failures by kind
//! - `wirepool_queue_depth` (gauge): connections waiting for a worker

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

/// Record the acceptor's decision for one connection.
pub fn record_admission(admitted: bool) {
    let outcome = if admitted { "admitted" } else { "rejected" };
    ::metrics::counter!("wirepool_connections_total", "outcome" => outcome).increment(1);
}

pub fn record_queue_depth(depth: usize) {
    ::metrics::gauge!("wirepool_queue_depth").set(depth as f64);
}

/// Record a completed request/response cycle.
pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "wirepool_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("wirepool_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a failure caught at the worker boundary.
pub fn record_connection_error(kind: &'static str) {
    ::metrics::counter!("wirepool_connection_errors_total", "kind" => kind).increment(1);
}
