//! Metrics collection and exposition.
//!
//! # Metrics
//! - `booking_requests_total` (counter): completed requests by method, status
//! - `booking_request_duration_seconds` (histogram): latency distribution
//! - `booking_request_log_size` (gauge): entries currently retained
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    counter!(
        "booking_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("booking_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_log_size(len: usize) {
    gauge!("booking_request_log_size").set(len as f64);
}
