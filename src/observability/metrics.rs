//! Metrics collection and exposition.
//!
//! # Metrics
//! - `docker_proxy_requests_total` (counter): requests by method, status
//! - `docker_proxy_request_duration_seconds` (histogram): latency distribution
//! - `docker_proxy_munge_total` (counter): munger runs by munger, outcome
//! - `docker_proxy_binds_translated_total` (counter): bind hosts rewritten

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed proxied request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("docker_proxy_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("docker_proxy_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record one munger run; `outcome` is `"ok"` or an error kind.
pub fn record_munge(munger: &'static str, outcome: &'static str) {
    counter!("docker_proxy_munge_total", "munger" => munger, "outcome" => outcome).increment(1);
}
