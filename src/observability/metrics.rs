//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define edge router metrics (requests, latency, origin errors)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by method, status, brand
//! - `edge_request_duration_seconds` (histogram): latency by brand
//! - `edge_origin_errors_total` (counter): failed origin fetches by brand
//! - `edge_config_reloads_total` (counter): applied config reloads

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
///
/// Must run inside a tokio runtime. Failure to install is logged, not
/// fatal; the router serves traffic without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, brand: &str, start: Instant) {
    counter!(
        "edge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "brand" => brand.to_string()
    )
    .increment(1);
    histogram!("edge_request_duration_seconds", "brand" => brand.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record an origin fetch that produced no usable response.
pub fn record_origin_error(brand: &str) {
    counter!("edge_origin_errors_total", "brand" => brand.to_string()).increment(1);
}

/// Record an applied configuration reload.
pub fn record_reload() {
    counter!("edge_config_reloads_total").increment(1);
}
