//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tenant_router_requests_total` (counter): requests by product, outcome
//! - `tenant_router_request_duration_seconds` (histogram): latency by product
//! - `tenant_router_dispatch_errors_total` (counter): routing failures by reason
//! - `tenant_router_reloads_total` (counter): table reloads by result
//!
//! # Design Decisions
//! - Recording is a no-op until [`init_metrics`] installs the exporter
//! - Histogram buckets tuned for typical GraphQL latencies

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

const DURATION_BUCKETS: [f64; 12] = [
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Install the Prometheus exporter with its own HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &DURATION_BUCKETS,
        )?
        .install()?;

    describe_counter!(
        "tenant_router_requests_total",
        "Total requests by product and outcome"
    );
    describe_histogram!(
        "tenant_router_request_duration_seconds",
        "Request duration in seconds by product"
    );
    describe_counter!(
        "tenant_router_dispatch_errors_total",
        "Requests that could not be routed or dispatched, by reason"
    );
    describe_counter!(
        "tenant_router_reloads_total",
        "Routing table reloads by result"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

fn outcome(status: StatusCode) -> &'static str {
    if status.is_success() {
        "success"
    } else if status.is_client_error() {
        "client_error"
    } else if status.is_server_error() {
        "server_error"
    } else {
        "other"
    }
}

/// Record one finished request.
pub fn record_request(product: &str, status: StatusCode, start: Instant) {
    counter!(
        "tenant_router_requests_total",
        "product" => product.to_string(),
        "outcome" => outcome(status)
    )
    .increment(1);
    histogram!(
        "tenant_router_request_duration_seconds",
        "product" => product.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_dispatch_error(reason: &'static str) {
    counter!("tenant_router_dispatch_errors_total", "reason" => reason).increment(1);
}

pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "rejected" };
    counter!("tenant_router_reloads_total", "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome(StatusCode::OK), "success");
        assert_eq!(outcome(StatusCode::BAD_REQUEST), "client_error");
        assert_eq!(outcome(StatusCode::BAD_GATEWAY), "server_error");
        assert_eq!(outcome(StatusCode::MOVED_PERMANENTLY), "other");
    }
}
