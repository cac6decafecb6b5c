//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dev_proxy_requests_total` (counter): requests by method, status, outcome
//! - `dev_proxy_request_duration_seconds` (histogram): latency distribution
//!
//! Outcomes are `forwarded`, `unmatched` and `error`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the global recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one handled request. A no-op until a recorder is installed.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    ::metrics::counter!(
        "dev_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    ::metrics::histogram!(
        "dev_proxy_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}
