//! Metrics collection and exposition.
//!
//! # Metrics
//! - `client_requests_total` (counter): completed calls by operation, status
//! - `client_request_duration_seconds` (histogram): latency by operation
//! - `client_request_errors_total` (counter): failures by operation, kind
//!   (`request`, `status`, `network`)

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus recorder with a scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one completed call. `status` is `None` when no response arrived.
pub fn record_request(operation: &str, status: Option<u16>, duration_ms: u64) {
    let status = status.map_or_else(|| "none".to_string(), |s| s.to_string());
    ::metrics::counter!(
        "client_requests_total",
        "operation" => operation.to_string(),
        "status" => status
    )
    .increment(1);
    ::metrics::histogram!(
        "client_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_ms as f64 / 1000.0);
}

pub fn record_request_error(operation: &str, kind: &'static str) {
    ::metrics::counter!(
        "client_request_errors_total",
        "operation" => operation.to_string(),
        "kind" => kind
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("GET_entities_", Some(200), 12);
        record_request("GET_entities_", None, 0);
        record_request_error("GET_entities_", "network");
    }
}
