//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pegnetd_sync_height` (gauge): last directory block synced
//! - `pegnetd_factom_height` (gauge): latest height reported by factomd
//! - `pegnetd_sync_errors_total` (counter): failed sync attempts
//! - `pegnetd_api_requests_total` (counter): API calls by method
//!
//! # Design Decisions
//! - Exposed in Prometheus text format when `app.metricslisten` is set
//! - A failed exporter start is logged and never stops the daemon

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the global recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime, at most once per process.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record the height the node has synced to.
pub fn record_sync_height(height: u32) {
    metrics::gauge!("pegnetd_sync_height").set(f64::from(height));
}

/// Record the latest height reported by factomd.
pub fn record_factom_height(height: u32) {
    metrics::gauge!("pegnetd_factom_height").set(f64::from(height));
}

/// Count a failed sync attempt.
pub fn record_sync_error() {
    metrics::counter!("pegnetd_sync_errors_total").increment(1);
}

/// Count an API call.
pub fn record_api_request(method: &str) {
    metrics::counter!("pegnetd_api_requests_total", "method" => method.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_values_are_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_sync_height(206_500);
            record_factom_height(206_510);
            record_sync_error();
            record_api_request("get-sync-status");
        });

        let rendered = handle.render();
        assert!(rendered.contains("pegnetd_sync_height 206500"));
        assert!(rendered.contains("pegnetd_factom_height 206510"));
        assert!(rendered.contains("pegnetd_sync_errors_total 1"));
        assert!(rendered.contains("pegnetd_api_requests_total{method=\"get-sync-status\"} 1"));
    }
}
