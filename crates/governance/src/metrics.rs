//! Metrics implementation using Prometheus.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use control_tower_core::{Error, Result};

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::internal(format!("Failed to install Prometheus recorder: {}", e)))?;

    describe_metrics();
    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// Register descriptions for every metric the service emits.
pub fn describe_metrics() {
    metrics::describe_counter!("http_requests_total", "HTTP requests by method, path and status");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
    metrics::describe_counter!(
        "chat_dispatch_total",
        "Chat requests by matched intent family and kind"
    );
    metrics::describe_counter!(
        "downstream_failures_total",
        "Failed backend calls by backend and failure kind"
    );
    metrics::describe_histogram!(
        "downstream_duration_seconds",
        metrics::Unit::Seconds,
        "Successful backend call latency"
    );
    metrics::describe_counter!("llm_calls_total", "Language-model calls by model and outcome");
    metrics::describe_histogram!(
        "llm_call_duration_seconds",
        metrics::Unit::Seconds,
        "Language-model call latency"
    );
    metrics::describe_counter!("llm_token_usage_total", "Estimated token usage by model and type");
}

/// Helper to track HTTP request metrics (latency, count).
pub fn track_request(method: &str, path: &str, status: u16, latency_sec: f64) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(latency_sec);
}
