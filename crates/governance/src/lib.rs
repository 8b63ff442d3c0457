//! Observability for the control tower.
//!
//! This crate provides:
//! - Tracing subscriber setup (env filter, plain or JSON logs, OTLP export)
//! - Prometheus recorder and the metric catalogue

pub mod metrics;
pub mod tracing_layer;

pub use metrics::{describe_metrics, setup_metrics_recorder, track_request};
pub use tracing_layer::{configure_tracing, default_filter, SERVICE_NAME};
