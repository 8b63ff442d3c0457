//! Distributed tracing configuration.

use control_tower_core::{Error, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// `service.name` reported to the OTLP collector.
pub const SERVICE_NAME: &str = "control-tower";

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_filter() -> &'static str {
    "info,control_tower=debug"
}

/// Configure stdout logging and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set,
/// OpenTelemetry export.
///
/// `json_logs` switches stdout to one JSON object per event.
pub fn configure_tracing(json_logs: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter().into()),
    );

    let json_layer = json_logs.then(|| tracing_subscriber::fmt::layer().json());
    let plain_layer = (!json_logs).then(|| tracing_subscriber::fmt::layer());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(plain_layer);

    if let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        let provider = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint.clone()),
            )
            .with_trace_config(
                sdktrace::Config::default()
                    .with_resource(Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)])),
            )
            .install_batch(runtime::Tokio)
            .map_err(|e| Error::internal(format!("Failed to install OTLP pipeline: {}", e)))?;

        let tracer = provider.tracer(SERVICE_NAME);
        opentelemetry::global::set_tracer_provider(provider);

        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
        registry.with(otel_layer).try_init().map_err(|e| {
            Error::internal(format!("Failed to install tracing subscriber: {}", e))
        })?;

        tracing::info!(endpoint = %endpoint, "OpenTelemetry tracing enabled");
    } else {
        registry.try_init().map_err(|e| {
            Error::internal(format!("Failed to install tracing subscriber: {}", e))
        })?;
    }

    Ok(())
}
