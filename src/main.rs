//! Control Tower - supply-chain chat service
//!
//! Classifies each chat message through the sourcing, action and what-if
//! detectors, falls back to natural-language graph queries, and summarizes
//! whatever the downstream services return.

use std::sync::Arc;

use control_tower_controller::DispatcherBuilder;
use control_tower_core::{config::AppConfig, traits::ChatHandler};
use control_tower_downstream::HttpDownstream;
use control_tower_gateway::{GatewayConfig, GatewayServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    control_tower_governance::configure_tracing(config.telemetry.json_logs)?;

    tracing::info!("Starting Control Tower v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Model and downstream services
    // =========================================================================
    let llm = control_tower_model_gateway::create_client_from_config(&config.model);

    config.downstream.validate()?;
    tracing::info!(
        graph = %config.downstream.graph_endpoint,
        simulation = %config.downstream.simulation_base_url,
        agent = %config.downstream.agent_base_url,
        "Downstream services configured"
    );
    let downstream = Arc::new(HttpDownstream::new(config.downstream.clone())?);

    // =========================================================================
    // Chat pipeline
    // =========================================================================
    let dispatcher = DispatcherBuilder::new()
        .with_config(&config)
        .with_llm(llm)
        .with_downstream(downstream)
        .build()?;
    let handler: Arc<dyn ChatHandler> = Arc::new(dispatcher);

    // =========================================================================
    // Start the server
    // =========================================================================
    let mut server = GatewayServer::new(GatewayConfig::from(&config.server), handler);

    if config.telemetry.metrics_enabled {
        let metrics_handle = control_tower_governance::setup_metrics_recorder()?;
        server = server.with_metrics(metrics_handle);
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Endpoints: GET /health, POST /chat, GET /metrics"
    );

    server.run().await?;

    Ok(())
}
