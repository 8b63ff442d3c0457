use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
///
/// Every section has defaults, so a missing config file still yields a
/// runnable setup pointing at local services.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub downstream: DownstreamConfig,
    pub pipeline: PipelineConfig,
    pub defaults: SlotDefaults,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub enable_tracing: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 4000,
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// `openai` or `anthropic`.
    pub provider: String,
    pub model: String,
    pub classify_temperature: f64,
    pub summary_temperature: f64,
    pub timeout_ms: u64,
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            classify_temperature: 0.0,
            summary_temperature: 0.3,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Full URL of the graph query endpoint.
    pub graph_endpoint: String,
    pub simulation_base_url: String,
    pub agent_base_url: String,
    pub timeout_ms: u64,
}

impl DownstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check that every endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, raw) in [
            ("graph_endpoint", &self.graph_endpoint),
            ("simulation_base_url", &self.simulation_base_url),
            ("agent_base_url", &self.agent_base_url),
        ] {
            let parsed = url::Url::parse(raw)
                .map_err(|e| crate::Error::config(format!("downstream.{}: {}", name, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(crate::Error::config(format!(
                    "downstream.{}: unsupported scheme {}",
                    name,
                    parsed.scheme()
                )));
            }
        }
        Ok(())
    }
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            graph_endpoint: "http://graphql-api:4000/graphql".into(),
            simulation_base_url: "http://twin-sim:7100".into(),
            agent_base_url: "http://agent-api:7200".into(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Replay conversation history to detectors and the translator.
    pub use_history: bool,
    /// Most recent turns replayed when `use_history` is on.
    pub max_history_turns: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_history: false,
            max_history_turns: 6,
        }
    }
}

/// Static slot fallbacks, used when neither the model nor the at-risk lookup
/// supplied a value.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SlotDefaults {
    pub order_id: String,
    pub part_id: String,
    pub supplier_id: String,
    pub to_supplier_id: String,
    pub to_factory_id: String,
    pub factory_id: String,
    pub to_lane: String,
    pub objective: String,
}

impl Default for SlotDefaults {
    fn default() -> Self {
        Self {
            order_id: "SO0001".into(),
            part_id: "P010".into(),
            supplier_id: "S1".into(),
            to_supplier_id: "S2".into(),
            to_factory_id: "F3".into(),
            factory_id: "F1".into(),
            to_lane: "Air".into(),
            objective: "delivery-first".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    pub json_logs: bool,
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("CONTROL_TOWER_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map CONTROL_TOWER__SERVER__PORT=4000 to server.port
            .add_source(Environment::with_prefix("CONTROL_TOWER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
