//! Model gateway for the control tower.
//!
//! This crate provides:
//! - Rig LLM client adapter
//! - Deadline-bounded client wrapper
//! - Offline fallback when no provider credentials exist

pub mod providers;
pub mod rig_client;

pub use providers::{OfflineLlmClient, TimeoutLlmClient};
pub use rig_client::{create_default_client, RigConfig, RigLlmClient, RigProvider};

use std::sync::Arc;

use control_tower_core::{config::ModelConfig, traits::LlmClient};

/// Create an LLM client from configuration.
///
/// The configured provider must have its API key in the environment;
/// otherwise the client falls back to whichever provider has a key, and then
/// to an offline client. The result is always deadline-bounded.
pub fn create_client_from_config(config: &ModelConfig) -> Arc<dyn LlmClient> {
    let inner: Arc<dyn LlmClient> = match RigProvider::parse(&config.provider) {
        Ok(provider) if std::env::var(provider.api_key_var()).is_ok() => {
            let rig_cfg = match provider {
                RigProvider::OpenAI => RigConfig::openai(&config.model),
                RigProvider::Anthropic => RigConfig::anthropic(&config.model),
            };
            tracing::info!(provider = ?provider, model = %config.model, "LLM client configured");
            Arc::new(RigLlmClient::new(rig_cfg.with_temperature(config.classify_temperature)))
        }
        Ok(provider) => {
            tracing::warn!(
                provider = ?provider,
                "API key for configured provider missing. Trying environment defaults."
            );
            default_or_offline()
        }
        Err(e) => {
            tracing::warn!("{}. Trying environment defaults.", e);
            default_or_offline()
        }
    };

    Arc::new(TimeoutLlmClient::new(inner, config.timeout()).with_label(config.model.clone()))
}

fn default_or_offline() -> Arc<dyn LlmClient> {
    match create_default_client() {
        Ok(client) => {
            tracing::info!(model = %client.model(), "LLM client configured from environment");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!("Failed to create LLM client: {}. Running offline.", e);
            Arc::new(OfflineLlmClient::new(e.to_string()))
        }
    }
}
