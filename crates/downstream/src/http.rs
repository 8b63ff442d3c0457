//! reqwest implementation of `DownstreamClient`.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;

use control_tower_core::{
    config::DownstreamConfig,
    traits::{Backend, DownstreamClient},
    Error, Result,
};

/// JSON-over-HTTP client for the graph, simulation and agent backends.
pub struct HttpDownstream {
    client: reqwest::Client,
    config: DownstreamConfig,
}

impl HttpDownstream {
    /// Build a client; every request is bounded by `config.timeout_ms`.
    pub fn new(config: DownstreamConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Resolve the full URL for `path` on `backend`.
    pub fn url(&self, backend: Backend, path: &str) -> String {
        match backend {
            Backend::Graph => self.config.graph_endpoint.clone(),
            Backend::Simulation => join(&self.config.simulation_base_url, path),
            Backend::Agent => join(&self.config.agent_base_url, path),
        }
    }
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn record_failure(backend: Backend, kind: &'static str) {
    metrics::counter!(
        "downstream_failures_total",
        "backend" => backend.as_str(),
        "kind" => kind
    )
    .increment(1);
}

#[async_trait]
impl DownstreamClient for HttpDownstream {
    async fn post_json(&self, backend: Backend, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(backend, path);
        let started = Instant::now();

        tracing::debug!(backend = backend.as_str(), url = %url, "Calling downstream");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    record_failure(backend, "timeout");
                    Error::Timeout(format!("{} did not answer: {}", url, e))
                } else {
                    record_failure(backend, "network");
                    Error::downstream_network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                backend = backend.as_str(),
                url = %url,
                status = status.as_u16(),
                "Downstream returned error status"
            );
            record_failure(backend, "status");
            return Err(Error::DownstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let value = response.json::<Value>().await.map_err(|e| {
            record_failure(backend, "decode");
            Error::DownstreamDecode(e.to_string())
        })?;

        metrics::histogram!("downstream_duration_seconds", "backend" => backend.as_str())
            .record(started.elapsed().as_secs_f64());

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolution() {
        let client = HttpDownstream::new(DownstreamConfig {
            graph_endpoint: "http://localhost:4000/graphql".into(),
            simulation_base_url: "http://twin-sim:7100/".into(),
            agent_base_url: "http://agent-api:7200".into(),
            timeout_ms: 1000,
        })
        .unwrap();

        assert_eq!(client.url(Backend::Graph, "ignored"), "http://localhost:4000/graphql");
        assert_eq!(
            client.url(Backend::Simulation, "/simulate/change-lane"),
            "http://twin-sim:7100/simulate/change-lane"
        );
        assert_eq!(
            client.url(Backend::Agent, "/agent/execute"),
            "http://agent-api:7200/agent/execute"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = HttpDownstream::new(DownstreamConfig {
            graph_endpoint: "not a url".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
