//! Downstream backend traits.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Backend family reachable over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Graph query execution; the path is ignored, the endpoint is fixed.
    Graph,
    /// What-if simulation service.
    Simulation,
    /// Sourcing and action agent service.
    Agent,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Graph => "graph",
            Backend::Simulation => "simulation",
            Backend::Agent => "agent",
        }
    }
}

/// JSON-over-HTTP client for the backends.
///
/// Implementations report non-2xx answers as `Error::DownstreamStatus`,
/// transport failures as `Error::DownstreamNetwork` or `Error::Timeout`, and
/// unparseable bodies as `Error::DownstreamDecode`.
#[async_trait]
pub trait DownstreamClient: Send + Sync {
    /// POST `body` to `path` on `backend` and decode the JSON response.
    async fn post_json(&self, backend: Backend, path: &str, body: &Value) -> Result<Value>;
}
