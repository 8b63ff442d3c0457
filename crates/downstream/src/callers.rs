//! One caller per backend family.

use serde_json::{json, Value};
use std::sync::Arc;

use control_tower_core::{
    traits::{Backend, DownstreamClient},
    types::{DispatchOutcome, WhatIfKind},
    Error, Lang,
};

/// Successful backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    /// Diagnostic trace of what was executed.
    pub query: String,
    pub data: Value,
}

/// `Err` carries the terminal, error-shaped outcome for the request.
pub type CallResult = std::result::Result<Executed, DispatchOutcome>;

/// Convert a downstream error into a localized outcome keeping `query`.
pub fn failure_outcome(err: &Error, lang: Lang, query: &str) -> DispatchOutcome {
    let m = lang.messages();
    let answer = match err {
        Error::DownstreamStatus { status, body } => {
            format!("{} (HTTP {}): {}", m.http_error, status, body)
        }
        Error::DownstreamNetwork(msg) => format!("{}: {}", m.exec_failed, msg),
        other => format!("{}: {}", m.exec_failed, other),
    };
    DispatchOutcome::failure(answer, query)
}

fn trace(path: &str, body: &Value) -> String {
    format!("POST {} {}", path, body)
}

async fn post_traced(
    client: &dyn DownstreamClient,
    backend: Backend,
    path: &str,
    body: &Value,
    lang: Lang,
) -> CallResult {
    let query = trace(path, body);
    match client.post_json(backend, path, body).await {
        Ok(data) => Ok(Executed { query, data }),
        Err(e) => {
            tracing::warn!(backend = backend.as_str(), path, error = %e, "Downstream call failed");
            Err(failure_outcome(&e, lang, &query))
        }
    }
}

// =============================================================================
// Graph Query
// =============================================================================

/// Executes graph queries.
#[derive(Clone)]
pub struct GraphQueryCaller {
    client: Arc<dyn DownstreamClient>,
}

impl GraphQueryCaller {
    pub fn new(client: Arc<dyn DownstreamClient>) -> Self {
        Self { client }
    }

    /// Execute `query`; a response carrying `errors` is a failure.
    pub async fn execute(&self, query: &str, variables: &Value, lang: Lang) -> CallResult {
        let body = json!({ "query": query, "variables": variables });

        let response = match self.client.post_json(Backend::Graph, "", &body).await {
            Ok(response) => response,
            // Validation failures come back as 4xx with a GraphQL `errors` body.
            Err(Error::DownstreamStatus { status, body })
                if errors_in_body(&body).is_some() =>
            {
                tracing::debug!(status, "Graph endpoint rejected query");
                serde_json::from_str(&body).unwrap_or(Value::Null)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Graph query failed");
                return Err(failure_outcome(&e, lang, query));
            }
        };

        if let Some(messages) = graph_errors(&response) {
            tracing::warn!(errors = %messages, "Graph query returned errors");
            return Err(DispatchOutcome::failure(
                format!("{}: {}", lang.messages().query_error, messages),
                query,
            ));
        }

        Ok(Executed {
            query: query.to_string(),
            data: response.get("data").cloned().unwrap_or(Value::Null),
        })
    }

    /// Best-effort query for slot defaulting. Any failure is `None`.
    pub async fn lookup(&self, query: &str) -> Option<Value> {
        let body = json!({ "query": query, "variables": {} });
        match self.client.post_json(Backend::Graph, "", &body).await {
            Ok(response) if graph_errors(&response).is_none() => response.get("data").cloned(),
            Ok(_) => {
                tracing::debug!("Lookup query returned errors");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Lookup query failed");
                None
            }
        }
    }
}

/// Joined messages of a non-empty `errors` array.
fn errors_in_body(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| graph_errors(&v))
}

fn graph_errors(response: &Value) -> Option<String> {
    let errors = response.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .collect::<Vec<_>>()
            .join("; "),
    )
}

// =============================================================================
// Simulation
// =============================================================================

/// Runs what-if scenarios on the simulation backend.
#[derive(Clone)]
pub struct SimulationCaller {
    client: Arc<dyn DownstreamClient>,
}

impl SimulationCaller {
    pub fn new(client: Arc<dyn DownstreamClient>) -> Self {
        Self { client }
    }

    pub async fn simulate(&self, kind: WhatIfKind, body: &Value, lang: Lang) -> CallResult {
        post_traced(
            self.client.as_ref(),
            Backend::Simulation,
            kind.simulation_path(),
            body,
            lang,
        )
        .await
    }
}

// =============================================================================
// Agent
// =============================================================================

/// Calls sourcing analytics and action execution on the agent backend.
#[derive(Clone)]
pub struct AgentCaller {
    client: Arc<dyn DownstreamClient>,
}

impl AgentCaller {
    pub const RFQ_CANDIDATES: &'static str = "/agent/rfq-candidates";
    pub const SINGLE_SOURCE_PARTS: &'static str = "/agent/single-source-parts";
    pub const CONSOLIDATE_PO: &'static str = "/agent/consolidate-po";
    pub const EXECUTE: &'static str = "/agent/execute";

    pub fn new(client: Arc<dyn DownstreamClient>) -> Self {
        Self { client }
    }

    pub async fn call(&self, path: &str, body: &Value, lang: Lang) -> CallResult {
        post_traced(self.client.as_ref(), Backend::Agent, path, body, lang).await
    }
}
