//! Mock implementations of core traits for testing.
//!
//! These are deterministic collaborators: the scripted LLM returns canned
//! completions in order, the downstream mock answers per backend and path.
//! Both record what they were called with.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::{
    traits::{Backend, ChatMessage, CompletionOptions, DownstreamClient, LlmClient, LlmResponse},
    Error, Result,
};

// =============================================================================
// Mock LLM Client
// =============================================================================

/// Scripted mock LLM that returns predefined responses in order.
///
/// Once the script runs out, every further call returns an empty completion.
#[derive(Default)]
pub struct MockLlm {
    responses: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    options: Mutex<Vec<CompletionOptions>>,
}

impl MockLlm {
    /// Create a new mock LLM with a queue of responses.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            ..Default::default()
        }
    }

    /// Convenience over `new` for string literals.
    pub fn scripted(responses: &[&str]) -> Self {
        Self::new(responses.iter().map(|s| s.to_string()).collect())
    }

    /// Queue a provider failure as the next response.
    pub fn then_fail(self, msg: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::model_provider(msg)));
        self
    }

    /// Queue a successful response.
    pub fn then(self, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.to_string()));
        self
    }

    /// Get the number of calls made to this mock.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Message lists received, in call order.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    /// Options received, in call order.
    pub fn options(&self) -> Vec<CompletionOptions> {
        self.options.lock().unwrap().clone()
    }

    fn next(&self) -> Result<LlmResponse> {
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(LlmResponse::text(content)),
            Some(Err(e)) => Err(e),
            None => Ok(LlmResponse::text("")),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        self.chat(&[ChatMessage::user(prompt)]).await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        self.chat_with(messages, &CompletionOptions::default()).await
    }

    async fn chat_with(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<LlmResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.options.lock().unwrap().push(options.clone());
        self.next()
    }
}

// =============================================================================
// Mock Downstream Client
// =============================================================================

/// Canned reply of the downstream mock.
#[derive(Debug, Clone)]
pub enum MockReply {
    Json(Value),
    Status(u16, String),
    Network(String),
}

/// A request seen by the downstream mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub backend: Backend,
    pub path: String,
    pub body: Value,
}

/// Downstream mock answering per `(backend, path)`.
///
/// Graph requests are keyed by backend only. Unconfigured routes answer with
/// HTTP 404.
#[derive(Default)]
pub struct MockDownstream {
    replies: Mutex<HashMap<(Backend, String), MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockDownstream {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(backend: Backend, path: &str) -> (Backend, String) {
        match backend {
            Backend::Graph => (backend, String::new()),
            _ => (backend, path.to_string()),
        }
    }

    /// Answer `path` on `backend` with `reply`.
    pub fn on(self, backend: Backend, path: &str, reply: MockReply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(Self::key(backend, path), reply);
        self
    }

    /// Answer graph queries with `{ "data": data }`.
    pub fn on_graph(self, data: Value) -> Self {
        self.on(
            Backend::Graph,
            "",
            MockReply::Json(serde_json::json!({ "data": data })),
        )
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent to one backend.
    pub fn requests_to(&self, backend: Backend) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.backend == backend)
            .collect()
    }
}

#[async_trait]
impl DownstreamClient for MockDownstream {
    async fn post_json(&self, backend: Backend, path: &str, body: &Value) -> Result<Value> {
        self.requests.lock().unwrap().push(RecordedRequest {
            backend,
            path: path.to_string(),
            body: body.clone(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&Self::key(backend, path))
            .cloned();

        match reply {
            Some(MockReply::Json(value)) => Ok(value),
            Some(MockReply::Status(status, body)) => Err(Error::DownstreamStatus { status, body }),
            Some(MockReply::Network(msg)) => Err(Error::downstream_network(msg)),
            None => Err(Error::DownstreamStatus {
                status: 404,
                body: format!("no mock route for {} {}", backend.as_str(), path),
            }),
        }
    }
}
