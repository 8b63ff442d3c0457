//! LLM client wrappers.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

use control_tower_core::{
    traits::{ChatMessage, CompletionOptions, LlmClient, LlmResponse},
    Error, Result,
};

// =============================================================================
// Timeout Client
// =============================================================================

/// A wrapper client that bounds every call with a deadline.
///
/// Dropping the returned future cancels the inner call.
pub struct TimeoutLlmClient {
    inner: Arc<dyn LlmClient>,
    timeout: Duration,
    label: String,
}

impl TimeoutLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            label: "llm".to_string(),
        }
    }

    /// Label used for metrics and logs, usually the model name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    async fn bounded<F>(&self, call: F) -> Result<LlmResponse>
    where
        F: std::future::Future<Output = Result<LlmResponse>> + Send,
    {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    model = %self.label,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "LLM call timed out"
                );
                Err(Error::Timeout(format!(
                    "{} did not answer within {}ms",
                    self.label,
                    self.timeout.as_millis()
                )))
            }
        };

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!("llm_calls_total", "model" => self.label.clone(), "status" => status)
            .increment(1);
        metrics::histogram!("llm_call_duration_seconds", "model" => self.label.clone())
            .record(started.elapsed().as_secs_f64());
        if let Ok(ref response) = result {
            metrics::counter!("llm_token_usage_total", "model" => self.label.clone(), "type" => "completion")
                .increment(response.usage.completion_tokens);
        }

        result
    }
}

#[async_trait]
impl LlmClient for TimeoutLlmClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        self.bounded(self.inner.complete(prompt)).await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        self.bounded(self.inner.chat(messages)).await
    }

    async fn chat_with(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<LlmResponse> {
        self.bounded(self.inner.chat_with(messages, options)).await
    }
}

// =============================================================================
// Offline Client
// =============================================================================

/// Client used when no provider is configured; every call fails.
///
/// Lets the server start without credentials. Detection then degrades to
/// "no match" and the translator answers with the model-unavailable message.
pub struct OfflineLlmClient {
    reason: String,
}

impl OfflineLlmClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmClient for OfflineLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<LlmResponse> {
        Err(Error::model_provider(format!("offline: {}", self.reason)))
    }

    async fn chat(&self, _messages: &[ChatMessage]) -> Result<LlmResponse> {
        Err(Error::model_provider(format!("offline: {}", self.reason)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowLlm;

    #[async_trait]
    impl LlmClient for SlowLlm {
        async fn complete(&self, _prompt: &str) -> Result<LlmResponse> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(LlmResponse::text("late"))
        }

        async fn chat(&self, _messages: &[ChatMessage]) -> Result<LlmResponse> {
            self.complete("").await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_client_gives_up() {
        let client = TimeoutLlmClient::new(Arc::new(SlowLlm), Duration::from_millis(100));
        let err = client.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_timeout_client_passes_through() {
        let inner = Arc::new(control_tower_core::mocks::MockLlm::scripted(&["{}"]));
        let client = TimeoutLlmClient::new(inner.clone(), Duration::from_secs(5)).with_label("mock");
        let options = CompletionOptions::with_temperature(0.0);

        let response = client.chat_with(&[ChatMessage::user("hi")], &options).await.unwrap();

        assert_eq!(response.content, "{}");
        assert_eq!(inner.options(), vec![options]);
    }

    #[tokio::test]
    async fn test_offline_client_fails() {
        let client = OfflineLlmClient::new("no key");
        assert!(client.complete("x").await.is_err());
        assert!(client.chat_with(&[], &CompletionOptions::default()).await.is_err());
    }
}
