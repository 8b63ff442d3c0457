//! Language-model client traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// LLM client interface.
///
/// Implementations return whatever text the model produced. Callers must not
/// assume it is well-formed JSON.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion.
    async fn complete(&self, prompt: &str) -> Result<LlmResponse>;

    /// Generate a chat completion.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse>;

    /// Generate a chat completion with per-call options.
    ///
    /// Clients that cannot honor the options fall back to `chat`.
    async fn chat_with(
        &self,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<LlmResponse> {
        self.chat(messages).await
    }
}

/// Chat message for LLM interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role (system, user, assistant).
    pub role: String,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Per-call completion options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    /// Sampling temperature.
    pub temperature: Option<f64>,
}

impl CompletionOptions {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
        }
    }
}

/// Response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated content.
    pub content: String,
    /// Finish reason.
    pub finish_reason: String,
    /// Token usage.
    pub usage: LlmUsage,
}

impl LlmResponse {
    /// Response carrying only text, with estimated usage.
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            usage: LlmUsage {
                prompt_tokens: 0,
                completion_tokens: (content.len() / 4) as u64,
                total_tokens: (content.len() / 4) as u64,
            },
            content,
            finish_reason: "stop".to_string(),
        }
    }
}

/// Token usage from LLM call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Prompt tokens.
    pub prompt_tokens: u64,
    /// Completion tokens.
    pub completion_tokens: u64,
    /// Total tokens.
    pub total_tokens: u64,
}
