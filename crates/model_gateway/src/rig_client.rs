//! Rig LLM client adapter.
//!
//! Wraps Rig's Agent for integration with our LlmClient trait.

use async_trait::async_trait;

use control_tower_core::{
    traits::{ChatMessage, CompletionOptions, LlmClient, LlmResponse, LlmUsage},
    Error, Result,
};

// Import required Rig traits
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;

/// Provider type for Rig clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigProvider {
    OpenAI,
    Anthropic,
}

impl RigProvider {
    /// Parse a provider name from configuration.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "openai" => Ok(RigProvider::OpenAI),
            "anthropic" => Ok(RigProvider::Anthropic),
            other => Err(Error::config(format!("unsupported model provider: {}", other))),
        }
    }

    /// Environment variable the Rig client reads its key from.
    pub fn api_key_var(self) -> &'static str {
        match self {
            RigProvider::OpenAI => "OPENAI_API_KEY",
            RigProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Configuration for Rig client.
#[derive(Debug, Clone)]
pub struct RigConfig {
    /// Provider to use.
    pub provider: RigProvider,
    /// Model name.
    pub model: String,
    /// Default temperature when the caller does not pass one.
    pub temperature: Option<f64>,
    /// Max tokens.
    pub max_tokens: u64,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.0),
            max_tokens: 2048,
        }
    }
}

impl RigConfig {
    /// Create config for OpenAI.
    pub fn openai(model: impl Into<String>) -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create config for Anthropic.
    pub fn anthropic(model: impl Into<String>) -> Self {
        Self {
            provider: RigProvider::Anthropic,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Rig-based LLM client.
///
/// System messages become the agent preamble; the remaining turns are
/// flattened into a single prompt.
pub struct RigLlmClient {
    config: RigConfig,
}

impl RigLlmClient {
    /// Create a new Rig client with the given configuration.
    pub fn new(config: RigConfig) -> Self {
        Self { config }
    }

    /// Create a client for OpenAI GPT-4o-mini.
    pub fn gpt4o_mini() -> Self {
        Self::new(RigConfig::openai("gpt-4o-mini"))
    }

    /// Create a client for Claude Haiku.
    pub fn claude_haiku() -> Self {
        Self::new(RigConfig::anthropic("claude-3-haiku-20240307"))
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Split messages into (preamble, prompt).
    fn build_prompt(&self, messages: &[ChatMessage]) -> (String, String) {
        let mut preamble = String::new();
        let mut turns: Vec<&ChatMessage> = Vec::new();

        for msg in messages {
            if msg.role == "system" {
                if !preamble.is_empty() {
                    preamble.push_str("\n\n");
                }
                preamble.push_str(&msg.content);
            } else {
                turns.push(msg);
            }
        }

        // A lone user turn goes through verbatim.
        if let [only] = turns.as_slice() {
            if only.role == "user" {
                return (preamble, only.content.clone());
            }
        }

        let mut prompt = String::new();
        for msg in turns {
            match msg.role.as_str() {
                "user" => prompt.push_str(&format!("User: {}\n\n", msg.content)),
                "assistant" => prompt.push_str(&format!("Assistant: {}\n\n", msg.content)),
                _ => prompt.push_str(&format!("{}: {}\n\n", msg.role, msg.content)),
            }
        }

        (preamble, prompt.trim_end().to_string())
    }

    fn response(prompt: &str, preamble: &str, content: String) -> LlmResponse {
        let prompt_tokens = ((prompt.len() + preamble.len()) / 4) as u64;
        let completion_tokens = (content.len() / 4) as u64;
        LlmResponse {
            content,
            finish_reason: "stop".to_string(),
            usage: LlmUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
        }
    }

    /// Call OpenAI via Rig.
    async fn call_openai(&self, preamble: &str, prompt: &str, temperature: Option<f64>) -> Result<LlmResponse> {
        use rig::providers::openai;

        // Check env var first to avoid panic
        if std::env::var(RigProvider::OpenAI.api_key_var()).is_err() {
            return Err(Error::ModelProvider("OPENAI_API_KEY not set".to_string()));
        }

        let client = openai::Client::from_env();

        let mut agent_builder = client.agent(&self.config.model).max_tokens(self.config.max_tokens);

        if !preamble.is_empty() {
            agent_builder = agent_builder.preamble(preamble);
        }
        if let Some(t) = temperature {
            agent_builder = agent_builder.temperature(t);
        }

        let agent = agent_builder.build();

        let response: String = agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::ModelProvider(format!("OpenAI error: {}", e)))?;

        Ok(Self::response(prompt, preamble, response))
    }

    /// Call Anthropic via Rig.
    async fn call_anthropic(&self, preamble: &str, prompt: &str, temperature: Option<f64>) -> Result<LlmResponse> {
        use rig::providers::anthropic;

        // Check env var first to avoid panic
        if std::env::var(RigProvider::Anthropic.api_key_var()).is_err() {
            return Err(Error::ModelProvider("ANTHROPIC_API_KEY not set".to_string()));
        }

        let client = anthropic::Client::from_env();

        let mut agent_builder = client.agent(&self.config.model).max_tokens(self.config.max_tokens);

        if !preamble.is_empty() {
            agent_builder = agent_builder.preamble(preamble);
        }
        if let Some(t) = temperature {
            agent_builder = agent_builder.temperature(t);
        }

        let agent = agent_builder.build();

        let response: String = agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::ModelProvider(format!("Anthropic error: {}", e)))?;

        Ok(Self::response(prompt, preamble, response))
    }
}

#[async_trait]
impl LlmClient for RigLlmClient {
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
        let (preamble, prompt) = self.build_prompt(messages);
        let temperature = options.temperature.or(self.config.temperature);

        tracing::debug!(
            provider = ?self.config.provider,
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Calling LLM"
        );

        match self.config.provider {
            RigProvider::OpenAI => self.call_openai(&preamble, &prompt, temperature).await,
            RigProvider::Anthropic => self.call_anthropic(&preamble, &prompt, temperature).await,
        }
    }
}

/// Create a default LLM client based on available API keys.
pub fn create_default_client() -> Result<RigLlmClient> {
    if std::env::var("OPENAI_API_KEY").is_ok() {
        Ok(RigLlmClient::gpt4o_mini())
    } else if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        Ok(RigLlmClient::claude_haiku())
    } else {
        Err(Error::ModelProvider(
            "No API key found. Set OPENAI_API_KEY or ANTHROPIC_API_KEY".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RigConfig::openai("gpt-4o").with_temperature(0.3);

        assert_eq!(config.provider, RigProvider::OpenAI);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, Some(0.3));
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(RigProvider::parse("OpenAI").unwrap(), RigProvider::OpenAI);
        assert_eq!(RigProvider::parse("anthropic").unwrap(), RigProvider::Anthropic);
        assert!(RigProvider::parse("llama").is_err());
    }

    #[test]
    fn test_build_prompt_single_turn() {
        let client = RigLlmClient::gpt4o_mini();
        let (preamble, prompt) = client.build_prompt(&[
            ChatMessage::system("You translate questions"),
            ChatMessage::user("Show all orders"),
        ]);

        assert_eq!(preamble, "You translate questions");
        assert_eq!(prompt, "Show all orders");
    }

    #[test]
    fn test_build_prompt_with_history() {
        let client = RigLlmClient::gpt4o_mini();
        let (preamble, prompt) = client.build_prompt(&[
            ChatMessage::system("sys"),
            ChatMessage::user("which suppliers have risks"),
            ChatMessage::assistant("S3"),
            ChatMessage::user("any fix?"),
        ]);

        assert_eq!(preamble, "sys");
        assert!(prompt.starts_with("User: which suppliers have risks"));
        assert!(prompt.contains("Assistant: S3"));
        assert!(prompt.ends_with("User: any fix?"));
    }
}
