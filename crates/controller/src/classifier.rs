//! Classifier collaborator wrapper and model-output parsing.
//!
//! Model output is never trusted to be JSON. Every structured read goes
//! through [`parse_reply`], which returns `None` instead of an error so that
//! callers can degrade to "no match".

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use control_tower_core::{
    traits::{ChatMessage, CompletionOptions, LlmClient},
    types::ChatRequest,
    Result,
};

/// Remove Markdown code-fence markers and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse a model reply into a JSON object of type `T`.
///
/// Tries the fence-stripped text first, then the slice between the first `{`
/// and the last `}`. Anything that is not a JSON object is `None`.
pub fn parse_reply<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let cleaned = strip_code_fences(raw);

    let object = parse_object(&cleaned).or_else(|| {
        let start = cleaned.find('{')?;
        let end = cleaned.rfind('}')?;
        if end <= start {
            return None;
        }
        parse_object(&cleaned[start..=end])
    })?;

    match serde_json::from_value(object) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(error = %e, "Model reply does not fit the expected shape");
            None
        }
    }
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// How much conversation history is replayed to classification prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryPolicy {
    pub enabled: bool,
    pub max_turns: usize,
}

impl HistoryPolicy {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn last(max_turns: usize) -> Self {
        Self {
            enabled: true,
            max_turns,
        }
    }
}

/// Prompt-in, raw-text-out call to the language model.
#[derive(Clone)]
pub struct Classifier {
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
    history: HistoryPolicy,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            options: CompletionOptions::with_temperature(0.0),
            history: HistoryPolicy::disabled(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.options = CompletionOptions::with_temperature(temperature);
        self
    }

    pub fn with_history(mut self, history: HistoryPolicy) -> Self {
        self.history = history;
        self
    }

    /// `[system, history.., user]` for `request`.
    pub fn messages(&self, system_prompt: &str, request: &ChatRequest) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(system_prompt)];

        if self.history.enabled && self.history.max_turns > 0 {
            let turns: Vec<_> = request
                .history
                .iter()
                .filter(|t| t.is_conversational())
                .collect();
            let skip = turns.len().saturating_sub(self.history.max_turns);
            for turn in turns.into_iter().skip(skip) {
                messages.push(ChatMessage {
                    role: turn.role.clone(),
                    content: turn.content.clone(),
                });
            }
        }

        messages.push(ChatMessage::user(&request.message));
        messages
    }

    /// Raw model text for `request` under `system_prompt`.
    pub async fn classify(&self, system_prompt: &str, request: &ChatRequest) -> Result<String> {
        let messages = self.messages(system_prompt, request);
        let response = self.llm.chat_with(&messages, &self.options).await?;
        Ok(response.content)
    }
}
