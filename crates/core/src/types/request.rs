use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::i18n::Lang;

// =============================================================================
// Request Types
// =============================================================================

/// One prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// `user` or `assistant`.
    pub role: String,
    pub content: String,
}

impl HistoryTurn {
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

    /// Whether the turn may be replayed to a model.
    pub fn is_conversational(&self) -> bool {
        matches!(self.role.as_str(), "user" | "assistant") && !self.content.trim().is_empty()
    }
}

/// Validated inbound chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trace ID for this request.
    pub trace_id: String,
    pub message: String,
    pub lang: Lang,
    /// Prior turns, oldest first.
    pub history: Vec<HistoryTurn>,
}

impl ChatRequest {
    /// Create a request with the primary language and no history.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            message: message.into(),
            lang: Lang::default(),
            history: Vec::new(),
        }
    }

    pub fn with_lang(mut self, lang: Lang) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }

    /// Validate a raw `/chat` body.
    ///
    /// `message` must be a non-empty string. `lang` falls back to the primary
    /// language. `history` is used only when it is an array, and turns that do
    /// not have string `role`/`content` are skipped.
    pub fn from_json(body: &Value) -> Result<Self> {
        let message = match body.get("message") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(Error::invalid_request("message is required")),
        };

        let lang = Lang::resolve(body.get("lang").and_then(Value::as_str));

        let history = body
            .get("history")
            .and_then(Value::as_array)
            .map(|turns| {
                turns
                    .iter()
                    .filter_map(|t| serde_json::from_value::<HistoryTurn>(t.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self::new(message).with_lang(lang).with_history(history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_minimal() {
        let req = ChatRequest::from_json(&json!({ "message": "Show all orders" })).unwrap();
        assert_eq!(req.message, "Show all orders");
        assert_eq!(req.lang, Lang::Zh);
        assert!(req.history.is_empty());
        assert!(!req.trace_id.is_empty());
    }

    #[test]
    fn test_from_json_rejects_missing_or_non_string_message() {
        assert!(matches!(
            ChatRequest::from_json(&json!({})),
            Err(Error::InvalidRequest(_))
        ));
        assert!(ChatRequest::from_json(&json!({ "message": 42 })).is_err());
        assert!(ChatRequest::from_json(&json!({ "message": "" })).is_err());
    }

    #[test]
    fn test_from_json_history_is_lenient() {
        let req = ChatRequest::from_json(&json!({
            "message": "any fix?",
            "lang": "en",
            "history": [
                { "role": "user", "content": "which suppliers have risks" },
                { "role": "assistant" },
                "garbage",
                { "role": "assistant", "content": "S3 and S7" }
            ]
        }))
        .unwrap();

        assert_eq!(req.lang, Lang::En);
        assert_eq!(req.history.len(), 2);
        assert_eq!(req.history[1], HistoryTurn::assistant("S3 and S7"));
    }

    #[test]
    fn test_history_not_array_is_ignored() {
        let req = ChatRequest::from_json(&json!({ "message": "hi", "history": "nope" })).unwrap();
        assert!(req.history.is_empty());
    }
}
