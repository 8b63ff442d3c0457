//! Result summarization.
//!
//! Turns the structured data a backend returned into a short localized
//! answer. The summarizer sees only the current question, never history.

use serde_json::Value;
use std::sync::Arc;

use control_tower_core::{
    traits::{ChatMessage, CompletionOptions, LlmClient},
    types::ChatRequest,
    Lang,
};

fn system_prompt(lang: Lang) -> &'static str {
    match lang {
        Lang::Zh => "你是供应链数据分析助手。根据用户的问题和查询结果，用中文生成简洁的自然语言摘要。直接回答问题，不要提及 GraphQL、接口或 JSON。",
        Lang::En => "You are a supply chain data analysis assistant. Based on the user's question and the query results, write a concise natural language summary in English. Answer the question directly without mentioning GraphQL, APIs or JSON.",
    }
}

/// Summarizes backend results with the language model.
pub struct Summarizer {
    llm: Arc<dyn LlmClient>,
    options: CompletionOptions,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            options: CompletionOptions::with_temperature(0.3),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.options = CompletionOptions::with_temperature(temperature);
        self
    }

    /// Build the `[system, user]` prompt for `data`.
    pub fn messages(request: &ChatRequest, data: &Value) -> Vec<ChatMessage> {
        let m = request.lang.messages();
        let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());

        vec![
            ChatMessage::system(system_prompt(request.lang)),
            ChatMessage::user(format!(
                "{}: {}\n\n{}:\n{}",
                m.question_label, request.message, m.result_label, pretty
            )),
        ]
    }

    /// Localized answer for `data`. Never empty.
    pub async fn summarize(&self, request: &ChatRequest, data: &Value) -> String {
        let messages = Self::messages(request, data);

        match self.llm.chat_with(&messages, &self.options).await {
            Ok(response) if !response.content.trim().is_empty() => response.content,
            Ok(_) => {
                tracing::warn!(trace_id = %request.trace_id, "Summarizer returned empty content");
                request.lang.messages().no_summary.to_string()
            }
            Err(e) => {
                tracing::warn!(trace_id = %request.trace_id, error = %e, "Summarizer call failed");
                request.lang.messages().no_summary.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use control_tower_core::{mocks::MockLlm, types::HistoryTurn};
    use serde_json::json;

    #[tokio::test]
    async fn test_summary_prompt_layout() {
        let llm = Arc::new(MockLlm::scripted(&["共有 2 个订单。"]));
        let summarizer = Summarizer::new(llm.clone());
        let request = ChatRequest::new("显示所有订单")
            .with_history(vec![HistoryTurn::user("之前的问题")]);

        let answer = summarizer
            .summarize(&request, &json!({ "orders": [{ "id": "SO0001" }] }))
            .await;

        assert_eq!(answer, "共有 2 个订单。");
        let calls = llm.calls();
        assert_eq!(calls[0].len(), 2);
        assert_eq!(
            calls[0][1].content,
            "用户问题: 显示所有订单\n\n查询结果:\n{\n  \"orders\": [\n    {\n      \"id\": \"SO0001\"\n    }\n  ]\n}"
        );
        assert_eq!(llm.options()[0].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_empty_summary_uses_fallback() {
        let llm = Arc::new(MockLlm::scripted(&["   "]));
        let summarizer = Summarizer::new(llm);

        let answer = summarizer
            .summarize(&ChatRequest::new("Show all orders").with_lang(Lang::En), &json!({}))
            .await;

        assert_eq!(answer, "Unable to generate summary.");
    }

    #[tokio::test]
    async fn test_failed_summary_uses_fallback() {
        let llm = Arc::new(MockLlm::default().then_fail("timeout"));
        let summarizer = Summarizer::new(llm);

        let answer = summarizer
            .summarize(&ChatRequest::new("显示所有订单"), &json!({ "orders": [] }))
            .await;

        assert_eq!(answer, "无法生成摘要。");
    }
}
