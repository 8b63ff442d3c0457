//! Answer language and the fixed user-facing strings for each language.

use serde::{Deserialize, Deserializer, Serialize};

/// Language of the answer.
///
/// `Zh` is the primary language; anything the client sends other than `"en"`
/// resolves to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    /// Resolve a client-supplied language tag.
    pub fn resolve(tag: Option<&str>) -> Self {
        match tag {
            Some("en") => Lang::En,
            _ => Lang::Zh,
        }
    }

    /// Localized message table for this language.
    pub fn messages(self) -> &'static Messages {
        match self {
            Lang::Zh => &ZH,
            Lang::En => &EN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lang::Zh => "zh",
            Lang::En => "en",
        }
    }
}

impl<'de> Deserialize<'de> for Lang {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(Lang::resolve(tag.as_deref()))
    }
}

/// Fixed user-facing strings.
#[derive(Debug)]
pub struct Messages {
    /// Translator output could not be turned into a query.
    pub parse_failed: &'static str,
    /// Graph endpoint answered with `errors`.
    pub query_error: &'static str,
    /// Transport-level failure reaching a backend.
    pub exec_failed: &'static str,
    /// Backend answered with a non-2xx status.
    pub http_error: &'static str,
    /// Summarizer produced nothing.
    pub no_summary: &'static str,
    /// The language model could not be reached at all.
    pub model_unavailable: &'static str,
    /// Label for the question in the summarizer input.
    pub question_label: &'static str,
    /// Label for the result data in the summarizer input.
    pub result_label: &'static str,
}

static ZH: Messages = Messages {
    parse_failed: "无法解析 AI 返回的查询，请尝试换一种表述。",
    query_error: "GraphQL 查询执行出错",
    exec_failed: "查询执行失败",
    http_error: "后端服务返回错误",
    no_summary: "无法生成摘要。",
    model_unavailable: "AI 服务暂时不可用，请稍后再试。",
    question_label: "用户问题",
    result_label: "查询结果",
};

static EN: Messages = Messages {
    parse_failed: "Unable to parse the AI response. Please try rephrasing your question.",
    query_error: "GraphQL query execution error",
    exec_failed: "Query execution failed",
    http_error: "Backend service returned an error",
    no_summary: "Unable to generate summary.",
    model_unavailable: "The AI service is temporarily unavailable. Please try again later.",
    question_label: "User question",
    result_label: "Query results",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_primary() {
        assert_eq!(Lang::resolve(None), Lang::Zh);
        assert_eq!(Lang::resolve(Some("fr")), Lang::Zh);
        assert_eq!(Lang::resolve(Some("zh")), Lang::Zh);
        assert_eq!(Lang::resolve(Some("en")), Lang::En);
    }

    #[test]
    fn test_resolve_is_exact() {
        assert_eq!(Lang::resolve(Some("EN")), Lang::Zh);
        assert_eq!(Lang::resolve(Some("En")), Lang::Zh);
        assert_eq!(Lang::resolve(Some(" en")), Lang::Zh);
    }

    #[test]
    fn test_deserialize_lenient() {
        let lang: Lang = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Lang::En);
        let lang: Lang = serde_json::from_str("null").unwrap();
        assert_eq!(lang, Lang::Zh);
    }

    #[test]
    fn test_tables_differ() {
        assert_ne!(Lang::Zh.messages().no_summary, Lang::En.messages().no_summary);
        assert!(!Lang::En.messages().parse_failed.is_empty());
    }
}
