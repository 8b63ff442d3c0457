use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Dispatch Outcome (single external contract)
// =============================================================================

/// Result of one chat request, whatever branch produced it.
///
/// Every path through the pipeline yields exactly one of these. Failures are
/// represented with a localized `answer` and `data: None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Natural-language answer shown to the user.
    pub answer: String,
    /// Trace of what was executed; empty when nothing was.
    pub query: String,
    /// Structured result data.
    pub data: Option<Value>,
}

impl DispatchOutcome {
    /// Successful execution.
    pub fn success(answer: impl Into<String>, query: impl Into<String>, data: Value) -> Self {
        Self {
            answer: answer.into(),
            query: query.into(),
            data: Some(data),
        }
    }

    /// Terminal answer with nothing executed.
    pub fn direct(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            query: String::new(),
            data: None,
        }
    }

    /// Error-shaped outcome that keeps the diagnostic query.
    pub fn failure(answer: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            query: query.into(),
            data: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.data.is_none()
    }
}
