//! Intent detector trait.

use async_trait::async_trait;

use crate::types::{ChatRequest, Intent};

/// One stage of the intent cascade.
///
/// Detection is infallible by contract: a model error, a timeout or a
/// malformed reply all mean "not this intent" and yield `Intent::None`.
#[async_trait]
pub trait IntentDetector: Send + Sync {
    /// Stage name used in logs.
    fn name(&self) -> &'static str;

    /// Classify the request, returning `Intent::None` when it does not match.
    async fn detect(&self, request: &ChatRequest) -> Intent;
}
