//! Chat handler trait consumed by the HTTP layer.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatRequest, DispatchOutcome};

/// The full question-to-answer pipeline.
#[async_trait]
pub trait ChatHandler: Send + Sync {
    /// Answer one chat request.
    ///
    /// Pipeline failures come back as error-shaped outcomes; an `Err` here is
    /// a defect and is reported to the client as a server error.
    async fn handle(&self, request: ChatRequest) -> Result<DispatchOutcome>;
}
