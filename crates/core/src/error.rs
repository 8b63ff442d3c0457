//! Error types for the control tower.

use thiserror::Error;

/// Result type alias using the control tower's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the control tower.
///
/// Pipeline stages never surface these to the HTTP layer; they are converted
/// into a localized `DispatchOutcome` where they occur. The variants exist for
/// the collaborator seams (model, downstream services, configuration).
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Inbound Errors
    // =========================================================================
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Model Gateway Errors
    // =========================================================================
    #[error("Model provider error: {0}")]
    ModelProvider(String),

    // =========================================================================
    // Downstream Errors
    // =========================================================================
    #[error("Downstream returned HTTP {status}: {body}")]
    DownstreamStatus { status: u16, body: String },

    #[error("Downstream network error: {0}")]
    DownstreamNetwork(String),

    #[error("Downstream decode error: {0}")]
    DownstreamDecode(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a model provider error.
    pub fn model_provider(msg: impl Into<String>) -> Self {
        Self::ModelProvider(msg.into())
    }

    /// Create a downstream network error.
    pub fn downstream_network(msg: impl Into<String>) -> Self {
        Self::DownstreamNetwork(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
