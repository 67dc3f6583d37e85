//! Outreach error types

use thiserror::Error;
use shared::ApiFailure;

/// Result type for outreach operations
pub type OutreachResult<T> = Result<T, OutreachError>;

/// Why a single generator invocation produced no sequence
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Provider request failed: {0}")]
    ProviderFailure(ApiFailure),

    #[error("Malformed model response: {reason}")]
    MalformedResponse { reason: String },
}

impl GenerationError {
    /// Whether a bounded retry may help
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::ProviderFailure(failure) => failure.is_retryable(),
            GenerationError::MalformedResponse { .. } => false,
        }
    }
}

impl From<ApiFailure> for GenerationError {
    fn from(failure: ApiFailure) -> Self {
        GenerationError::ProviderFailure(failure)
    }
}

/// Outreach error types
#[derive(Error, Debug)]
pub enum OutreachError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Sequence failed validation with {count} finding(s)")]
    ValidationFailed { count: usize },

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}
