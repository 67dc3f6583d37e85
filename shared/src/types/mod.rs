//! Core types used throughout the outreach pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod context;
pub mod prospect;
pub mod sequence;

pub use context::{JobPosting, JobSource, ScrapedContext, truncate_chars};
pub use prospect::ProspectRecord;
pub use sequence::{MessageSequence, SequenceSource};

/// LLM providers the generator can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    Anthropic,
    OpenAI,
}

impl ProviderId {
    /// Default model for the provider when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "claude-3-5-sonnet-20241022",
            ProviderId::OpenAI => "gpt-4o-mini",
        }
    }

    /// Environment variable holding the provider's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Anthropic => write!(f, "anthropic"),
            ProviderId::OpenAI => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderId::Anthropic),
            "openai" => Ok(ProviderId::OpenAI),
            _ => Err(format!("Unknown provider: {s}")),
        }
    }
}

/// Token usage information for a single model call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// API failure reasons for LLM provider requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFailure {
    /// Authentication failed (invalid or missing API key)
    AuthenticationFailed,
    /// Rate limit exceeded
    RateLimitExceeded,
    /// Request quota exceeded
    QuotaExceeded,
    /// Invalid request format or parameters
    InvalidRequest(String),
    /// Network/connection error
    NetworkError(String),
    /// Server error from provider
    ServerError(String),
    /// Request timeout
    Timeout,
    /// Service temporarily unavailable
    ServiceUnavailable,
}

impl ApiFailure {
    /// Classify a non-success HTTP status returned by a provider
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => ApiFailure::AuthenticationFailed,
            402 => ApiFailure::QuotaExceeded,
            408 => ApiFailure::Timeout,
            429 => ApiFailure::RateLimitExceeded,
            503 | 529 => ApiFailure::ServiceUnavailable,
            400..=499 => ApiFailure::InvalidRequest(format!("HTTP {status}: {body}")),
            _ => ApiFailure::ServerError(format!("HTTP {status}: {body}")),
        }
    }

    /// Whether a bounded retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiFailure::RateLimitExceeded
                | ApiFailure::Timeout
                | ApiFailure::NetworkError(_)
                | ApiFailure::ServiceUnavailable
                | ApiFailure::ServerError(_)
        )
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::AuthenticationFailed => write!(f, "authentication failed"),
            ApiFailure::RateLimitExceeded => write!(f, "rate limit exceeded"),
            ApiFailure::QuotaExceeded => write!(f, "quota exceeded"),
            ApiFailure::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            ApiFailure::NetworkError(msg) => write!(f, "network error: {msg}"),
            ApiFailure::ServerError(msg) => write!(f, "server error: {msg}"),
            ApiFailure::Timeout => write!(f, "request timed out"),
            ApiFailure::ServiceUnavailable => write!(f, "service unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip_names() {
        assert_eq!("anthropic".parse::<ProviderId>().unwrap(), ProviderId::Anthropic);
        assert_eq!("OpenAI".parse::<ProviderId>().unwrap(), ProviderId::OpenAI);
        assert!("gemini".parse::<ProviderId>().is_err());
        assert_eq!(ProviderId::Anthropic.to_string(), "anthropic");
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(ApiFailure::from_status(401, ""), ApiFailure::AuthenticationFailed);
        assert_eq!(ApiFailure::from_status(429, ""), ApiFailure::RateLimitExceeded);
        assert_eq!(ApiFailure::from_status(503, ""), ApiFailure::ServiceUnavailable);
        assert!(matches!(ApiFailure::from_status(400, "bad"), ApiFailure::InvalidRequest(_)));
        assert!(matches!(ApiFailure::from_status(500, "oops"), ApiFailure::ServerError(_)));
    }

    #[test]
    fn test_retryable_failures() {
        assert!(ApiFailure::RateLimitExceeded.is_retryable());
        assert!(ApiFailure::Timeout.is_retryable());
        assert!(!ApiFailure::AuthenticationFailed.is_retryable());
        assert!(!ApiFailure::InvalidRequest("x".to_string()).is_retryable());
    }
}
