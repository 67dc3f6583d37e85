//! Runtime configuration loaded from the environment

use std::str::FromStr;
use std::time::Duration;

use shared::ProviderId;
use crate::error::{OutreachError, OutreachResult};
use crate::types::{Pricing, ValidationPolicy};

pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Everything the pipeline needs to run
#[derive(Debug, Clone, PartialEq)]
pub struct OutreachConfig {
    pub provider: ProviderId,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub pricing: Pricing,
    pub validation_policy: ValidationPolicy,
    pub max_retries: u32,
    pub sender_name: String,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        let provider = ProviderId::Anthropic;
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            pricing: Pricing::default(),
            validation_policy: ValidationPolicy::default(),
            max_retries: 0,
            sender_name: String::new(),
        }
    }
}

impl OutreachConfig {
    /// Load from process environment, reading `.env` first if present
    ///
    /// Environment variables:
    /// - OUTREACH_PROVIDER: anthropic|openai (default: anthropic)
    /// - OUTREACH_MODEL: model name (default: provider default)
    /// - ANTHROPIC_API_KEY / OPENAI_API_KEY: key for the selected provider
    /// - OUTREACH_MAX_TOKENS, OUTREACH_TEMPERATURE, OUTREACH_TIMEOUT_SECONDS
    /// - OUTREACH_PRICE_INPUT_PER_MTOK / OUTREACH_PRICE_OUTPUT_PER_MTOK: USD per million tokens
    /// - OUTREACH_VALIDATION_POLICY: strict|hard-only (default: strict)
    /// - OUTREACH_MAX_RETRIES: bounded retries on transient provider failures (default: 0)
    /// - OUTREACH_SENDER_NAME: signature for messages
    pub fn from_env() -> OutreachResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> OutreachResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let provider = match get("OUTREACH_PROVIDER") {
            Some(raw) => ProviderId::from_str(&raw).map_err(config_error)?,
            None => defaults.provider,
        };
        let model = get("OUTREACH_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let pricing = Pricing::per_million(
            parse_or(&get, "OUTREACH_PRICE_INPUT_PER_MTOK", Pricing::DEFAULT_INPUT_PER_MTOK)?,
            parse_or(&get, "OUTREACH_PRICE_OUTPUT_PER_MTOK", Pricing::DEFAULT_OUTPUT_PER_MTOK)?,
        );
        if pricing.input_per_token < 0.0 || pricing.output_per_token < 0.0 {
            return Err(config_error("token prices must not be negative"));
        }

        let validation_policy = match get("OUTREACH_VALIDATION_POLICY") {
            Some(raw) => ValidationPolicy::from_str(&raw).map_err(config_error)?,
            None => defaults.validation_policy,
        };

        let max_tokens: u32 = parse_or(&get, "OUTREACH_MAX_TOKENS", defaults.max_tokens)?;
        if max_tokens == 0 {
            return Err(config_error("OUTREACH_MAX_TOKENS must be positive"));
        }

        Ok(Self {
            provider,
            model,
            api_key: get(provider.api_key_var()),
            max_tokens,
            temperature: parse_or(&get, "OUTREACH_TEMPERATURE", defaults.temperature)?,
            timeout: Duration::from_secs(parse_or(&get, "OUTREACH_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)?),
            pricing,
            validation_policy,
            max_retries: parse_or(&get, "OUTREACH_MAX_RETRIES", defaults.max_retries)?,
            sender_name: get("OUTREACH_SENDER_NAME").unwrap_or_default(),
        })
    }

    /// API key for the selected provider, or a configuration error
    pub fn require_api_key(&self) -> OutreachResult<&str> {
        self.api_key.as_deref().ok_or_else(|| OutreachError::ConfigError {
            message: format!("{} is not set", self.provider.api_key_var()),
        })
    }
}

fn config_error(message: impl std::fmt::Display) -> OutreachError {
    OutreachError::ConfigError { message: message.to_string() }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> OutreachResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| config_error(format!("invalid {key} '{raw}': {e}"))),
        None => Ok(default),
    }
}
