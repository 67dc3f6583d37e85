//! Outreach trait definitions for dependency injection

use std::path::Path;
use async_trait::async_trait;

use shared::{ApiFailure, MessageSequence, ProspectRecord, ScrapedContext};
use crate::error::{GenerationError, OutreachResult};
use crate::types::{ModelResponse, UsageRecord, UsageSummary};

/// Language-model call boundary
#[mockall::automock]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt and return the text plus reported token usage
    async fn call_model(&self, prompt: &str, max_tokens: u32) -> Result<ModelResponse, ApiFailure>;
}

/// Usage and cost accounting for model calls
#[mockall::automock]
#[async_trait]
pub trait UsageTracker: Send + Sync {
    /// Append a record and update the running totals
    async fn track(&self, input_tokens: u64, output_tokens: u64, label: &str) -> UsageRecord;

    /// Session cost recomputed from the running totals
    async fn total_cost(&self) -> f64;

    /// Duration, call count and totals so far
    async fn summary(&self) -> UsageSummary;

    /// Every record, in insertion order
    async fn records(&self) -> Vec<UsageRecord>;

    /// Write summary and records as JSON
    async fn export(&self, path: &Path) -> OutreachResult<()>;
}

/// Model-backed sequence generation strategy
#[mockall::automock]
#[async_trait]
pub trait SequenceGenerator: Send + Sync {
    /// Produce a candidate sequence with exactly one model call
    async fn generate(
        &self,
        prospect: &ProspectRecord,
        context: &ScrapedContext,
    ) -> Result<MessageSequence, GenerationError>;
}

/// Deterministic availability fallback; must never fail
pub trait FallbackStrategy: Send + Sync {
    fn generate_fallback(
        &self,
        prospect: &ProspectRecord,
        detected_skills: Option<&[String]>,
    ) -> MessageSequence;
}
