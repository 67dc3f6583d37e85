//! Test helper utilities for outreach integration tests

#![allow(dead_code)]

use std::sync::Arc;

use outreach::core::{LlmSequenceGenerator, Pipeline, PromptBuilder, TemplateFallback};
use outreach::services::RealUsageTracker;
use outreach::{ModelClient, Pricing, ValidationPolicy};
use shared::MessageSequence;

pub type TestPipeline<M> = Pipeline<LlmSequenceGenerator<M, RealUsageTracker>, TemplateFallback>;

/// Wire a pipeline around any model client with a fresh ledger
pub fn build_pipeline<M: ModelClient>(client: M, policy: ValidationPolicy) -> (TestPipeline<M>, Arc<RealUsageTracker>) {
    let tracker = Arc::new(RealUsageTracker::new(Pricing::per_million(3.0, 15.0)));
    let generator = LlmSequenceGenerator::new(
        Arc::new(client),
        tracker.clone(),
        PromptBuilder::new("Camille Martin"),
        2000,
    );
    let pipeline = Pipeline::new(
        Arc::new(generator),
        Arc::new(TemplateFallback::new("Camille Martin")),
        policy,
    );
    (pipeline, tracker)
}

/// True when some message body contains `needle`
pub fn any_message_contains(sequence: &MessageSequence, needle: &str) -> bool {
    sequence.messages().iter().any(|(_, body)| body.contains(needle))
}
