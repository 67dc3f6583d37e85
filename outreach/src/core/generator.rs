//! Model-backed sequence generation

use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, warn};

use shared::{MessageSequence, ProspectRecord, ScrapedContext};
use crate::core::parser::ResponseParser;
use crate::core::prompt::{PromptBuilder, estimate_tokens};
use crate::error::GenerationError;
use crate::traits::{ModelClient, SequenceGenerator, UsageTracker};

/// Ledger label for generation calls
pub const GENERATE_LABEL: &str = "generate_sequence";

/// Generator that makes exactly one model call per invocation
pub struct LlmSequenceGenerator<M: ModelClient, U: UsageTracker> {
    client: Arc<M>,
    tracker: Arc<U>,
    prompt_builder: PromptBuilder,
    parser: ResponseParser,
    max_tokens: u32,
}

impl<M: ModelClient, U: UsageTracker> LlmSequenceGenerator<M, U> {
    pub fn new(client: Arc<M>, tracker: Arc<U>, prompt_builder: PromptBuilder, max_tokens: u32) -> Self {
        Self {
            client,
            tracker,
            prompt_builder,
            parser: ResponseParser::new(),
            max_tokens,
        }
    }
}

#[async_trait]
impl<M: ModelClient, U: UsageTracker> SequenceGenerator for LlmSequenceGenerator<M, U> {
    async fn generate(
        &self,
        prospect: &ProspectRecord,
        context: &ScrapedContext,
    ) -> Result<MessageSequence, GenerationError> {
        let prompt = self.prompt_builder.build(prospect, context);
        debug!(
            prospect = %prospect.label(),
            "Calling model with ~{} prompt tokens (max_tokens {})",
            estimate_tokens(&prompt),
            self.max_tokens
        );

        let response = self
            .client
            .call_model(&prompt, self.max_tokens)
            .await
            .map_err(|failure| {
                warn!(prospect = %prospect.label(), "Model call failed: {}", failure);
                GenerationError::ProviderFailure(failure)
            })?;

        // Tokens were spent even if the reply turns out to be unusable
        self.tracker
            .track(response.usage.input_tokens, response.usage.output_tokens, GENERATE_LABEL)
            .await;

        debug!(
            prospect = %prospect.label(),
            "{} replied in {}ms ({} tokens)",
            response.model_used,
            response.response_time.as_millis(),
            response.usage.total()
        );

        self.parser.parse(&response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use chrono::Utc;
    use mockall::predicate::*;
    use shared::{ApiFailure, TokenUsage};
    use crate::traits::{MockModelClient, MockUsageTracker};
    use crate::types::{ModelResponse, UsageRecord};

    fn response(text: &str) -> ModelResponse {
        ModelResponse {
            text: text.to_string(),
            usage: TokenUsage { input_tokens: 1200, output_tokens: 400 },
            model_used: "test-model".to_string(),
            response_time: Duration::from_millis(5),
        }
    }

    fn record(input: u64, output: u64) -> UsageRecord {
        UsageRecord {
            timestamp: Utc::now(),
            label: GENERATE_LABEL.to_string(),
            input_tokens: input,
            output_tokens: output,
            cost: 0.0,
        }
    }

    fn generator(client: MockModelClient, tracker: MockUsageTracker) -> LlmSequenceGenerator<MockModelClient, MockUsageTracker> {
        LlmSequenceGenerator::new(Arc::new(client), Arc::new(tracker), PromptBuilder::default(), 2000)
    }

    #[tokio::test]
    async fn test_success_tracks_usage_once() {
        let mut client = MockModelClient::new();
        client
            .expect_call_model()
            .withf(|prompt, max_tokens| prompt.contains("Acme") && *max_tokens == 2000)
            .times(1)
            .returning(|_, _| {
                Ok(response(r#"{"message_1": "a", "message_2": "b", "message_3": "c", "subject_lines": "d"}"#))
            });

        let mut tracker = MockUsageTracker::new();
        tracker
            .expect_track()
            .with(eq(1200), eq(400), eq(GENERATE_LABEL))
            .times(1)
            .returning(|i, o, _| record(i, o));

        let sequence = generator(client, tracker)
            .generate(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default())
            .await
            .unwrap();
        assert_eq!(sequence.message_2, "b");
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_tracked() {
        let mut client = MockModelClient::new();
        client
            .expect_call_model()
            .times(1)
            .returning(|_, _| Err(ApiFailure::RateLimitExceeded));

        let mut tracker = MockUsageTracker::new();
        tracker.expect_track().times(0);

        let result = generator(client, tracker)
            .generate(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default())
            .await;
        assert_eq!(result, Err(GenerationError::ProviderFailure(ApiFailure::RateLimitExceeded)));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_still_tracked() {
        let mut client = MockModelClient::new();
        client
            .expect_call_model()
            .times(1)
            .returning(|_, _| Ok(response("Je ne peux pas répondre à cette demande.")));

        let mut tracker = MockUsageTracker::new();
        tracker.expect_track().times(1).returning(|i, o, _| record(i, o));

        let result = generator(client, tracker)
            .generate(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default())
            .await;
        assert!(matches!(result, Err(GenerationError::MalformedResponse { .. })));
    }
}
