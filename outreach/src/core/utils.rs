//! Retry helpers around generator calls

use std::time::Duration;
use tracing::warn;

use shared::{MessageSequence, ProspectRecord, ScrapedContext};
use crate::error::GenerationError;
use crate::traits::SequenceGenerator;

/// Base delay for exponential backoff
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Backoff before retry number `attempt` (0-based)
pub fn backoff_delay(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * 2u32.saturating_pow(attempt.min(10))
}

/// Call the generator, retrying transient provider failures up to `max_retries` times
///
/// Malformed replies and non-retryable failures are returned immediately.
pub async fn retry_generate<G: SequenceGenerator + ?Sized>(
    generator: &G,
    prospect: &ProspectRecord,
    context: &ScrapedContext,
    max_retries: u32,
) -> Result<MessageSequence, GenerationError> {
    let mut attempt = 0;
    loop {
        match generator.generate(prospect, context).await {
            Err(error) if error.is_retryable() && attempt < max_retries => {
                let delay = backoff_delay(attempt);
                warn!(
                    prospect = %prospect.label(),
                    "Attempt {} failed ({}), retrying in {}ms",
                    attempt + 1,
                    error,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use shared::ApiFailure;
    use crate::traits::MockSequenceGenerator;

    fn ok_sequence() -> MessageSequence {
        MessageSequence::new("a", "b", "c", "d")
    }

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let mut generator = MockSequenceGenerator::new();
        let mut seq = Sequence::new();
        generator
            .expect_generate()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(GenerationError::ProviderFailure(ApiFailure::Timeout)));
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(ok_sequence()));

        let result = retry_generate(&generator, &ProspectRecord::default(), &ScrapedContext::default(), 3).await;
        assert_eq!(result, Ok(ok_sequence()));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let mut generator = MockSequenceGenerator::new();
        generator
            .expect_generate()
            .times(3)
            .returning(|_, _| Err(GenerationError::ProviderFailure(ApiFailure::ServiceUnavailable)));

        let result = retry_generate(&generator, &ProspectRecord::default(), &ScrapedContext::default(), 2).await;
        assert_eq!(result, Err(GenerationError::ProviderFailure(ApiFailure::ServiceUnavailable)));
    }

    #[tokio::test]
    async fn test_does_not_retry_permanent_errors() {
        let mut generator = MockSequenceGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::MalformedResponse { reason: "no JSON".to_string() }));

        let result = retry_generate(&generator, &ProspectRecord::default(), &ScrapedContext::default(), 5).await;
        assert!(matches!(result, Err(GenerationError::MalformedResponse { .. })));

        let mut generator = MockSequenceGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::ProviderFailure(ApiFailure::AuthenticationFailed)));

        let result = retry_generate(&generator, &ProspectRecord::default(), &ScrapedContext::default(), 5).await;
        assert_eq!(result, Err(GenerationError::ProviderFailure(ApiFailure::AuthenticationFailed)));
    }
}
