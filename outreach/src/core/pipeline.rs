//! Per-prospect orchestration: generate, validate, fall back

use std::sync::Arc;

use shared::{prospect_debug, prospect_info, prospect_warn};
use shared::{MessageSequence, ProspectRecord, ScrapedContext, SequenceSource};
use crate::core::skills::SkillDetector;
use crate::core::utils::retry_generate;
use crate::core::validator::SequenceValidator;
use crate::traits::{FallbackStrategy, SequenceGenerator};
use crate::types::{Finding, PipelineOutcome, PipelineStage, ValidationPolicy};
use crate::error::GenerationError;

/// Drives one prospect at a time through the generation state machine
///
/// The run itself cannot fail: every generation or validation problem ends
/// in the fallback branch, and the outcome carries what went wrong.
pub struct Pipeline<G: SequenceGenerator, F: FallbackStrategy> {
    generator: Arc<G>,
    fallback: Arc<F>,
    validator: SequenceValidator,
    skill_detector: SkillDetector,
    max_retries: u32,
}

/// Internal run state, advanced one stage at a time
struct RunState {
    trace: Vec<PipelineStage>,
    candidate: Option<MessageSequence>,
    rejected_findings: Vec<Finding>,
    generation_error: Option<GenerationError>,
}

impl RunState {
    fn enter(&mut self, stage: PipelineStage) {
        self.trace.push(stage);
    }
}

impl<G: SequenceGenerator, F: FallbackStrategy> Pipeline<G, F> {
    pub fn new(generator: Arc<G>, fallback: Arc<F>, policy: ValidationPolicy) -> Self {
        Self {
            generator,
            fallback,
            validator: SequenceValidator::new(policy),
            skill_detector: SkillDetector::new(),
            max_retries: 0,
        }
    }

    /// Retry transient provider failures before falling back
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn validator(&self) -> &SequenceValidator {
        &self.validator
    }

    /// Run with skills detected from the job posting
    pub async fn run(&self, prospect: &ProspectRecord, context: &ScrapedContext) -> PipelineOutcome {
        self.run_with_skills(prospect, context, None).await
    }

    /// Run with caller-supplied skills for the fallback templates
    pub async fn run_with_skills(
        &self,
        prospect: &ProspectRecord,
        context: &ScrapedContext,
        detected_skills: Option<&[String]>,
    ) -> PipelineOutcome {
        let label = prospect.label();
        let mut state = RunState {
            trace: vec![PipelineStage::Start],
            candidate: None,
            rejected_findings: Vec::new(),
            generation_error: None,
        };

        state.enter(PipelineStage::Generating);
        let generated = if self.max_retries > 0 {
            retry_generate(self.generator.as_ref(), prospect, context, self.max_retries).await
        } else {
            self.generator.generate(prospect, context).await
        };

        match generated {
            Ok(sequence) => {
                state.enter(PipelineStage::Validating);
                let report = self.validator.validate(&sequence, Some(prospect));
                if report.valid {
                    state.enter(PipelineStage::Done);
                    prospect_info!(label, "✅ Generated sequence accepted ({} finding(s))", report.findings.len());
                    return PipelineOutcome {
                        sequence: sequence.with_provenance(SequenceSource::Generated),
                        source: SequenceSource::Generated,
                        diagnostics: report.findings,
                        rejected_findings: Vec::new(),
                        generation_error: None,
                        trace: state.trace,
                    };
                }

                prospect_warn!(
                    label,
                    "Generated sequence rejected: {}",
                    report.messages().join("; ")
                );
                state.candidate = Some(sequence);
                state.rejected_findings = report.findings;
            }
            Err(error) => {
                prospect_warn!(label, "Generation failed, using fallback: {}", error);
                state.generation_error = Some(error);
            }
        }

        self.finish_with_fallback(prospect, context, detected_skills, state)
    }

    fn finish_with_fallback(
        &self,
        prospect: &ProspectRecord,
        context: &ScrapedContext,
        detected_skills: Option<&[String]>,
        mut state: RunState,
    ) -> PipelineOutcome {
        let label = prospect.label();

        state.enter(PipelineStage::FallbackGenerating);
        let owned_skills;
        let skills = match detected_skills {
            Some(skills) => skills,
            None => {
                owned_skills = self.skill_detector.detect(context);
                owned_skills.as_slice()
            }
        };
        let skills = (!skills.is_empty()).then_some(skills);
        let sequence = self.fallback.generate_fallback(prospect, skills);

        // Diagnostic only; the fallback is returned whatever the verdict
        state.enter(PipelineStage::FallbackValidating);
        let report = self.validator.validate(&sequence, Some(prospect));
        if !report.valid {
            prospect_warn!(label, "Fallback sequence has findings: {}", report.messages().join("; "));
        }

        state.enter(PipelineStage::Done);
        if let Some(discarded) = &state.candidate {
            prospect_debug!(label, "Discarded model sequence ({} chars in message_1)", discarded.message_1.chars().count());
        }
        prospect_info!(label, "📝 Fallback sequence used");

        PipelineOutcome {
            sequence: sequence.with_provenance(SequenceSource::Fallback),
            source: SequenceSource::Fallback,
            diagnostics: report.findings,
            rejected_findings: state.rejected_findings,
            generation_error: state.generation_error,
            trace: state.trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ApiFailure, JobPosting};
    use crate::core::fallback::TemplateFallback;
    use crate::traits::MockSequenceGenerator;
    use crate::types::RuleId;

    fn valid_sequence() -> MessageSequence {
        MessageSequence::new(
            "Bonjour Marie, j'ai vu que Acme recrute plusieurs ingénieurs data ce trimestre.",
            "Bonjour Marie, je me permets de revenir vers vous au sujet de vos recrutements.",
            "Bonjour Marie, dernier message de ma part, je reste disponible si besoin.",
            "Vos recrutements data\nQuestion rapide, Marie",
        )
    }

    fn pipeline(generator: MockSequenceGenerator, policy: ValidationPolicy) -> Pipeline<MockSequenceGenerator, TemplateFallback> {
        Pipeline::new(Arc::new(generator), Arc::new(TemplateFallback::new("Camille")), policy)
    }

    #[tokio::test]
    async fn test_valid_generation_is_accepted() {
        let mut generator = MockSequenceGenerator::new();
        generator.expect_generate().times(1).returning(|_, _| Ok(valid_sequence()));

        let outcome = pipeline(generator, ValidationPolicy::Strict)
            .run(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default())
            .await;

        assert_eq!(outcome.source, SequenceSource::Generated);
        assert_eq!(outcome.sequence.source, Some(SequenceSource::Generated));
        assert!(outcome.sequence.generated_at.is_some());
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(
            outcome.trace,
            vec![PipelineStage::Start, PipelineStage::Generating, PipelineStage::Validating, PipelineStage::Done]
        );
    }

    #[tokio::test]
    async fn test_provider_failure_skips_validation() {
        let mut generator = MockSequenceGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::ProviderFailure(ApiFailure::AuthenticationFailed)));

        let outcome = pipeline(generator, ValidationPolicy::Strict)
            .run(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default())
            .await;

        assert!(outcome.used_fallback());
        assert_eq!(
            outcome.generation_error,
            Some(GenerationError::ProviderFailure(ApiFailure::AuthenticationFailed))
        );
        assert_eq!(
            outcome.trace,
            vec![
                PipelineStage::Start,
                PipelineStage::Generating,
                PipelineStage::FallbackGenerating,
                PipelineStage::FallbackValidating,
                PipelineStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_soft_finding_policy() {
        let mut sequence = valid_sequence();
        sequence.message_3 = "Merci pour votre temps, je reste disponible si le sujet devient prioritaire.".to_string();

        let mut strict_generator = MockSequenceGenerator::new();
        let strict_sequence = sequence.clone();
        strict_generator.expect_generate().returning(move |_, _| Ok(strict_sequence.clone()));
        let strict = pipeline(strict_generator, ValidationPolicy::Strict)
            .run(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default())
            .await;
        assert!(strict.used_fallback());
        assert_eq!(strict.rejected_findings.len(), 1);
        assert_eq!(strict.rejected_findings[0].rule_id, RuleId::MissingGreeting);

        let mut lenient_generator = MockSequenceGenerator::new();
        lenient_generator.expect_generate().returning(move |_, _| Ok(sequence.clone()));
        let lenient = pipeline(lenient_generator, ValidationPolicy::HardOnly)
            .run(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default())
            .await;
        assert_eq!(lenient.source, SequenceSource::Generated);
        assert_eq!(lenient.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_uses_skills_from_posting() {
        let mut generator = MockSequenceGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _| Err(GenerationError::MalformedResponse { reason: "no JSON".to_string() }));

        let context = ScrapedContext::with_job_posting(JobPosting {
            missions: "Développer des services en Rust".to_string(),
            ..Default::default()
        });
        let outcome = pipeline(generator, ValidationPolicy::Strict)
            .run(&ProspectRecord::new("Marie", "Acme"), &context)
            .await;

        assert!(outcome.used_fallback());
        assert!(outcome.sequence.message_1.contains("Rust"));
    }

    #[tokio::test]
    async fn test_caller_skills_take_precedence() {
        let mut generator = MockSequenceGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _| Err(GenerationError::ProviderFailure(ApiFailure::Timeout)));

        let skills = vec!["Kubernetes".to_string()];
        let outcome = pipeline(generator, ValidationPolicy::Strict)
            .run_with_skills(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default(), Some(&skills))
            .await;

        assert!(outcome.sequence.message_1.contains("Kubernetes"));
    }
}
