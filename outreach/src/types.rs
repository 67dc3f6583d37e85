//! Outreach-specific data types

use std::fmt;
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use shared::{MessageSequence, ProspectRecord, SequenceSource, SequenceWriteBack, TokenUsage};

use crate::error::GenerationError;

/// Raw model output plus the token counts the provider reported
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub text: String,
    pub usage: TokenUsage,
    pub model_used: String,
    pub response_time: Duration,
}

/// Per-token USD price pair used for cost accounting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_token: f64,
    pub output_per_token: f64,
}

impl Pricing {
    /// Default input price, USD per million tokens
    pub const DEFAULT_INPUT_PER_MTOK: f64 = 3.0;
    /// Default output price, USD per million tokens
    pub const DEFAULT_OUTPUT_PER_MTOK: f64 = 15.0;

    pub fn per_million(input: f64, output: f64) -> Self {
        Self {
            input_per_token: input / 1_000_000.0,
            output_per_token: output / 1_000_000.0,
        }
    }

    /// Unrounded cost of a call
    pub fn raw_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        input_tokens as f64 * self.input_per_token + output_tokens as f64 * self.output_per_token
    }

    /// Cost of a call rounded to 4 decimal places
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        round_cost(self.raw_cost(input_tokens, output_tokens))
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::per_million(Self::DEFAULT_INPUT_PER_MTOK, Self::DEFAULT_OUTPUT_PER_MTOK)
    }
}

/// Round a USD amount to 4 decimal places
pub fn round_cost(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// One ledger entry per model invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

impl UsageRecord {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Running totals for a session
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub duration: Duration,
    pub call_count: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost: f64,
}

impl UsageSummary {
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }
}

/// How bad a validation finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Soft,
    Hard,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Soft => write!(f, "soft"),
            Severity::Hard => write!(f, "hard"),
        }
    }
}

/// Validation rules, in the order the validator runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    MissingField,
    UnresolvedPlaceholder,
    MessageTooShort,
    MessageTooLong,
    SubjectLineTooLong,
    SubjectLinesTooThin,
    DuplicateMessages,
    MissingGreeting,
    CompanyNotMentioned,
}

impl RuleId {
    pub fn severity(&self) -> Severity {
        match self {
            RuleId::MissingField | RuleId::UnresolvedPlaceholder => Severity::Hard,
            _ => Severity::Soft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::MissingField => "missing_field",
            RuleId::UnresolvedPlaceholder => "unresolved_placeholder",
            RuleId::MessageTooShort => "message_too_short",
            RuleId::MessageTooLong => "message_too_long",
            RuleId::SubjectLineTooLong => "subject_line_too_long",
            RuleId::SubjectLinesTooThin => "subject_lines_too_thin",
            RuleId::DuplicateMessages => "duplicate_messages",
            RuleId::MissingGreeting => "missing_greeting",
            RuleId::CompanyNotMentioned => "company_not_mentioned",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tagged diagnostic produced by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(rule_id: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            severity: rule_id.severity(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.severity, self.rule_id, self.message)
    }
}

/// Which findings make a sequence invalid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationPolicy {
    /// Any finding invalidates the sequence
    #[default]
    Strict,
    /// Only hard findings invalidate; soft ones are reported
    HardOnly,
}

impl ValidationPolicy {
    pub fn invalidates(&self, finding: &Finding) -> bool {
        match self {
            ValidationPolicy::Strict => true,
            ValidationPolicy::HardOnly => finding.severity == Severity::Hard,
        }
    }
}

impl std::str::FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ValidationPolicy::Strict),
            "hard-only" | "hard_only" | "hardonly" => Ok(ValidationPolicy::HardOnly),
            _ => Err(format!("Unknown validation policy '{s}'. Valid options: strict, hard-only")),
        }
    }
}

/// Validity under a policy plus every finding, in rule order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn has_rule(&self, rule_id: RuleId) -> bool {
        self.findings.iter().any(|f| f.rule_id == rule_id)
    }

    pub fn hard_count(&self) -> usize {
        self.findings.iter().filter(|f| f.severity == Severity::Hard).count()
    }

    /// Plain diagnostic strings, in order
    pub fn messages(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.message.clone()).collect()
    }
}

/// States of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Start,
    Generating,
    Validating,
    FallbackGenerating,
    FallbackValidating,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Start => "START",
            PipelineStage::Generating => "GENERATING",
            PipelineStage::Validating => "VALIDATING",
            PipelineStage::FallbackGenerating => "FALLBACK_GENERATING",
            PipelineStage::FallbackValidating => "FALLBACK_VALIDATING",
            PipelineStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Terminal result of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub sequence: MessageSequence,
    pub source: SequenceSource,
    /// Findings for the returned sequence
    pub diagnostics: Vec<Finding>,
    /// Findings that caused the model sequence to be rejected
    pub rejected_findings: Vec<Finding>,
    pub generation_error: Option<GenerationError>,
    /// Stages visited, in order
    pub trace: Vec<PipelineStage>,
}

impl PipelineOutcome {
    pub fn used_fallback(&self) -> bool {
        self.source == SequenceSource::Fallback
    }

    /// Record to hand back to the spreadsheet/CRM side
    pub fn write_back(&self, prospect: &ProspectRecord) -> SequenceWriteBack {
        SequenceWriteBack::from_sequence(prospect.record_id.clone(), &self.sequence)
    }
}
