//! Sequence validation rules
//!
//! Every rule runs on every call and findings accumulate in rule order:
//! structural presence, placeholder leakage, length bounds, subject-line
//! shape, message distinctness, greeting presence, company mention. Whether
//! the sequence counts as valid depends on the configured policy; the
//! findings themselves never do.

use regex::Regex;
use tracing::{info, warn};

use shared::{MessageSequence, ProspectRecord};
use crate::error::{OutreachError, OutreachResult};
use crate::types::{Finding, RuleId, ValidationPolicy, ValidationReport};

pub const MIN_MESSAGE_CHARS: usize = 50;
pub const MAX_MESSAGE_CHARS: usize = 3000;
pub const MAX_SUBJECT_LINE_CHARS: usize = 100;
pub const MIN_SUBJECT_CONTENT_CHARS: usize = 20;
pub const MIN_SUBJECT_LINES: usize = 2;
pub const MIN_COMPANY_CHARS: usize = 3;

/// The first-name placeholder the prompt and templates use
pub const FIRST_NAME_PLACEHOLDER: &str = "{first_name}";

/// Literal placeholder tokens that must never reach a prospect (lowercase)
const PLACEHOLDER_TOKENS: &[&str] = &[
    FIRST_NAME_PLACEHOLDER,
    "{firstname}",
    "{prenom}",
    "{prénom}",
    "{company}",
    "{company_name}",
    "{entreprise}",
    "{skill}",
    "{sender}",
    "[first name]",
    "[firstname]",
    "[prénom]",
    "[prenom]",
    "[company]",
    "[entreprise]",
    "[nom]",
];

/// Rule-based sequence validator
pub struct SequenceValidator {
    policy: ValidationPolicy,
    template_regex: Regex,
    greeting_regex: Regex,
}

impl SequenceValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        // Mustache-style leftovers such as {{first_name}} or {{ company }}
        let template_regex = Regex::new(r"\{\{\s*[\w.\-]+\s*\}\}").unwrap();
        let greeting_regex =
            Regex::new(r"(?i)\b(bonjour|bonsoir|salut|hello|hi|hey|dear|cher|chère|greetings)\b").unwrap();

        Self {
            policy,
            template_regex,
            greeting_regex,
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Run every rule and decide validity under the configured policy
    pub fn validate(&self, sequence: &MessageSequence, prospect: Option<&ProspectRecord>) -> ValidationReport {
        let mut findings = Vec::new();

        self.check_required_fields(sequence, &mut findings);
        self.check_placeholders(sequence, &mut findings);
        self.check_message_lengths(sequence, &mut findings);
        self.check_subject_lines(sequence, &mut findings);
        self.check_distinct_messages(sequence, &mut findings);
        self.check_greetings(sequence, &mut findings);
        self.check_company_mention(sequence, prospect, &mut findings);

        let valid = !findings.iter().any(|f| self.policy.invalidates(f));
        let label = prospect.map(ProspectRecord::label).unwrap_or_else(|| "unknown".to_string());

        if findings.is_empty() {
            info!(prospect = %label, "✅ Sequence passed validation");
        } else if valid {
            info!(
                prospect = %label,
                findings = findings.len(),
                "Sequence passed validation with {} soft finding(s)",
                findings.len()
            );
        } else {
            warn!(
                prospect = %label,
                findings = findings.len(),
                "⚠️ Sequence failed validation with {} finding(s)",
                findings.len()
            );
        }

        ValidationReport { valid, findings }
    }

    /// Validate, log a formatted report, and optionally turn failure into an error
    pub fn validate_and_report(
        &self,
        sequence: &MessageSequence,
        prospect: Option<&ProspectRecord>,
        raise_on_error: bool,
    ) -> OutreachResult<bool> {
        let report = self.validate(sequence, prospect);
        if !report.valid {
            warn!("{}", format_report(&report));
            if raise_on_error {
                return Err(OutreachError::ValidationFailed { count: report.findings.len() });
            }
        }
        Ok(report.valid)
    }

    fn check_required_fields(&self, sequence: &MessageSequence, findings: &mut Vec<Finding>) {
        for (name, value) in sequence.required_fields() {
            if value.trim().is_empty() {
                findings.push(Finding::new(
                    RuleId::MissingField,
                    format!("Missing or empty required field: {name}"),
                ));
            }
        }
    }

    fn check_placeholders(&self, sequence: &MessageSequence, findings: &mut Vec<Finding>) {
        for (name, value) in sequence.required_fields() {
            let lowered = value.to_lowercase();
            let leaked: Vec<&str> = PLACEHOLDER_TOKENS
                .iter()
                .copied()
                .filter(|token| lowered.contains(token))
                .collect();

            if !leaked.is_empty() {
                findings.push(Finding::new(
                    RuleId::UnresolvedPlaceholder,
                    format!("Unresolved placeholder in {name}: {}", leaked.join(", ")),
                ));
            } else if let Some(found) = self.template_regex.find(value) {
                findings.push(Finding::new(
                    RuleId::UnresolvedPlaceholder,
                    format!("Unresolved placeholder in {name}: {}", found.as_str()),
                ));
            }
        }
    }

    fn check_message_lengths(&self, sequence: &MessageSequence, findings: &mut Vec<Finding>) {
        for (name, body) in sequence.messages() {
            // Empty bodies are already reported as missing
            if body.trim().is_empty() {
                continue;
            }
            let length = body.chars().count();
            if length < MIN_MESSAGE_CHARS {
                findings.push(Finding::new(
                    RuleId::MessageTooShort,
                    format!("{name} too short: {length} chars (min {MIN_MESSAGE_CHARS})"),
                ));
            } else if length > MAX_MESSAGE_CHARS {
                findings.push(Finding::new(
                    RuleId::MessageTooLong,
                    format!("{name} too long: {length} chars (max {MAX_MESSAGE_CHARS})"),
                ));
            }
        }
    }

    fn check_subject_lines(&self, sequence: &MessageSequence, findings: &mut Vec<Finding>) {
        let lines = sequence.subject_line_list();
        if lines.is_empty() {
            return;
        }

        for (index, line) in lines.iter().enumerate() {
            let length = line.chars().count();
            if length > MAX_SUBJECT_LINE_CHARS {
                findings.push(Finding::new(
                    RuleId::SubjectLineTooLong,
                    format!(
                        "Subject line {} too long: {length} chars (max {MAX_SUBJECT_LINE_CHARS})",
                        index + 1
                    ),
                ));
            }
        }

        let content: usize = lines.iter().map(|line| line.chars().count()).sum();
        if lines.len() < MIN_SUBJECT_LINES && content < MIN_SUBJECT_CONTENT_CHARS {
            findings.push(Finding::new(
                RuleId::SubjectLinesTooThin,
                format!(
                    "Subject lines too thin: {} line(s), {content} chars (need {MIN_SUBJECT_LINES} lines or {MIN_SUBJECT_CONTENT_CHARS} chars)",
                    lines.len()
                ),
            ));
        }
    }

    fn check_distinct_messages(&self, sequence: &MessageSequence, findings: &mut Vec<Finding>) {
        if sequence.message_1.trim() == sequence.message_2.trim() {
            findings.push(Finding::new(
                RuleId::DuplicateMessages,
                "Duplicate messages: message_1 and message_2 are identical",
            ));
        }
    }

    fn check_greetings(&self, sequence: &MessageSequence, findings: &mut Vec<Finding>) {
        for (name, body) in sequence.messages() {
            if !body.trim().is_empty() && !self.greeting_regex.is_match(body) {
                findings.push(Finding::new(
                    RuleId::MissingGreeting,
                    format!("{name} has no greeting"),
                ));
            }
        }
    }

    fn check_company_mention(
        &self,
        sequence: &MessageSequence,
        prospect: Option<&ProspectRecord>,
        findings: &mut Vec<Finding>,
    ) {
        let Some(company) = prospect.and_then(ProspectRecord::company) else {
            return;
        };
        if company.chars().count() < MIN_COMPANY_CHARS {
            return;
        }

        let needle = company.to_lowercase();
        let mentioned = sequence
            .messages()
            .iter()
            .any(|(_, body)| body.to_lowercase().contains(&needle));

        if !mentioned {
            findings.push(Finding::new(
                RuleId::CompanyNotMentioned,
                format!("No message mentions the company '{company}'"),
            ));
        }
    }
}

impl Default for SequenceValidator {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}

/// Human-readable report for a validation result
pub fn format_report(report: &ValidationReport) -> String {
    if report.findings.is_empty() {
        return "Validation passed: no findings".to_string();
    }

    let status = if report.valid { "PASSED" } else { "FAILED" };
    let mut out = format!(
        "Validation {status}: {} finding(s), {} hard",
        report.findings.len(),
        report.hard_count()
    );
    for (index, finding) in report.findings.iter().enumerate() {
        out.push_str(&format!("\n  {}. {finding}", index + 1));
    }
    out
}
