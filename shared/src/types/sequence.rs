//! Message sequence: the unit of work flowing out of the pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which strategy produced a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceSource {
    Generated,
    Fallback,
}

impl fmt::Display for SequenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceSource::Generated => write!(f, "generated"),
            SequenceSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Three outreach messages plus newline-separated subject line candidates
///
/// Construction does not enforce any rule; the validator does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSequence {
    #[serde(default)]
    pub message_1: String,
    #[serde(default)]
    pub message_2: String,
    #[serde(default)]
    pub message_3: String,
    #[serde(default)]
    pub subject_lines: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SequenceSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    /// Raw personalization hook reported by the model, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
}

impl MessageSequence {
    pub fn new(
        message_1: impl Into<String>,
        message_2: impl Into<String>,
        message_3: impl Into<String>,
        subject_lines: impl Into<String>,
    ) -> Self {
        Self {
            message_1: message_1.into(),
            message_2: message_2.into(),
            message_3: message_3.into(),
            subject_lines: subject_lines.into(),
            ..Default::default()
        }
    }

    /// Stamp provenance; consumes the sequence so a stamped value is never edited in place
    pub fn with_provenance(self, source: SequenceSource) -> Self {
        Self {
            source: Some(source),
            generated_at: Some(Utc::now()),
            ..self
        }
    }

    /// Message bodies paired with their field names, in order
    pub fn messages(&self) -> [(&'static str, &str); 3] {
        [
            ("message_1", self.message_1.as_str()),
            ("message_2", self.message_2.as_str()),
            ("message_3", self.message_3.as_str()),
        ]
    }

    /// Required fields paired with their names, in order
    pub fn required_fields(&self) -> [(&'static str, &str); 4] {
        let [m1, m2, m3] = self.messages();
        [m1, m2, m3, ("subject_lines", self.subject_lines.as_str())]
    }

    /// Non-empty, trimmed subject line candidates
    pub fn subject_line_list(&self) -> Vec<&str> {
        self.subject_lines
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}
