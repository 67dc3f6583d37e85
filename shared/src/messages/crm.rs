//! Spreadsheet/CRM boundary: prospect rows in, sequence write-back out

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{SharedError, SharedResult};
use crate::types::{MessageSequence, ProspectRecord, SequenceSource};

/// Fixed column mapping shared by the sheet reader and writer
pub mod columns {
    pub const FIRST_NAME: &str = "First Name";
    pub const LAST_NAME: &str = "Last Name";
    pub const COMPANY: &str = "Company";
    pub const JOB_TITLE: &str = "Job Title";
    pub const LINKEDIN_URL: &str = "LinkedIn URL";
    pub const NOTES: &str = "Notes";
    pub const RECORD_ID: &str = "Row ID";

    pub const MESSAGE_1: &str = "Message 1";
    pub const MESSAGE_2: &str = "Message 2";
    pub const MESSAGE_3: &str = "Message 3";
    pub const SUBJECT_LINES: &str = "Subject Lines";
    pub const SEQUENCE_SOURCE: &str = "Sequence Source";
    pub const HOOK_DATA: &str = "Hook Data";
}

/// One raw row keyed by column header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectRow(pub HashMap<String, String>);

impl ProspectRow {
    pub fn new(cells: HashMap<String, String>) -> Self {
        Self(cells)
    }

    fn cell(&self, column: &str) -> String {
        self.0.get(column).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    /// Map the row onto a prospect
    ///
    /// The first name and company columns must exist in the sheet; their
    /// values may still be empty.
    pub fn to_prospect(&self) -> SharedResult<ProspectRecord> {
        for required in [columns::FIRST_NAME, columns::COMPANY] {
            if !self.0.contains_key(required) {
                return Err(SharedError::MissingColumn { column: required.to_string() });
            }
        }

        let optional = |column: &str| Some(self.cell(column)).filter(|v| !v.is_empty());

        Ok(ProspectRecord {
            first_name: self.cell(columns::FIRST_NAME),
            last_name: self.cell(columns::LAST_NAME),
            company: self.cell(columns::COMPANY),
            job_title: self.cell(columns::JOB_TITLE),
            linkedin_url: self.cell(columns::LINKEDIN_URL),
            notes: optional(columns::NOTES),
            record_id: optional(columns::RECORD_ID),
        })
    }
}

/// Generated fields and raw hook data written back for one prospect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceWriteBack {
    pub record_id: Option<String>,
    pub message_1: String,
    pub message_2: String,
    pub message_3: String,
    pub subject_lines: String,
    pub source: Option<SequenceSource>,
    pub raw_hook_data: Option<String>,
}

impl SequenceWriteBack {
    pub fn from_sequence(record_id: Option<String>, sequence: &MessageSequence) -> Self {
        Self {
            record_id,
            message_1: sequence.message_1.clone(),
            message_2: sequence.message_2.clone(),
            message_3: sequence.message_3.clone(),
            subject_lines: sequence.subject_lines.clone(),
            source: sequence.source,
            raw_hook_data: sequence.hook.clone(),
        }
    }

    /// Cells to write, keyed by output column header
    pub fn to_columns(&self) -> Vec<(&'static str, String)> {
        vec![
            (columns::MESSAGE_1, self.message_1.clone()),
            (columns::MESSAGE_2, self.message_2.clone()),
            (columns::MESSAGE_3, self.message_3.clone()),
            (columns::SUBJECT_LINES, self.subject_lines.clone()),
            (
                columns::SEQUENCE_SOURCE,
                self.source.map(|s| s.to_string()).unwrap_or_default(),
            ),
            (columns::HOOK_DATA, self.raw_hook_data.clone().unwrap_or_default()),
        ]
    }
}
