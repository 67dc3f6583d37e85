//! Prospect identity and firmographic record

use serde::{Deserialize, Serialize};

/// Normalized prospect as supplied by the spreadsheet/CRM side
///
/// Every field may be empty; consumers go through the trimmed accessors
/// rather than assuming the first name or company is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectRecord {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub job_title: String,
    pub linkedin_url: String,
    pub notes: Option<String>,
    /// Row or record identifier used for write-back
    pub record_id: Option<String>,
}

impl ProspectRecord {
    pub fn new(first_name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        non_empty(&self.first_name)
    }

    pub fn company(&self) -> Option<&str> {
        non_empty(&self.company)
    }

    pub fn job_title(&self) -> Option<&str> {
        non_empty(&self.job_title)
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().and_then(non_empty)
    }

    /// "First Last" when both are present, whichever exists otherwise
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Short label for log lines
    pub fn label(&self) -> String {
        let name = self.full_name();
        match (name.is_empty(), self.company()) {
            (false, Some(company)) => format!("{name} @ {company}"),
            (false, None) => name,
            (true, Some(company)) => format!("? @ {company}"),
            (true, None) => self.record_id.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_trim_and_skip_empty() {
        let prospect = ProspectRecord {
            first_name: "  Marie ".to_string(),
            company: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(prospect.first_name(), Some("Marie"));
        assert_eq!(prospect.company(), None);
        assert_eq!(prospect.label(), "Marie");
    }

    #[test]
    fn test_full_name_and_label() {
        let mut prospect = ProspectRecord::new("Marie", "Acme");
        prospect.last_name = "Curie".to_string();
        assert_eq!(prospect.full_name(), "Marie Curie");
        assert_eq!(prospect.label(), "Marie Curie @ Acme");

        let anonymous = ProspectRecord {
            record_id: Some("row-12".to_string()),
            ..Default::default()
        };
        assert_eq!(anonymous.label(), "row-12");
    }
}
