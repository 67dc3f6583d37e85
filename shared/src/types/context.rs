//! Scraped enrichment context: job postings, profile highlights, posts and web snippets

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Per-field character caps applied before anything reaches a prompt
pub mod caps {
    pub const TITLE: usize = 200;
    pub const COMPANY: usize = 200;
    pub const LOCATION: usize = 200;
    pub const CONTRACT_TYPE: usize = 100;
    pub const DESCRIPTION: usize = 3000;
    pub const MISSIONS: usize = 1500;
    pub const PROFILE: usize = 1500;
    pub const BENEFITS: usize = 800;
    pub const PROFILE_HIGHLIGHTS: usize = 1500;
    pub const POST: usize = 500;
    pub const MAX_POSTS: usize = 3;
    pub const WEB_SNIPPET: usize = 400;
    pub const MAX_WEB_SNIPPETS: usize = 3;
    pub const NOTES: usize = 500;
}

/// Truncate to at most `max_chars` characters, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((byte_index, _)) => trimmed[..byte_index].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Job board a posting was scraped from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobSource {
    HelloWork,
    LinkedInJobs,
    Apec,
    #[default]
    Generic,
}

impl JobSource {
    /// Select the extraction strategy by URL pattern
    pub fn from_url(raw: &str) -> Self {
        let Ok(parsed) = Url::parse(raw.trim()) else {
            return JobSource::Generic;
        };
        let host = parsed.host_str().unwrap_or_default().to_lowercase();

        if host == "hellowork.com" || host.ends_with(".hellowork.com") {
            JobSource::HelloWork
        } else if (host == "linkedin.com" || host.ends_with(".linkedin.com"))
            && parsed.path().starts_with("/jobs")
        {
            JobSource::LinkedInJobs
        } else if host == "apec.fr" || host.ends_with(".apec.fr") {
            JobSource::Apec
        } else {
            JobSource::Generic
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSource::HelloWork => write!(f, "hellowork"),
            JobSource::LinkedInJobs => write!(f, "linkedin_jobs"),
            JobSource::Apec => write!(f, "apec"),
            JobSource::Generic => write!(f, "generic"),
        }
    }
}

/// Normalized job posting; every text field may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPosting {
    pub source: JobSource,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub contract_type: String,
    pub description: String,
    pub missions: String,
    pub profile: String,
    pub benefits: String,
}

impl JobPosting {
    /// Build an empty posting for a URL, with the source detected from it
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            source: JobSource::from_url(&url),
            url,
            ..Default::default()
        }
    }

    /// Copy with every field cut down to its cap
    pub fn capped(&self) -> Self {
        Self {
            source: self.source,
            url: self.url.trim().to_string(),
            title: truncate_chars(&self.title, caps::TITLE),
            company: truncate_chars(&self.company, caps::COMPANY),
            location: truncate_chars(&self.location, caps::LOCATION),
            contract_type: truncate_chars(&self.contract_type, caps::CONTRACT_TYPE),
            description: truncate_chars(&self.description, caps::DESCRIPTION),
            missions: truncate_chars(&self.missions, caps::MISSIONS),
            profile: truncate_chars(&self.profile, caps::PROFILE),
            benefits: truncate_chars(&self.benefits, caps::BENEFITS),
        }
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.title,
            &self.company,
            &self.location,
            &self.contract_type,
            &self.description,
            &self.missions,
            &self.profile,
            &self.benefits,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

/// Optional enrichment bundle handed to the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedContext {
    pub job_posting: Option<JobPosting>,
    pub profile_highlights: String,
    pub recent_posts: Vec<String>,
    pub web_snippets: Vec<String>,
}

impl ScrapedContext {
    pub fn with_job_posting(job_posting: JobPosting) -> Self {
        Self {
            job_posting: Some(job_posting),
            ..Default::default()
        }
    }

    /// Copy with caps applied and empty entries dropped
    pub fn capped(&self) -> Self {
        Self {
            job_posting: self
                .job_posting
                .as_ref()
                .map(JobPosting::capped)
                .filter(|posting| !posting.is_empty()),
            profile_highlights: truncate_chars(&self.profile_highlights, caps::PROFILE_HIGHLIGHTS),
            recent_posts: cap_list(&self.recent_posts, caps::MAX_POSTS, caps::POST),
            web_snippets: cap_list(&self.web_snippets, caps::MAX_WEB_SNIPPETS, caps::WEB_SNIPPET),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.job_posting.as_ref().map_or(true, JobPosting::is_empty)
            && self.profile_highlights.trim().is_empty()
            && self.recent_posts.iter().all(|p| p.trim().is_empty())
            && self.web_snippets.iter().all(|s| s.trim().is_empty())
    }
}

fn cap_list(items: &[String], max_items: usize, max_chars: usize) -> Vec<String> {
    items
        .iter()
        .map(|item| truncate_chars(item, max_chars))
        .filter(|item| !item.is_empty())
        .take(max_items)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_source_from_url() {
        assert_eq!(
            JobSource::from_url("https://www.hellowork.com/fr-fr/emplois/123.html"),
            JobSource::HelloWork
        );
        assert_eq!(
            JobSource::from_url("https://www.linkedin.com/jobs/view/4012345"),
            JobSource::LinkedInJobs
        );
        assert_eq!(
            JobSource::from_url("https://www.linkedin.com/in/marie-curie"),
            JobSource::Generic
        );
        assert_eq!(
            JobSource::from_url("https://www.apec.fr/candidat/offre.html"),
            JobSource::Apec
        );
        assert_eq!(JobSource::from_url("https://careers.acme.io/job/1"), JobSource::Generic);
        assert_eq!(JobSource::from_url("not a url"), JobSource::Generic);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "éàü".repeat(10);
        let cut = truncate_chars(&text, 4);
        assert_eq!(cut.chars().count(), 4);
        assert_eq!(cut, "éàüé");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_posting_caps() {
        let posting = JobPosting {
            description: "d".repeat(5000),
            missions: "m".repeat(2000),
            profile: "p".repeat(1501),
            title: "Data Engineer".to_string(),
            ..Default::default()
        };
        let capped = posting.capped();
        assert_eq!(capped.description.chars().count(), caps::DESCRIPTION);
        assert_eq!(capped.missions.chars().count(), caps::MISSIONS);
        assert_eq!(capped.profile.chars().count(), caps::PROFILE);
        assert_eq!(capped.title, "Data Engineer");
    }

    #[test]
    fn test_context_caps_drop_empty_entries() {
        let context = ScrapedContext {
            job_posting: Some(JobPosting::default()),
            profile_highlights: String::new(),
            recent_posts: vec![
                "  ".to_string(),
                "a".repeat(900),
                "second".to_string(),
                "third".to_string(),
                "fourth".to_string(),
            ],
            web_snippets: vec![],
        };
        let capped = context.capped();
        assert!(capped.job_posting.is_none());
        assert_eq!(capped.recent_posts.len(), caps::MAX_POSTS);
        assert_eq!(capped.recent_posts[0].chars().count(), caps::POST);
        assert_eq!(capped.recent_posts[2], "third");
    }

    #[test]
    fn test_empty_context() {
        assert!(ScrapedContext::default().is_empty());
        assert!(ScrapedContext::with_job_posting(JobPosting::from_url("https://apec.fr/x")).is_empty());
    }
}
