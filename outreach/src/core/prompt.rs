//! Prompt construction for sequence generation

use shared::{JobPosting, ProspectRecord, ScrapedContext, truncate_chars};
use shared::types::context::caps;

/// Average tokens per word, used for rough prompt sizing
const TOKENS_PER_WORD: f32 = 1.3;

/// Builds the single structured prompt sent to the model
///
/// Every context section is capped before insertion and omitted entirely
/// when empty, so a bare prospect record still yields a usable prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sender_name: String,
}

impl PromptBuilder {
    pub fn new(sender_name: impl Into<String>) -> Self {
        Self { sender_name: sender_name.into().trim().to_string() }
    }

    pub fn build(&self, prospect: &ProspectRecord, context: &ScrapedContext) -> String {
        let context = context.capped();
        let mut sections = vec![self.prospect_section(prospect)];

        if let Some(posting) = &context.job_posting {
            sections.push(job_posting_section(posting));
        }
        if !context.profile_highlights.is_empty() {
            sections.push(format!("PROFILE HIGHLIGHTS:\n{}", context.profile_highlights));
        }
        if !context.recent_posts.is_empty() {
            sections.push(bulleted("RECENT POSTS", &context.recent_posts));
        }
        if !context.web_snippets.is_empty() {
            sections.push(bulleted("WEB SEARCH SNIPPETS", &context.web_snippets));
        }

        let signature = if self.sender_name.is_empty() {
            String::new()
        } else {
            format!("\n- Sign every message as {}", self.sender_name)
        };

        format!(
            r#"You write B2B prospecting sequences in French for a recruitment agency.
Write a sequence of 3 messages and several email subject lines for the prospect below.

{context}

REQUIREMENTS:
- Each message must start with a greeting (e.g. "Bonjour {greeting_name},")
- Each message must be between 50 and 3000 characters
- Mention the company by name in at least one message
- The three messages must be different: first contact, follow-up, last follow-up
- Subject lines: at least 2, one per line, each under 100 characters
- Never leave template placeholders such as {{first_name}} or [company] in the text
- Pick one concrete personalization detail from the context as the hook{signature}

Reply with a single JSON object and nothing else:
{{"message_1": "...", "message_2": "...", "message_3": "...", "subject_lines": ["...", "..."], "hook": "..."}}"#,
            context = sections.join("\n\n"),
            greeting_name = prospect.first_name().unwrap_or("Madame, Monsieur"),
        )
    }

    fn prospect_section(&self, prospect: &ProspectRecord) -> String {
        let mut lines = vec!["PROSPECT:".to_string()];
        let name = prospect.full_name();
        if !name.is_empty() {
            lines.push(format!("- Name: {}", truncate_chars(&name, caps::TITLE)));
        }
        if let Some(company) = prospect.company() {
            lines.push(format!("- Company: {}", truncate_chars(company, caps::COMPANY)));
        }
        if let Some(title) = prospect.job_title() {
            lines.push(format!("- Job title: {}", truncate_chars(title, caps::TITLE)));
        }
        if !prospect.linkedin_url.trim().is_empty() {
            lines.push(format!("- LinkedIn: {}", prospect.linkedin_url.trim()));
        }
        if let Some(notes) = prospect.notes() {
            lines.push(format!("- Notes: {}", truncate_chars(notes, caps::NOTES)));
        }
        lines.join("\n")
    }
}

fn job_posting_section(posting: &JobPosting) -> String {
    let fields = [
        ("Title", &posting.title),
        ("Company", &posting.company),
        ("Location", &posting.location),
        ("Contract", &posting.contract_type),
        ("Description", &posting.description),
        ("Missions", &posting.missions),
        ("Profile sought", &posting.profile),
        ("Benefits", &posting.benefits),
    ];

    let mut lines = vec![format!("JOB POSTING ({}):", posting.source)];
    lines.extend(
        fields
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| format!("- {label}: {value}")),
    );
    lines.join("\n")
}

fn bulleted(title: &str, items: &[String]) -> String {
    let mut lines = vec![format!("{title}:")];
    lines.extend(items.iter().map(|item| format!("- {item}")));
    lines.join("\n")
}

/// Rough token estimate for a prompt
pub fn estimate_tokens(text: &str) -> u32 {
    (text.split_whitespace().count() as f32 * TOKENS_PER_WORD) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_prospect_omits_context_sections() {
        let prompt = PromptBuilder::default().build(&ProspectRecord::new("Marie", "Acme"), &ScrapedContext::default());

        assert!(prompt.contains("- Name: Marie"));
        assert!(prompt.contains("- Company: Acme"));
        assert!(prompt.contains("Bonjour Marie,"));
        assert!(!prompt.contains("JOB POSTING"));
        assert!(!prompt.contains("RECENT POSTS"));
        assert!(!prompt.contains("WEB SEARCH SNIPPETS"));
        assert!(!prompt.contains("Sign every message"));
    }

    #[test]
    fn test_full_context_is_embedded() {
        let context = ScrapedContext {
            job_posting: Some(JobPosting {
                title: "Data Engineer".to_string(),
                missions: "Construire des pipelines".to_string(),
                ..JobPosting::from_url("https://www.apec.fr/offre/1")
            }),
            profile_highlights: "10 ans en data".to_string(),
            recent_posts: vec!["Nous recrutons !".to_string(), "  ".to_string()],
            web_snippets: vec!["Acme lève 10M€".to_string()],
        };
        let prompt = PromptBuilder::new("Camille").build(&ProspectRecord::new("Marie", "Acme"), &context);

        assert!(prompt.contains("JOB POSTING (apec):"));
        assert!(prompt.contains("- Title: Data Engineer"));
        assert!(prompt.contains("- Missions: Construire des pipelines"));
        assert!(!prompt.contains("- Benefits:"));
        assert!(prompt.contains("PROFILE HIGHLIGHTS:\n10 ans en data"));
        assert!(prompt.contains("RECENT POSTS:\n- Nous recrutons !"));
        assert!(prompt.contains("- Acme lève 10M€"));
        assert!(prompt.contains("Sign every message as Camille"));
    }

    #[test]
    fn test_context_fields_are_capped() {
        let context = ScrapedContext::with_job_posting(JobPosting {
            description: "x".repeat(10_000),
            ..Default::default()
        });
        let prompt = PromptBuilder::default().build(&ProspectRecord::new("Marie", "Acme"), &context);

        let description_line = prompt
            .lines()
            .find(|line| line.starts_with("- Description: "))
            .unwrap();
        assert_eq!(description_line.chars().count(), "- Description: ".len() + caps::DESCRIPTION);
    }

    #[test]
    fn test_missing_first_name_uses_neutral_greeting() {
        let prompt = PromptBuilder::default().build(&ProspectRecord::new("", "Acme"), &ScrapedContext::default());
        assert!(prompt.contains("Bonjour Madame, Monsieur,"));
        assert!(!prompt.contains("- Name:"));
    }

    #[test]
    fn test_token_estimation() {
        let text = "This is a test sentence with several words";
        let estimated = estimate_tokens(text);
        let words = text.split_whitespace().count() as u32;
        assert!(estimated >= words);
        assert!(estimated <= words * 2);
    }
}
