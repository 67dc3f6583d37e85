//! Competency keyword detection over scraped job postings

use regex::Regex;
use shared::ScrapedContext;

/// Catalogue of (pattern, label) pairs, scanned in this order
const SKILL_CATALOGUE: &[(&str, &str)] = &[
    ("python", "Python"),
    ("sql", "SQL"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("react", "React"),
    ("rust", "Rust"),
    ("c\\+\\+", "C++"),
    ("\\.net", ".NET"),
    ("aws", "AWS"),
    ("azure", "Azure"),
    ("gcp", "GCP"),
    ("kubernetes", "Kubernetes"),
    ("docker", "Docker"),
    ("terraform", "Terraform"),
    ("spark", "Spark"),
    ("power bi", "Power BI"),
    ("salesforce", "Salesforce"),
    ("sap", "SAP"),
    ("devops", "DevOps"),
    ("machine learning", "Machine Learning"),
    ("data science", "Data Science"),
    ("cybers[ée]curit[ée]|cybersecurity", "cybersécurité"),
    ("gestion de projet|project management", "gestion de projet"),
    ("comptabilit[ée]|accounting", "comptabilité"),
];

/// Detects known competencies in job-posting text
pub struct SkillDetector {
    patterns: Vec<(Regex, &'static str)>,
    max_skills: usize,
}

impl SkillDetector {
    pub fn new() -> Self {
        Self::with_max_skills(3)
    }

    pub fn with_max_skills(max_skills: usize) -> Self {
        let patterns = SKILL_CATALOGUE
            .iter()
            .map(|(pattern, label)| {
                let regex = Regex::new(&format!(r"(?i)(^|[^\w])(?:{pattern})($|[^\w])")).unwrap();
                (regex, *label)
            })
            .collect();

        Self { patterns, max_skills }
    }

    /// Skills found in the posting's missions, profile and description, in catalogue order
    pub fn detect(&self, context: &ScrapedContext) -> Vec<String> {
        let Some(posting) = context.job_posting.as_ref() else {
            return Vec::new();
        };
        let haystack = [
            posting.title.as_str(),
            posting.missions.as_str(),
            posting.profile.as_str(),
            posting.description.as_str(),
        ]
        .join("\n");

        self.patterns
            .iter()
            .filter(|(regex, _)| regex.is_match(&haystack))
            .map(|(_, label)| label.to_string())
            .take(self.max_skills)
            .collect()
    }
}

impl Default for SkillDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper using the default detector
pub fn detect_skills(context: &ScrapedContext) -> Vec<String> {
    SkillDetector::new().detect(context)
}
