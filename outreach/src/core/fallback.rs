//! Deterministic template-based fallback sequences

use regex::{Captures, Regex};
use tracing::debug;

use shared::{MessageSequence, ProspectRecord, truncate_chars};
use crate::traits::FallbackStrategy;

/// Substituted values are capped so every template stays within the length bounds
const MAX_NAME_CHARS: usize = 50;
const MAX_COMPANY_CHARS: usize = 100;
const MAX_JOB_TITLE_CHARS: usize = 100;
const MAX_SKILL_CHARS: usize = 60;
const MAX_SUBJECT_VALUE_CHARS: usize = 30;
const MAX_SENDER_CHARS: usize = 60;

/// Template variants, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackVariant {
    Skills,
    JobTitle,
    Generic,
}

impl FallbackVariant {
    /// Pick the first eligible variant in priority order
    pub fn select(prospect: &ProspectRecord, detected_skills: Option<&[String]>) -> Self {
        let has_skills = detected_skills
            .map(|skills| skills.iter().any(|s| !s.trim().is_empty()))
            .unwrap_or(false);

        if has_skills {
            FallbackVariant::Skills
        } else if prospect.job_title().is_some() {
            FallbackVariant::JobTitle
        } else {
            FallbackVariant::Generic
        }
    }

    fn templates(&self) -> &'static SequenceTemplate {
        match self {
            FallbackVariant::Skills => &SKILLS_TEMPLATE,
            FallbackVariant::JobTitle => &JOB_TITLE_TEMPLATE,
            FallbackVariant::Generic => &GENERIC_TEMPLATE,
        }
    }
}

struct SequenceTemplate {
    message_1: &'static str,
    message_2: &'static str,
    message_3: &'static str,
    subject_lines: &'static str,
}

const SKILLS_TEMPLATE: SequenceTemplate = SequenceTemplate {
    message_1: "{greeting}\n\n\
En suivant l'actualité de {company}, j'ai remarqué que vos équipes recherchent des profils en {skill}. \
C'est précisément le type d'expertise que nous aidons nos clients à recruter, avec des candidats déjà qualifiés.\n\n\
Seriez-vous disponible pour un échange de 15 minutes cette semaine ?\n\n{signature}",
    message_2: "{greeting}\n\n\
Je me permets de revenir vers vous : les recrutements en {skill} prennent souvent du temps, \
et nous avons accompagné plusieurs entreprises comparables à {company} sur ce type de poste.\n\n\
Un court appel suffirait pour voir si notre approche peut vous en faire gagner.\n\n{signature}",
    message_3: "{greeting}\n\n\
Dernier message de ma part pour ne pas encombrer votre boîte de réception. \
Si le recrutement en {skill} reste d'actualité chez {company}, je serai ravi d'en discuter quand vous le souhaitez.\n\n{signature}",
    subject_lines: "Vos recrutements en {subject_skill}\n\
Question rapide{subject_name}\n\
Profils {subject_skill} pour {subject_company}",
};

const JOB_TITLE_TEMPLATE: SequenceTemplate = SequenceTemplate {
    message_1: "{greeting}\n\n\
En tant que {job_title} chez {company}, vous êtes sans doute au cœur des enjeux de recrutement de votre équipe. \
Nous aidons des responsables comme vous à trouver plus vite des candidats qualifiés.\n\n\
Seriez-vous disponible pour un échange de 15 minutes cette semaine ?\n\n{signature}",
    message_2: "{greeting}\n\n\
Je reviens vers vous au sujet de mon précédent message. \
Plusieurs entreprises comparables à {company} nous confient déjà leurs recrutements les plus urgents, \
et je serais curieux de connaître vos priorités du moment.\n\n{signature}",
    message_3: "{greeting}\n\n\
Dernier message de ma part pour ne pas encombrer votre boîte de réception. \
Si un recrutement se profile chez {company}, je serai ravi d'en discuter quand vous le souhaitez.\n\n{signature}",
    subject_lines: "Vos recrutements chez {subject_company}\n\
Question rapide{subject_name}\n\
Une idée pour votre équipe",
};

const GENERIC_TEMPLATE: SequenceTemplate = SequenceTemplate {
    message_1: "{greeting}\n\n\
Je me permets de vous contacter car nous accompagnons des entreprises comme {company} dans leurs recrutements, \
en leur présentant rapidement des candidats qualifiés et disponibles.\n\n\
Seriez-vous disponible pour un échange de 15 minutes cette semaine ?\n\n{signature}",
    message_2: "{greeting}\n\n\
Je reviens vers vous au sujet de mon précédent message. \
Si {company} a des postes ouverts ou à venir, je serais heureux de vous expliquer comment nous pouvons vous aider.\n\n{signature}",
    message_3: "{greeting}\n\n\
Dernier message de ma part pour ne pas encombrer votre boîte de réception. \
Si le sujet devient prioritaire chez {company}, je reste à votre disposition.\n\n{signature}",
    subject_lines: "Vos recrutements chez {subject_company}\n\
Question rapide{subject_name}",
};

/// Values substituted into a template
struct TemplateVars {
    greeting: String,
    company: String,
    job_title: String,
    skill: String,
    signature: String,
    subject_name: String,
    subject_company: String,
    subject_skill: String,
}

impl TemplateVars {
    fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "greeting" => &self.greeting,
            "company" => &self.company,
            "job_title" => &self.job_title,
            "skill" => &self.skill,
            "signature" => &self.signature,
            "subject_name" => &self.subject_name,
            "subject_company" => &self.subject_company,
            "subject_skill" => &self.subject_skill,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// Static-template fallback; total over any prospect record
pub struct TemplateFallback {
    sender_name: String,
    token_regex: Regex,
    leftover_regex: Regex,
}

impl TemplateFallback {
    pub fn new(sender_name: impl Into<String>) -> Self {
        // Any {...} or [...] span, which covers every token the validator rejects
        let leftover_regex = Regex::new(r"\{[^{}]*\}|\[[^\]]*\]").unwrap();
        let sender_name = sender_name.into();
        let sender_name = if leftover_regex.is_match(&sender_name) {
            String::new()
        } else {
            truncate_chars(&sender_name, MAX_SENDER_CHARS)
        };

        Self {
            sender_name,
            token_regex: Regex::new(r"\{([a-z_]+)\}").unwrap(),
            leftover_regex,
        }
    }

    /// Capped value, or `None` when it still carries an unfilled placeholder
    fn clean(&self, value: Option<&str>, max_chars: usize) -> Option<String> {
        value
            .filter(|v| !self.leftover_regex.is_match(v))
            .map(|v| truncate_chars(v, max_chars))
    }

    fn vars(&self, prospect: &ProspectRecord, detected_skills: Option<&[String]>) -> TemplateVars {
        let first_name = self.clean(prospect.first_name(), MAX_NAME_CHARS);
        let company = self.clean(prospect.company(), MAX_COMPANY_CHARS);

        let skills: Vec<&str> = detected_skills
            .unwrap_or_default()
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && !self.leftover_regex.is_match(s))
            .take(2)
            .collect();
        let skill = truncate_chars(&skills.join(" et "), MAX_SKILL_CHARS);

        let greeting = match &first_name {
            Some(name) => format!("Bonjour {name},"),
            None => "Bonjour,".to_string(),
        };
        let signature = if self.sender_name.is_empty() {
            "Bien à vous.".to_string()
        } else {
            format!("Bien à vous,\n{}", self.sender_name)
        };

        TemplateVars {
            greeting,
            company: company.clone().unwrap_or_else(|| "votre entreprise".to_string()),
            job_title: self
                .clean(prospect.job_title(), MAX_JOB_TITLE_CHARS)
                .unwrap_or_else(|| "responsable".to_string()),
            skill: if skill.is_empty() { "vos domaines clés".to_string() } else { skill.clone() },
            signature,
            subject_name: first_name
                .map(|n| format!(", {}", truncate_chars(&n, MAX_SUBJECT_VALUE_CHARS)))
                .unwrap_or_default(),
            subject_company: company
                .map(|c| truncate_chars(&c, MAX_SUBJECT_VALUE_CHARS))
                .unwrap_or_else(|| "votre entreprise".to_string()),
            subject_skill: if skill.is_empty() {
                "profils clés".to_string()
            } else {
                truncate_chars(&skill, MAX_SUBJECT_VALUE_CHARS)
            },
        }
    }

    /// Single-pass substitution so substituted values are never re-scanned
    fn render(&self, template: &str, vars: &TemplateVars) -> String {
        self.token_regex
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl Default for TemplateFallback {
    fn default() -> Self {
        Self::new("")
    }
}

impl FallbackStrategy for TemplateFallback {
    fn generate_fallback(
        &self,
        prospect: &ProspectRecord,
        detected_skills: Option<&[String]>,
    ) -> MessageSequence {
        let variant = FallbackVariant::select(prospect, detected_skills);
        let template = variant.templates();
        let vars = self.vars(prospect, detected_skills);

        debug!(prospect = %prospect.label(), "Rendering {:?} fallback template", variant);

        MessageSequence::new(
            self.render(template.message_1, &vars),
            self.render(template.message_2, &vars),
            self.render(template.message_3, &vars),
            self.render(template.subject_lines, &vars),
        )
    }
}
