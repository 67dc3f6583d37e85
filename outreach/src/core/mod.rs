//! Pure pipeline logic: validation, templating, prompting and orchestration

pub mod fallback;
pub mod generator;
pub mod ledger;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod skills;
pub mod utils;
pub mod validator;

pub use fallback::{FallbackVariant, TemplateFallback};
pub use generator::{GENERATE_LABEL, LlmSequenceGenerator};
pub use ledger::UsageLedger;
pub use parser::ResponseParser;
pub use pipeline::Pipeline;
pub use prompt::{PromptBuilder, estimate_tokens};
pub use skills::{SkillDetector, detect_skills};
pub use utils::retry_generate;
pub use validator::{SequenceValidator, format_report};
