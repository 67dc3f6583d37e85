//! Outreach sequence generation library
//!
//! Turns a prospect record plus scraped context into a validated three-message
//! outreach sequence. A language model writes the candidate, a rule-based
//! validator checks it, and a deterministic template fallback takes over
//! whenever generation or validation fails. Every model call is recorded in
//! a usage ledger for cost accounting.

pub mod config;
pub mod core;
pub mod error;
pub mod types;
pub mod traits;
pub mod services;

// Re-export main types
pub use config::OutreachConfig;
pub use error::{GenerationError, OutreachError, OutreachResult};
pub use types::*;
pub use traits::*;
pub use crate::core::{
    LlmSequenceGenerator, Pipeline, PromptBuilder, SequenceValidator, TemplateFallback, detect_skills,
};
pub use services::*;
