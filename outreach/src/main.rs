//! Outreach binary entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, warn};

use shared::logging::{init_tracing_with_level, log_error, log_startup};
use shared::{MessageSequence, ProspectRecord, ProspectRow, ScrapedContext, columns};
use outreach::core::{LlmSequenceGenerator, Pipeline, PromptBuilder, SequenceValidator, TemplateFallback, format_report};
use outreach::services::{RealModelClient, RealUsageTracker};
use outreach::{OutreachConfig, UsageTracker, ValidationPolicy};

#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Generate a validated outreach message sequence for one prospect")]
struct Args {
    /// Prospect record or spreadsheet row, inline JSON or path to a JSON file
    #[arg(long)]
    prospect: Option<String>,

    /// Scraped context, inline JSON or path to a JSON file
    #[arg(long)]
    context: Option<String>,

    /// Comma-separated skills for the fallback templates
    #[arg(long, value_delimiter = ',')]
    skills: Option<Vec<String>>,

    /// Write the usage ledger to this path when done
    #[arg(long)]
    ledger_out: Option<PathBuf>,

    /// Base log level (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Validation policy: strict or hard-only (overrides OUTREACH_VALIDATION_POLICY)
    #[arg(long)]
    policy: Option<ValidationPolicy>,

    /// Only validate this sequence, inline JSON or path to a JSON file
    #[arg(long)]
    validate_only: Option<String>,

    /// With --validate-only, exit with an error when the sequence is invalid
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing_with_level(args.log_level.as_deref());

    let mut config = OutreachConfig::from_env().context("Failed to load configuration")?;
    if let Some(policy) = args.policy {
        config.validation_policy = policy;
    }

    let prospect = args.prospect.as_deref().map(load_prospect).transpose()?;

    if let Some(raw) = args.validate_only.as_deref() {
        let sequence: MessageSequence = load_json(raw)?;
        return validate_only(&config, &sequence, prospect.as_ref(), args.strict);
    }

    let prospect = prospect.context("--prospect is required unless --validate-only is given")?;
    let context: ScrapedContext = match args.context.as_deref() {
        Some(raw) => load_json(raw)?,
        None => ScrapedContext::default(),
    };

    log_startup(&format!("outreach for {} ({} / {})", prospect.label(), config.provider, config.model));
    if context.is_empty() {
        info!("No scraped context; generating from the prospect record alone");
    }

    let client = match RealModelClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            // Keyless client fails every call, so the fallback answers
            warn!("{e}; the model call will fail and the fallback will be used");
            RealModelClient::new(config.provider, config.model.clone(), "", config.timeout)
                .with_temperature(config.temperature)
        }
    };
    let tracker = Arc::new(RealUsageTracker::new(config.pricing));
    let generator = LlmSequenceGenerator::new(
        Arc::new(client),
        tracker.clone(),
        PromptBuilder::new(config.sender_name.clone()),
        config.max_tokens,
    );
    let pipeline = Pipeline::new(
        Arc::new(generator),
        Arc::new(TemplateFallback::new(config.sender_name.clone())),
        config.validation_policy,
    )
    .with_max_retries(config.max_retries);

    let outcome = pipeline.run_with_skills(&prospect, &context, args.skills.as_deref()).await;

    let report = json!({
        "source": outcome.source,
        "sequence": outcome.sequence,
        "diagnostics": outcome.diagnostics,
        "rejected_findings": outcome.rejected_findings,
        "generation_error": outcome.generation_error.as_ref().map(ToString::to_string),
        "trace": outcome.trace,
        "write_back": outcome.write_back(&prospect),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    let summary = tracker.summary().await;
    info!(
        "Session: {} call(s), {} tokens, ${:.4}",
        summary.call_count,
        summary.total_tokens(),
        summary.total_cost
    );

    if let Some(path) = args.ledger_out.as_deref() {
        // Export failure is reported but does not fail the run
        if let Err(e) = tracker.export(path).await {
            log_error("Ledger export", &e);
        }
    }

    Ok(())
}

fn validate_only(
    config: &OutreachConfig,
    sequence: &MessageSequence,
    prospect: Option<&ProspectRecord>,
    strict: bool,
) -> Result<()> {
    let validator = SequenceValidator::new(config.validation_policy);
    if strict {
        validator.validate_and_report(sequence, prospect, true)?;
        println!("Validation passed");
    } else {
        println!("{}", format_report(&validator.validate(sequence, prospect)));
    }
    Ok(())
}

/// Accept either a prospect record or a row keyed by spreadsheet column headers
fn load_prospect(raw: &str) -> Result<ProspectRecord> {
    let value: serde_json::Value = load_json(raw)?;
    if value.get(columns::FIRST_NAME).is_some() {
        let row: ProspectRow = serde_json::from_value(value).context("Spreadsheet row cells must be strings")?;
        return Ok(row.to_prospect()?);
    }
    Ok(serde_json::from_value(value)?)
}

/// Parse inline JSON, or read it from a file when the argument is not an object
fn load_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        std::fs::read_to_string(Path::new(raw)).with_context(|| format!("Failed to read {raw}"))?
    };
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", preview(raw)))
}

fn preview(raw: &str) -> String {
    shared::truncate_chars(raw, 40)
}
