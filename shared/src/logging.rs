//! Shared logging utilities for consistent tracing across the pipeline

use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Default filter directives for a base level
pub fn default_filter(base_level: &str) -> String {
    format!("outreach={base_level},shared={base_level},reqwest=warn")
}

/// Initialize the tracing subscriber with an optional log level
///
/// `RUST_LOG` wins over the level when it is set.
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let base_level = log_level.unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(base_level)));

    // try_init so repeated calls (tests, embedding callers) don't panic
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Initialize tracing at the default level
pub fn init_tracing() {
    init_tracing_with_level(None);
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for prospect-aware info logging
#[macro_export]
macro_rules! prospect_info {
    ($prospect:expr, $($arg:tt)*) => {
        tracing::info!(
            prospect = %$prospect,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for prospect-aware warning logging
#[macro_export]
macro_rules! prospect_warn {
    ($prospect:expr, $($arg:tt)*) => {
        tracing::warn!(
            prospect = %$prospect,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for prospect-aware debug logging
#[macro_export]
macro_rules! prospect_debug {
    ($prospect:expr, $($arg:tt)*) => {
        tracing::debug!(
            prospect = %$prospect,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(details: &str) {
    info!(timestamp = format_timestamp(), "🚀 Starting {}", details);
}

/// Contextual logging helper for error conditions
pub fn log_error(context: &str, error: &dyn std::fmt::Display) {
    error!(
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}
