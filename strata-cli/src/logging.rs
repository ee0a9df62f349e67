//! Logging setup for the `strata` binary.
//!
//! Log output goes to stderr so it never mixes with generated SQL.
//!
//! # Environment Variables
//!
//! - `STRATA_LOG_LEVEL=trace|debug|info|warn|error` - Set the log level
//! - `STRATA_LOG_FORMAT=pretty|compact|json` - Set the output format (default: compact)

use std::env;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Get the configured log level.
///
/// `--verbose` means `debug`; otherwise `STRATA_LOG_LEVEL`, defaulting to `warn`.
pub fn log_level(verbose: bool) -> &'static str {
    if verbose {
        return "debug";
    }
    match env::var("STRATA_LOG_LEVEL")
        .map(|l| l.to_lowercase())
        .as_deref()
    {
        Ok("trace") => "trace",
        Ok("debug") => "debug",
        Ok("info") => "info",
        Ok("error") => "error",
        _ => "warn",
    }
}

/// Get the configured log format.
pub fn log_format() -> &'static str {
    env::var("STRATA_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "json" => "json",
            _ => "compact",
        })
        .unwrap_or("compact")
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    let level = log_level(verbose);
    let filter = EnvFilter::try_new(format!(
        "strata={level},strata_cli={level},strata_schema={level},strata_migrate={level}"
    ))
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match log_format() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!(level, format = log_format(), "logging initialized");
    }
}
