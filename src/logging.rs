//! Logging setup.
//!
//! Structured logging via `tracing`. `RUST_LOG` wins when set; otherwise the
//! configured level applies globally. Output goes to stderr so rendered
//! scaffold summaries on stdout stay machine-readable.

use crate::config::LoggingConfig;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber from the logging config, with optional
/// CLI overrides. Safe to call once per process.
pub fn init(
    config: &LoggingConfig,
    level_override: Option<&str>,
    format_override: Option<&str>,
) -> anyhow::Result<()> {
    let level = level_override.unwrap_or(&config.level);
    let format = format_override.unwrap_or(&config.format);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("{e}")),
        "text" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("{e}")),
        other => Err(anyhow::anyhow!("unknown log format {other:?}")),
    }
    .context("failed to initialize logging")
}
