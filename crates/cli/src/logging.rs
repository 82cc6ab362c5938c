//! Logging setup
//!
//! Logs always go to stderr: stdout carries the transcript.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the log output format (`json` or anything else for compact text)
pub const LOG_FORMAT_ENV: &str = "PIPER_LOG_FORMAT";

/// Used when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "piper=error";

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: filter directives (default: `piper=error`)
/// - `PIPER_LOG_FORMAT`: `json` for structured logs
///
/// # Example
///
/// ```text
/// RUST_LOG=piper=debug PIPER_LOG_FORMAT=json piper -c 'tr a-z A-Z'
/// ```
pub fn init() -> Result<()> {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "compact".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
