//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; binaries call [`init_tracing`]
//! once to decide where they go. `RUST_LOG` takes precedence over the level
//! passed in.

use crate::constants::{LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use crate::errors::{StoreError, StoreResult};
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parses `text` or `json`.
    pub fn parse(value: &str) -> StoreResult<Self> {
        match value {
            LOG_FORMAT_TEXT => Ok(LogFormat::Text),
            LOG_FORMAT_JSON => Ok(LogFormat::Json),
            other => Err(StoreError::Config(format!(
                "Unknown log format '{}', expected '{}' or '{}'",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            ))),
        }
    }
}

/// Installs a global fmt subscriber writing to stderr.
///
/// # Errors
///
/// Returns `StoreError::Config` if `level` is not a valid filter directive or a
/// global subscriber is already set.
pub fn init_tracing(format: LogFormat, level: &str) -> StoreResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| StoreError::Config(format!("Invalid log level '{}': {}", level, e)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    result.map_err(|e| StoreError::Config(format!("Failed to initialize logging: {}", e)))
}
