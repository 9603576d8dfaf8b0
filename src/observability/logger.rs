//! Log subscriber setup
//!
//! One line per event, written to stderr so that stdout stays free for
//! command output such as `dump`. JSON lines by default, plain text on
//! request. `RUST_LOG`, when set, overrides the configured level.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::{ObservabilityError, ObservabilityResult};

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Text => "text",
        }
    }
}

/// Build the level filter: `RUST_LOG` if set, otherwise `level`.
pub fn env_filter(level: &str) -> ObservabilityResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| ObservabilityError::new(format!("Invalid log level '{}': {}", level, e))),
    }
}

/// Install the global subscriber.
///
/// Fails if the level is not a valid filter directive or a subscriber is
/// already installed.
pub fn init(level: &str, format: LogFormat) -> ObservabilityResult<()> {
    let filter = env_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| ObservabilityError::new(format!("Failed to install logger: {}", e)))
}
