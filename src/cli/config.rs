//! Configuration file loading
//!
//! One JSON object. Only `data_dir` is required; everything else has a
//! default. The file is validated in full before anything is opened.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::errors::{CliError, CliResult};
use crate::api::ErrorPolicy;
use crate::http_server::HttpServerConfig;
use crate::observability::LogFormat;

/// Which [`ItemStore`](crate::storage::ItemStore) implementation to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Durable record file under `data_dir`
    #[default]
    File,
    /// Volatile, lost on exit
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::File => "file",
            StorageBackend::Memory => "memory",
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Storage backend (optional, default "file")
    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Host to bind (optional, default "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (optional, default 54321)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bound on a single store call (optional, default 5000)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Error status mapping (optional, default "flattened")
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Log filter directive (optional, default "info"); `RUST_LOG` wins
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log line format (optional, default "json")
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    HttpServerConfig::default().host
}
fn default_port() -> u16 {
    HttpServerConfig::default().port
}
fn default_request_timeout_ms() -> u64 {
    HttpServerConfig::default().request_timeout_ms
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
    }

    /// Parse and validate configuration JSON
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        if self.request_timeout_ms == 0 {
            return Err(CliError::config_error("request_timeout_ms must be > 0"));
        }

        EnvFilter::try_new(&self.log_level).map_err(|e| {
            CliError::config_error(format!("Invalid log_level '{}': {}", self.log_level, e))
        })?;

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// HTTP settings, with `port` replacing the configured port if given
    pub fn http_config(&self, port: Option<u16>) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host.clone(),
            port: port.unwrap_or(self.port),
            request_timeout_ms: self.request_timeout_ms,
            error_policy: self.error_policy,
        }
    }
}
