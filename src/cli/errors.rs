//! Operator-facing failures of the `itemstore` binary
//!
//! Every failure carries a stable `ITEMSTORE_CLI_*` code so scripts driving
//! `init`, `serve`, `dump` and `compact` can tell a missing data directory
//! apart from a damaged record file. The process prints `CODE: message` to
//! stderr and exits 1.

use std::io;

use thiserror::Error;

use crate::observability::ObservabilityError;

/// Which stage of a command failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// The config file is missing, unparsable or fails validation, or the
    /// log subscriber could not be installed from it.
    ConfigError,
    /// Writing command output or touching the filesystem failed.
    IoError,
    /// `init` ran against a data directory that already has a `data/` layout.
    AlreadyInitialized,
    /// A file-backed command ran before `init`.
    NotInitialized,
    /// The record file could not be replayed, or the listener could not bind.
    BootFailed,
    /// The store opened but the command itself (list, compaction) failed.
    CommandFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ITEMSTORE_CLI_CONFIG_ERROR",
            Self::IoError => "ITEMSTORE_CLI_IO_ERROR",
            Self::AlreadyInitialized => "ITEMSTORE_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "ITEMSTORE_CLI_NOT_INITIALIZED",
            Self::BootFailed => "ITEMSTORE_CLI_BOOT_FAILED",
            Self::CommandFailed => "ITEMSTORE_CLI_COMMAND_FAILED",
        }
    }
}

/// A failed CLI command, rendered as `CODE: message`
#[derive(Debug, Error)]
#[error("{}: {message}", .code.code())]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'itemstore init' first.",
        )
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn command_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::CommandFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Stable code string, e.g. `ITEMSTORE_CLI_BOOT_FAILED`.
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// Logging is configured from the config file, so a subscriber that cannot
/// be installed is a config problem.
impl From<ObservabilityError> for CliError {
    fn from(e: ObservabilityError) -> Self {
        Self::config_error(e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
