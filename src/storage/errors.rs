//! Storage error types
//!
//! Storage faults are a category of their own: they are never folded into
//! "not found" (a missing item is `Ok(None)`) or into bad input.
//!
//! Codes:
//! - STORAGE_IO_ERROR
//! - STORAGE_DATA_CORRUPTION (fatal: the store refuses to open)
//! - STORAGE_ENCODING_ERROR
//! - STORAGE_LOCK_POISONED
//! - STORAGE_TIMEOUT

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage failure
#[derive(Debug, Error)]
pub enum StorageError {
    /// Disk I/O failed.
    #[error("storage I/O failure: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A record failed length or checksum validation.
    #[error("data corruption at byte offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    /// A document could not be encoded or decoded as JSON.
    #[error("document encoding failed: {0}")]
    Encoding(String),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// The operation did not finish within the request timeout.
    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),
}

impl StorageError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        Self::Corruption {
            offset,
            reason: reason.into(),
        }
    }

    /// Stable error code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::Io { .. } => "STORAGE_IO_ERROR",
            StorageError::Corruption { .. } => "STORAGE_DATA_CORRUPTION",
            StorageError::Encoding(_) => "STORAGE_ENCODING_ERROR",
            StorageError::LockPoisoned => "STORAGE_LOCK_POISONED",
            StorageError::Timeout(_) => "STORAGE_TIMEOUT",
        }
    }

    /// Corruption is fatal: serving from a damaged file is never allowed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StorageError::Corruption { .. })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
