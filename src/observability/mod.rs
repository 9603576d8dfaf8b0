//! Observability subsystem for itemstore
//!
//! - Structured logging through `tracing` (JSON lines or text)
//! - Typed lifecycle events
//! - Begin/complete scopes for long operations
//!
//! # Usage
//!
//! ```ignore
//! use itemstore::observability::{self, Event, LogFormat, ObservationScope};
//!
//! observability::init("info", LogFormat::Json)?;
//! observability::log_event(Event::BootStart);
//!
//! let scope = ObservationScope::new(Event::CompactionStart);
//! // ... do work ...
//! scope.complete(Event::CompactionComplete);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{env_filter, init, LogFormat};
pub use scope::ObservationScope;

use thiserror::Error;

/// Observability failure. Never fatal to the store itself.
#[derive(Debug, Error)]
#[error("ITEMSTORE_OBSERVABILITY_FAILED: {message}")]
pub struct ObservabilityError {
    message: String,
}

impl ObservabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;

/// Log a lifecycle event with no fields
pub fn log_event(event: Event) {
    if event.is_fatal() {
        tracing::error!(event = event.as_str());
    } else {
        tracing::info!(event = event.as_str());
    }
}
