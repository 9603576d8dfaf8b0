//! API error types
//!
//! Every failure a request can hit is an [`ApiError`]. The [`ErrorPolicy`]
//! decides which HTTP status each category maps to; the message a client
//! sees for storage and internal faults is always generic.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::{ItemError, ItemId};
use crate::storage::StorageError;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned to clients in place of storage and internal fault detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors
    // ==================
    /// Path parameter absent or empty
    #[error("Missing path parameter: {0}")]
    MissingParam(&'static str),

    /// Required body field absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Body field present but unusable
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Body is not JSON, or not a JSON object
    #[error("Invalid request body")]
    InvalidBody,

    /// No operation for this method and path
    #[error("Unsupported route: {method} {path}")]
    UnsupportedRoute { method: String, path: String },

    /// Get of an id with no stored item
    #[error("Item {0} not found")]
    NotFound(ItemId),

    // ==================
    // Server Errors
    // ==================
    /// Storage fault, including timeouts
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Anything else that should not happen
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingParam(_) => "API_MISSING_PARAM",
            ApiError::MissingField(_) => "API_MISSING_FIELD",
            ApiError::InvalidField { .. } => "API_INVALID_FIELD",
            ApiError::InvalidBody => "API_INVALID_BODY",
            ApiError::UnsupportedRoute { .. } => "API_UNSUPPORTED_ROUTE",
            ApiError::NotFound(_) => "API_NOT_FOUND",
            ApiError::Storage(err) => err.code(),
            ApiError::Internal(_) => "API_INTERNAL",
        }
    }

    /// Whether the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ApiError::Storage(_) | ApiError::Internal(_))
    }

    /// HTTP status for this error under `policy`.
    pub fn status_code(&self, policy: ErrorPolicy) -> StatusCode {
        match (self, policy) {
            (ApiError::NotFound(_), ErrorPolicy::Typed) => StatusCode::NOT_FOUND,
            (ApiError::Storage(_) | ApiError::Internal(_), ErrorPolicy::Typed) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to return to a client.
    pub fn client_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        }
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotAnObject => ApiError::InvalidBody,
            ItemError::MissingField(field) => ApiError::MissingField(field),
            ItemError::InvalidField { field, reason } => ApiError::InvalidField { field, reason },
        }
    }
}

/// Mapping from error category to HTTP status.
///
/// | Category | `flattened` | `typed` |
/// |---|---|---|
/// | Bad request | 400 | 400 |
/// | Get of a missing item | 200 + `{}` | 404 |
/// | Storage or internal fault | 400 | 500 |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Flattened,
    Typed,
}

impl ErrorPolicy {
    /// Whether a Get of a missing item is reported as an error.
    pub fn reports_not_found(&self) -> bool {
        matches!(self, ErrorPolicy::Typed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Flattened => "flattened",
            ErrorPolicy::Typed => "typed",
        }
    }
}
