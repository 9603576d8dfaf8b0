//! API response types
//!
//! Every response is a status plus a JSON body, sent as
//! `application/json`. Acknowledgements are JSON strings.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use super::errors::{ApiError, ErrorPolicy};
use crate::item::{Document, ItemId};

/// A finished API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    body: Value,
}

impl ApiResponse {
    /// 200 with `body`.
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// Acknowledgement for a stored item.
    pub fn put(id: &ItemId) -> Self {
        Self::ok(Value::String(format!("Put item {}", id)))
    }

    /// Acknowledgement for a deleted item.
    pub fn deleted(id: &ItemId) -> Self {
        Self::ok(Value::String(format!("Deleted item {}", id)))
    }

    /// A single item, or `{}` when there is none.
    pub fn item(document: Option<Document>) -> Self {
        Self::ok(Value::Object(document.unwrap_or_default()))
    }

    /// Every stored item.
    pub fn items(documents: Vec<Document>) -> Self {
        Self::ok(Value::Array(
            documents.into_iter().map(Value::Object).collect(),
        ))
    }

    /// Error response under `policy`, carrying only the client-safe message.
    pub fn error(err: &ApiError, policy: ErrorPolicy) -> Self {
        Self {
            status: err.status_code(policy),
            body: Value::String(err.client_message()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
