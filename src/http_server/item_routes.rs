//! Item HTTP Routes
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | PUT | /items | put |
//! | GET | /items | list |
//! | GET | /items/{id} | get |
//! | DELETE | /items/{id} | delete |
//!
//! Any other method or path is answered with `Unsupported route`, including
//! HEAD, which axum would otherwise route to the GET handler. Bodies are
//! read as raw bytes so that a missing or wrong `Content-Type` is treated
//! like any other malformed body.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::{Method, Uri},
    routing::{get, put},
    Router,
};

use crate::api::{ApiError, ApiHandler, ApiResponse, ApiResult, Operation};
use crate::item::ID_FIELD;

/// Router for the item API, with the handler as shared state
pub fn item_routes(handler: ApiHandler) -> Router {
    Router::new()
        .route(
            "/items",
            put(put_item)
                .get(list_items)
                .head(unsupported_route)
                .fallback(unsupported_route),
        )
        .route(
            "/items/",
            get(missing_id)
                .delete(missing_id)
                .head(unsupported_route)
                .fallback(unsupported_route),
        )
        .route(
            "/items/:id",
            get(get_item)
                .delete(delete_item)
                .head(unsupported_route)
                .fallback(unsupported_route),
        )
        .fallback(unsupported_route)
        .with_state(handler)
}

// ==================
// Handlers
// ==================

/// PUT /items
async fn put_item(
    State(handler): State<ApiHandler>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResponse {
    let operation = body
        .map_err(|_| ApiError::InvalidBody)
        .and_then(|bytes| Operation::put(&bytes));
    handler.handle(operation).await
}

/// GET /items
async fn list_items(State(handler): State<ApiHandler>) -> ApiResponse {
    handler.handle(Ok(Operation::List)).await
}

/// GET /items/{id}
async fn get_item(
    State(handler): State<ApiHandler>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResponse {
    let operation = path_id(id).and_then(|id| Operation::get(&id));
    handler.handle(operation).await
}

/// DELETE /items/{id}
async fn delete_item(
    State(handler): State<ApiHandler>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResponse {
    let operation = path_id(id).and_then(|id| Operation::delete(&id));
    handler.handle(operation).await
}

/// GET or DELETE /items/ with an empty id segment
async fn missing_id(State(handler): State<ApiHandler>) -> ApiResponse {
    handler.handle(Err(ApiError::MissingParam(ID_FIELD))).await
}

async fn unsupported_route(
    State(handler): State<ApiHandler>,
    method: Method,
    uri: Uri,
) -> ApiResponse {
    handler
        .handle(Err(ApiError::UnsupportedRoute {
            method: method.to_string(),
            path: uri.path().to_string(),
        }))
        .await
}

/// Percent-decoded id, or a client error if the segment does not decode.
fn path_id(id: Result<Path<String>, PathRejection>) -> ApiResult<String> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => Err(ApiError::InvalidField {
            field: ID_FIELD,
            reason: rejection.body_text(),
        }),
    }
}
