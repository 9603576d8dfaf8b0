//! API layer for itemstore
//!
//! Turns HTTP-shaped input into a typed [`Operation`], runs it against an
//! injected [`ItemStore`](crate::storage::ItemStore) and produces exactly one
//! [`ApiResponse`].
//!
//! # Supported Operations
//!
//! - put
//! - list
//! - get
//! - delete

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiResult, ErrorPolicy, INTERNAL_ERROR_MESSAGE};
pub use handler::{ApiHandler, DEFAULT_REQUEST_TIMEOUT};
pub use request::Operation;
pub use response::ApiResponse;
