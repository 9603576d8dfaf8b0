//! API handler
//!
//! Executes an [`Operation`] against the shared store and turns the result
//! into exactly one [`ApiResponse`]. Store calls run on the blocking pool,
//! bounded by the request timeout.
//!
//! A call that has not started by the deadline is skipped. A call that is
//! already running when the deadline passes cannot be cancelled: the client
//! gets the timeout fault, and a Put or Delete may still take effect
//! afterwards.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use super::errors::{ApiError, ApiResult, ErrorPolicy};
use super::request::Operation;
use super::response::ApiResponse;
use crate::storage::{ItemStore, StorageError, StorageResult};

/// Default bound on a single store call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// Executes operations against an injected store.
#[derive(Clone)]
pub struct ApiHandler {
    store: Arc<dyn ItemStore>,
    policy: ErrorPolicy,
    timeout: Duration,
}

impl ApiHandler {
    pub fn new(store: Arc<dyn ItemStore>, policy: ErrorPolicy, timeout: Duration) -> Self {
        Self {
            store,
            policy,
            timeout,
        }
    }

    /// Handle a parsed operation, or the error parsing produced.
    pub async fn handle(&self, operation: ApiResult<Operation>) -> ApiResponse {
        let result = match operation {
            Ok(operation) => self.execute(operation).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(response) => response,
            Err(err) => self.reject(&err),
        }
    }

    /// Execute one operation.
    ///
    /// Flow:
    /// 1. Run the store call on the blocking pool
    /// 2. Apply the error policy to a missing Get
    /// 3. Build the success body
    pub async fn execute(&self, operation: Operation) -> ApiResult<ApiResponse> {
        debug!(operation = operation.name(), id = ?operation.item_id().map(|id| id.as_str()), "executing");

        match operation {
            Operation::Put(item) => {
                let id = item.id().clone();
                let key = id.clone();
                self.run(move |store| store.put(&key, item.into_document()))
                    .await?;
                Ok(ApiResponse::put(&id))
            }
            Operation::List => {
                let documents = self.run(|store| store.list()).await?;
                Ok(ApiResponse::items(documents))
            }
            Operation::Get(id) => {
                let key = id.clone();
                let document = self.run(move |store| store.get(&key)).await?;
                match document {
                    None if self.policy.reports_not_found() => Err(ApiError::NotFound(id)),
                    document => Ok(ApiResponse::item(document)),
                }
            }
            Operation::Delete(id) => {
                let key = id.clone();
                self.run(move |store| store.delete(&key)).await?;
                Ok(ApiResponse::deleted(&id))
            }
        }
    }

    /// Log `err` and build its response under this handler's policy.
    pub fn reject(&self, err: &ApiError) -> ApiResponse {
        if err.is_client_error() {
            debug!(code = err.code(), error = %err, "request rejected");
        } else {
            error!(code = err.code(), error = %err, "request failed");
        }
        ApiResponse::error(err, self.policy)
    }

    async fn run<T, F>(&self, call: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ItemStore) -> StorageResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;
        let task = tokio::task::spawn_blocking(move || {
            if Instant::now() >= deadline {
                return Err(StorageError::Timeout(timeout));
            }
            call(store.as_ref())
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join_err)) => Err(ApiError::Internal(format!(
                "store task failed: {}",
                join_err
            ))),
            Err(_) => Err(StorageError::Timeout(timeout).into()),
        }
    }
}
