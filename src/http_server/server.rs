//! # HTTP Server
//!
//! Wires the injected store into the item router and serves it until a
//! shutdown signal arrives.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

use super::config::HttpServerConfig;
use super::item_routes::item_routes;
use crate::api::ApiHandler;
use crate::observability::Event;
use crate::storage::ItemStore;

/// HTTP server for the item API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self::with_config(store, HttpServerConfig::default())
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(store: Arc<dyn ItemStore>, config: HttpServerConfig) -> Self {
        let router = Self::build_router(store, &config);
        Self { config, router }
    }

    /// Build the item router with request tracing
    fn build_router(store: Arc<dyn ItemStore>, config: &HttpServerConfig) -> Router {
        let handler = ApiHandler::new(store, config.error_policy, config.request_timeout());

        item_routes(handler).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(request_span)),
        )
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// In-flight requests are allowed to finish before this returns.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(
            event = Event::Serving.as_str(),
            addr = %addr,
            error_policy = self.config.error_policy.as_str(),
            "listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!(event = Event::ShutdownComplete.as_str());
        Ok(())
    }
}

/// One span per request, tagged with a fresh request id
fn request_span(request: &Request<Body>) -> Span {
    info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path()
    )
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server keeps
/// running until killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!(event = Event::ShutdownStart.as_str());
}
