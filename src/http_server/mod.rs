//! # itemstore HTTP Server Module
//!
//! Serves the item API over axum. The store is constructed by the caller and
//! injected; this module holds no global state.
//!
//! # Endpoints
//!
//! - `PUT /items` - Create or replace an item
//! - `GET /items` - List all items
//! - `GET /items/{id}` - Read one item
//! - `DELETE /items/{id}` - Delete one item

pub mod config;
pub mod item_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use item_routes::item_routes;
pub use server::HttpServer;
