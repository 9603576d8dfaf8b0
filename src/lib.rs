//! itemstore - A small, durable, self-hostable item store
//!
//! Items are JSON objects keyed by a client-chosen `id`, served over an HTTP
//! CRUD API and persisted in an append-only, checksummed record file.

pub mod api;
pub mod cli;
pub mod http_server;
pub mod item;
pub mod observability;
pub mod storage;
