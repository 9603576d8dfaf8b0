//! Item storage subsystem
//!
//! The [`ItemStore`] trait is the persistence contract the HTTP layer is
//! written against. Two implementations exist:
//!
//! - [`FileStore`]: durable, append-only record file with an in-memory index
//! - [`MemoryStore`]: volatile, for tests and throwaway instances
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates), checksum on every record
//! - fsync before a write is acknowledged
//! - Latest record wins for the same item id; tombstones delete
//! - Each single-key mutation is atomic with respect to all other operations
//! - A missing item is `Ok(None)`, never an error
//! - Documents are stored as exact JSON: numbers keep their literal form and
//!   fields keep their order

mod checksum;
mod errors;
mod file_store;
mod memory;
mod reader;
mod record;
mod writer;

pub use checksum::compute_checksum;
pub use errors::{StorageError, StorageResult};
pub use file_store::{CompactionReport, FileStore, DATA_SUBDIR, RECORD_FILE};
pub use memory::MemoryStore;
pub use reader::RecordReader;
pub use record::{ItemRecord, RecordKind};
pub use writer::RecordWriter;

use crate::item::{Document, ItemId};

/// Key-value persistence for item documents.
///
/// Implementations must be safe to share across request handlers; every
/// method is a complete, atomic operation on its own.
pub trait ItemStore: Send + Sync {
    /// Insert or replace the document stored under `id`. Last writer wins.
    fn put(&self, id: &ItemId, document: Document) -> StorageResult<()>;

    /// The document stored under `id`, or `None` if there is none.
    fn get(&self, id: &ItemId) -> StorageResult<Option<Document>>;

    /// Every stored document, in no particular order.
    fn list(&self) -> StorageResult<Vec<Document>>;

    /// Remove the document stored under `id`. Removing a missing id succeeds.
    fn delete(&self, id: &ItemId) -> StorageResult<()>;

    /// Number of stored items.
    fn len(&self) -> StorageResult<usize>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
