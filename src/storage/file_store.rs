//! Durable item store
//!
//! Layout: `<data_dir>/data/items.dat`, an append-only file of
//! [`ItemRecord`]s. On open the file is replayed into an in-memory map of
//! live documents; reads are served from that map, writes append a record,
//! fsync, then update the map.
//!
//! A single `RwLock` guards both the writer and the map. Put and Delete hold
//! the write lock across append, fsync and index update, so a reader never
//! observes a document that is not durable, and two writers to the same id
//! cannot interleave.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info};

use super::errors::{StorageError, StorageResult};
use super::reader::RecordReader;
use super::record::{ItemRecord, RecordKind};
use super::writer::RecordWriter;
use super::ItemStore;
use crate::item::{Document, ItemId};

/// Subdirectory of the data directory that holds the record file.
pub const DATA_SUBDIR: &str = "data";

/// Name of the record file.
pub const RECORD_FILE: &str = "items.dat";

const COMPACT_SUFFIX: &str = "compact";

/// Outcome of [`FileStore::compact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionReport {
    /// Live items written to the compacted file.
    pub items: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

struct FileState {
    writer: RecordWriter,
    items: HashMap<String, Document>,
}

/// Append-only, fsynced [`ItemStore`].
pub struct FileStore {
    path: PathBuf,
    state: RwLock<FileState>,
}

impl FileStore {
    /// Path of the record file under `data_dir`.
    pub fn record_path(data_dir: &Path) -> PathBuf {
        data_dir.join(DATA_SUBDIR).join(RECORD_FILE)
    }

    /// Opens the store in `data_dir`, creating the layout if needed and
    /// replaying existing records.
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::Corruption`] if any record is damaged.
    /// Serving from a partially readable file is never attempted.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let data_subdir = data_dir.join(DATA_SUBDIR);
        fs::create_dir_all(&data_subdir).map_err(|e| {
            StorageError::io(
                format!("Failed to create data directory: {}", data_subdir.display()),
                e,
            )
        })?;

        let path = Self::record_path(data_dir);
        let items = if path.exists() {
            RecordReader::open(&path)?.replay()?
        } else {
            HashMap::new()
        };
        let writer = RecordWriter::open(&path)?;

        info!(
            path = %path.display(),
            items = items.len(),
            bytes = writer.current_offset(),
            "record file replayed"
        );

        Ok(Self {
            path,
            state: RwLock::new(FileState { writer, items }),
        })
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the record file in bytes.
    pub fn file_size(&self) -> StorageResult<u64> {
        Ok(self.state.read()?.writer.current_offset())
    }

    /// Rewrites the record file so it holds exactly one put record per live
    /// item, dropping overwritten versions and tombstones.
    ///
    /// The compacted file is written and fsynced beside the original, then
    /// renamed over it. The write lock is held throughout, so no mutation
    /// can be lost between the snapshot and the swap.
    pub fn compact(&self) -> StorageResult<CompactionReport> {
        let mut state = self.state.write()?;
        let bytes_before = state.writer.current_offset();
        let tmp_path = self.path.with_extension(format!("dat.{}", COMPACT_SUFFIX));

        let mut ids: Vec<&String> = state.items.keys().collect();
        ids.sort();

        {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)
                .map_err(|e| {
                    StorageError::io(
                        format!("Failed to create compaction file: {}", tmp_path.display()),
                        e,
                    )
                })?;
            let mut out = BufWriter::new(file);

            for id in &ids {
                let record = ItemRecord {
                    kind: RecordKind::Put,
                    item_id: (*id).clone(),
                    body: serde_json::to_vec(&state.items[*id])?,
                };
                out.write_all(&record.serialize())
                    .map_err(|e| StorageError::io("Failed to write compaction file", e))?;
            }

            let file = out
                .into_inner()
                .map_err(|e| StorageError::io("Failed to flush compaction file", e.into_error()))?;
            file.sync_all()
                .map_err(|e| StorageError::io("fsync failed on compaction file", e))?;
        }

        // Open the new writer before the swap: if this fails the original
        // file and writer are still in place.
        let mut writer = RecordWriter::open(&tmp_path)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            StorageError::io(
                format!("Failed to replace record file: {}", self.path.display()),
                e,
            )
        })?;
        writer.relocate(self.path.clone());
        sync_parent_dir(&self.path);

        let report = CompactionReport {
            items: ids.len(),
            bytes_before,
            bytes_after: writer.current_offset(),
        };
        state.writer = writer;

        debug!(
            items = report.items,
            bytes_before = report.bytes_before,
            bytes_after = report.bytes_after,
            "record file compacted"
        );
        Ok(report)
    }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(dir) = path.parent() {
        if let Ok(handle) = fs::File::open(dir) {
            let _ = handle.sync_all();
        }
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

impl ItemStore for FileStore {
    fn put(&self, id: &ItemId, document: Document) -> StorageResult<()> {
        let record = ItemRecord::put(id, &document)?;
        let mut state = self.state.write()?;
        state.writer.append(&record)?;
        state.items.insert(record.item_id, document);
        Ok(())
    }

    fn get(&self, id: &ItemId) -> StorageResult<Option<Document>> {
        Ok(self.state.read()?.items.get(id.as_str()).cloned())
    }

    fn list(&self) -> StorageResult<Vec<Document>> {
        Ok(self.state.read()?.items.values().cloned().collect())
    }

    fn delete(&self, id: &ItemId) -> StorageResult<()> {
        let mut state = self.state.write()?;
        if !state.items.contains_key(id.as_str()) {
            return Ok(());
        }
        state.writer.append(&ItemRecord::tombstone(id))?;
        state.items.remove(id.as_str());
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.state.read()?.items.len())
    }
}
