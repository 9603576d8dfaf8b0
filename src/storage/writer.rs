//! Append-only record writer with fsync enforcement
//!
//! A record is acknowledged only after `write_all` and `sync_all` both
//! succeed. Records are never updated in place; the latest record for an id
//! wins on replay.
//!
//! A failed append truncates the file back to the last acknowledged record,
//! so a torn fragment never sits between two good records. If the truncate
//! itself fails the writer is poisoned and refuses further appends.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::error;

use super::errors::{StorageError, StorageResult};
use super::record::ItemRecord;

/// Appends records to an item record file.
pub struct RecordWriter {
    path: PathBuf,
    file: File,
    current_offset: u64,
    poisoned: bool,
}

impl RecordWriter {
    /// Opens or creates the record file at `path` for appending.
    ///
    /// The parent directory must already exist.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                StorageError::io(format!("Failed to open record file: {}", path.display()), e)
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::io("Failed to read record file metadata", e))?
            .len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            current_offset,
            poisoned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset the next record will be written at.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Points the writer at a new path after its file has been renamed.
    pub(super) fn relocate(&mut self, path: PathBuf) {
        self.path = path;
    }

    /// Appends one record and fsyncs. Returns the record's offset.
    ///
    /// On failure nothing of the record remains in the file.
    pub fn append(&mut self, record: &ItemRecord) -> StorageResult<u64> {
        if self.poisoned {
            return Err(StorageError::io(
                format!(
                    "Record file {} has an unremovable torn tail",
                    self.path.display()
                ),
                io::Error::new(io::ErrorKind::Other, "writer poisoned"),
            ));
        }

        let bytes = record.serialize();
        let offset = self.current_offset;

        if let Err(err) = self.write_synced(&bytes, &record.item_id) {
            self.discard_tail();
            return Err(err);
        }

        self.current_offset += bytes.len() as u64;
        Ok(offset)
    }

    fn write_synced(&mut self, bytes: &[u8], item_id: &str) -> StorageResult<()> {
        self.file.write_all(bytes).map_err(|e| {
            StorageError::io(format!("Failed to write record for '{}'", item_id), e)
        })?;
        self.file.sync_all().map_err(|e| {
            StorageError::io(format!("fsync failed after record for '{}'", item_id), e)
        })
    }

    /// Truncates anything past the last acknowledged record.
    fn discard_tail(&mut self) {
        let result = self
            .file
            .set_len(self.current_offset)
            .and_then(|()| self.file.sync_all());

        if let Err(e) = result {
            error!(
                path = %self.path.display(),
                offset = self.current_offset,
                error = %e,
                "failed to discard torn record, writer poisoned"
            );
            self.poisoned = true;
        }
    }
}
