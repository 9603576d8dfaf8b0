//! Sequential record reader
//!
//! Used when a [`FileStore`](super::FileStore) opens and rebuilds its index.
//! Every record's checksum is verified; any failure, including a truncated
//! tail, is reported as corruption at the record's byte offset.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::{ItemRecord, MIN_RECORD_SIZE};
use crate::item::Document;

/// Forward-only reader over an item record file.
pub struct RecordReader {
    path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl RecordReader {
    /// Opens the record file for reading.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = File::open(path).map_err(|e| {
            StorageError::io(format!("Failed to open record file: {}", path.display()), e)
        })?;
        let file_size = file
            .metadata()
            .map_err(|e| StorageError::io("Failed to read record file metadata", e))?
            .len();

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset of the next record.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next record, or `None` at end of file.
    pub fn read_next(&mut self) -> StorageResult<Option<ItemRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let offset = self.current_offset;
        let remaining = self.file_size - offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(StorageError::corruption(
                offset,
                format!(
                    "Truncated record file: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption(offset, format!("Failed to read record length: {}", e))
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 {
            return Err(StorageError::corruption(
                offset,
                format!("Invalid record length: {}", record_length),
            ));
        }
        if record_length > remaining {
            return Err(StorageError::corruption(
                offset,
                format!(
                    "Record length {} exceeds remaining file size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StorageError::corruption(offset, format!("Failed to read record body: {}", e))
        })?;

        let (record, consumed) = ItemRecord::deserialize(&record_buf)
            .map_err(|e| StorageError::corruption(offset, e.to_string()))?;
        self.current_offset += consumed as u64;

        Ok(Some(record))
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> StorageResult<Vec<ItemRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Replays the file into the latest live document per item id.
    ///
    /// Later records win over earlier ones; a tombstone removes the id.
    pub fn replay(&mut self) -> StorageResult<HashMap<String, Document>> {
        let mut live = HashMap::new();
        loop {
            let offset = self.current_offset;
            let Some(record) = self.read_next()? else {
                break;
            };
            match record.document() {
                Ok(Some(document)) => {
                    live.insert(record.item_id, document);
                }
                Ok(None) => {
                    live.remove(&record.item_id);
                }
                Err(e) => {
                    return Err(StorageError::corruption(
                        offset,
                        format!("Undecodable document for '{}': {}", record.item_id, e),
                    ))
                }
            }
        }
        Ok(live)
    }
}
