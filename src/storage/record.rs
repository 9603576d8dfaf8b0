//! Item record format
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, whole record including this field)
//! +------------------+
//! | Record Kind      | (u8: 0 = put, 1 = tombstone)
//! +------------------+
//! | Item ID          | (length-prefixed UTF-8)
//! +------------------+
//! | Document         | (length-prefixed JSON bytes, empty for tombstones)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! The checksum covers every byte before it.

use std::io::{self, Cursor, Read};

use super::checksum::compute_checksum;
use super::errors::StorageResult;
use crate::item::{Document, ItemId};

/// Smallest possible record: length + kind + two empty length-prefixed
/// fields + checksum.
pub const MIN_RECORD_SIZE: usize = 4 + 1 + 4 + 4 + 4;

/// Kind of mutation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Full replacement of the item's document.
    Put = 0,
    /// Deletion of the item.
    Tombstone = 1,
}

impl RecordKind {
    fn from_byte(b: u8) -> io::Result<Self> {
        match b {
            0 => Ok(RecordKind::Put),
            1 => Ok(RecordKind::Tombstone),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unknown record kind: {}", other),
            )),
        }
    }
}

/// One mutation as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub kind: RecordKind,
    pub item_id: String,
    /// Serialized document; empty for tombstones.
    pub body: Vec<u8>,
}

impl ItemRecord {
    /// Record replacing `id` with `document`.
    pub fn put(id: &ItemId, document: &Document) -> StorageResult<Self> {
        Ok(Self {
            kind: RecordKind::Put,
            item_id: id.as_str().to_string(),
            body: serde_json::to_vec(document)?,
        })
    }

    /// Record deleting `id`.
    pub fn tombstone(id: &ItemId) -> Self {
        Self {
            kind: RecordKind::Tombstone,
            item_id: id.as_str().to_string(),
            body: Vec::new(),
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.kind == RecordKind::Tombstone
    }

    /// Decode the stored document. Tombstones have none.
    pub fn document(&self) -> StorageResult<Option<Document>> {
        match self.kind {
            RecordKind::Tombstone => Ok(None),
            RecordKind::Put => Ok(Some(serde_json::from_slice(&self.body)?)),
        }
    }

    /// Serialize to bytes, including length prefix and checksum.
    pub fn serialize(&self) -> Vec<u8> {
        let record_length = (MIN_RECORD_SIZE + self.item_id.len() + self.body.len()) as u32;

        let mut buf = Vec::with_capacity(record_length as usize);
        buf.extend_from_slice(&record_length.to_le_bytes());
        buf.push(self.kind as u8);
        buf.extend_from_slice(&(self.item_id.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.item_id.as_bytes());
        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.body);

        let checksum = compute_checksum(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Deserialize one record from the front of `data`, verifying its
    /// checksum. Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }
        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed = compute_checksum(&data[..checksum_offset]);
        if computed != stored {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed, stored
                ),
            ));
        }

        let mut cursor = Cursor::new(&data[4..checksum_offset]);

        let mut kind = [0u8; 1];
        cursor.read_exact(&mut kind)?;
        let kind = RecordKind::from_byte(kind[0])?;

        let item_id = String::from_utf8(read_prefixed(&mut cursor)?).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
        })?;
        let body = read_prefixed(&mut cursor)?;

        if cursor.position() as usize != checksum_offset - 4 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Record length does not match its fields",
            ));
        }

        Ok((
            Self {
                kind,
                item_id,
                body,
            },
            record_length,
        ))
    }
}

fn read_prefixed<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        serde_json::from_str(r#"{"id": "item-1", "name": "Widget", "price": 19.99}"#).unwrap()
    }

    fn sample_id() -> ItemId {
        ItemId::parse("item-1").unwrap()
    }

    #[test]
    fn test_put_record_roundtrip() {
        let record = ItemRecord::put(&sample_id(), &sample_document()).unwrap();
        let bytes = record.serialize();
        let (decoded, consumed) = ItemRecord::deserialize(&bytes).unwrap();

        assert_eq!(decoded, record);
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.document().unwrap().unwrap(), sample_document());
    }

    #[test]
    fn test_tombstone_has_no_document() {
        let record = ItemRecord::tombstone(&sample_id());
        let bytes = record.serialize();
        let (decoded, _) = ItemRecord::deserialize(&bytes).unwrap();

        assert!(decoded.is_tombstone());
        assert!(decoded.body.is_empty());
        assert!(decoded.document().unwrap().is_none());
    }

    #[test]
    fn test_price_bytes_are_exact() {
        let record = ItemRecord::put(&sample_id(), &sample_document()).unwrap();
        let body = String::from_utf8(record.body).unwrap();
        assert!(body.contains(r#""price":19.99"#));
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut bytes = ItemRecord::put(&sample_id(), &sample_document())
            .unwrap()
            .serialize();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;

        let err = ItemRecord::deserialize(&bytes).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let bytes = ItemRecord::tombstone(&sample_id()).serialize();
        let err = ItemRecord::deserialize(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_consumes_only_one_record() {
        let mut bytes = ItemRecord::tombstone(&sample_id()).serialize();
        let first_len = bytes.len();
        bytes.extend(ItemRecord::put(&sample_id(), &sample_document()).unwrap().serialize());

        let (first, consumed) = ItemRecord::deserialize(&bytes).unwrap();
        assert!(first.is_tombstone());
        assert_eq!(consumed, first_len);
    }
}
