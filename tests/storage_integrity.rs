//! Storage Integrity Invariant Tests
//!
//! Tests for invariants:
//! - Data corruption is never ignored: a damaged file refuses to open
//! - Checksums on every record
//! - Append-only: overwrites and deletes add records, never rewrite them
//! - Replay rebuilds exactly the state that was acknowledged
//! - Compaction preserves state

use std::fs;
use std::path::Path;

use itemstore::item::{Document, ItemId};
use itemstore::storage::{
    FileStore, ItemRecord, ItemStore, RecordKind, RecordReader, StorageError,
};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn id(s: &str) -> ItemId {
    ItemId::parse(s).unwrap()
}

fn doc(id: &str, price: &str) -> Document {
    serde_json::from_str(&format!(
        r#"{{"id": "{}", "name": "item {}", "price": {}}}"#,
        id, id, price
    ))
    .unwrap()
}

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn write_items(data_dir: &Path, items: &[(&str, &str)]) {
    let store = FileStore::open(data_dir).unwrap();
    for (key, price) in items {
        store.put(&id(key), doc(key, price)).unwrap();
    }
}

fn open_err(data_dir: &Path) -> StorageError {
    match FileStore::open(data_dir) {
        Ok(_) => panic!("store must refuse to open a damaged file"),
        Err(err) => err,
    }
}

// =============================================================================
// Corruption Is Never Ignored
// =============================================================================

/// A flipped byte anywhere in a record makes open fail.
#[test]
fn test_corruption_causes_explicit_failure() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    write_items(data_dir, &[("a", "1")]);

    let path = FileStore::record_path(data_dir);
    let mut contents = fs::read(&path).unwrap();
    let mid = contents.len() / 2;
    contents[mid] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let err = open_err(data_dir);
    assert!(err.is_fatal());
    assert_eq!(err.code(), "STORAGE_DATA_CORRUPTION");
    assert!(
        err.to_string().to_lowercase().contains("checksum"),
        "error should mention checksum, got: {}",
        err
    );
}

/// Corruption in a later record is reported at that record's offset.
#[test]
fn test_corruption_offset_is_reported() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    write_items(data_dir, &[("a", "1")]);
    let first_record_len = fs::metadata(FileStore::record_path(data_dir)).unwrap().len();
    write_items(data_dir, &[("b", "2")]);

    let path = FileStore::record_path(data_dir);
    let mut contents = fs::read(&path).unwrap();
    let last = contents.len() - 1;
    contents[last] ^= 0x01;
    fs::write(&path, contents).unwrap();

    match open_err(data_dir) {
        StorageError::Corruption { offset, .. } => assert_eq!(offset, first_record_len),
        other => panic!("expected corruption, got {:?}", other),
    }
}

/// A torn tail (partial last record) is corruption, not silently dropped.
#[test]
fn test_truncated_tail_refuses_to_open() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    write_items(data_dir, &[("a", "1"), ("b", "2")]);

    let path = FileStore::record_path(data_dir);
    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..contents.len() - 5]).unwrap();

    assert!(open_err(data_dir).is_fatal());
}

/// Trailing garbage shorter than a record header is corruption.
#[test]
fn test_trailing_garbage_refuses_to_open() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    write_items(data_dir, &[("a", "1")]);

    let path = FileStore::record_path(data_dir);
    let mut contents = fs::read(&path).unwrap();
    contents.extend_from_slice(&[0xAB, 0xCD, 0xEF]);
    fs::write(&path, contents).unwrap();

    assert!(open_err(data_dir).is_fatal());
}

// =============================================================================
// Checksums On Every Record
// =============================================================================

#[test]
fn test_checksum_included_in_serialization() {
    let record = ItemRecord::put(&id("a"), &doc("a", "1")).unwrap();
    let bytes = record.serialize();

    let (decoded, consumed) = ItemRecord::deserialize(&bytes).unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, record);
}

#[test]
fn test_corrupted_checksum_bytes_detected() {
    let record = ItemRecord::tombstone(&id("a"));
    let mut bytes = record.serialize();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(ItemRecord::deserialize(&bytes).is_err());
}

// =============================================================================
// Append-Only
// =============================================================================

#[test]
fn test_append_only_preserves_all_versions() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    {
        let store = FileStore::open(data_dir).unwrap();
        store.put(&id("a"), doc("a", "1")).unwrap();
        store.put(&id("a"), doc("a", "2")).unwrap();
        store.delete(&id("a")).unwrap();
        store.put(&id("a"), doc("a", "3")).unwrap();
    }

    let records = RecordReader::open(&FileStore::record_path(data_dir))
        .unwrap()
        .read_all()
        .unwrap();
    let kinds: Vec<RecordKind> = records.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RecordKind::Put,
            RecordKind::Put,
            RecordKind::Tombstone,
            RecordKind::Put
        ]
    );
    assert!(records.iter().all(|r| r.item_id == "a"));

    let store = FileStore::open(data_dir).unwrap();
    assert_eq!(store.get(&id("a")).unwrap().unwrap(), doc("a", "3"));
}

#[test]
fn test_file_grows_monotonically() {
    let temp_dir = create_temp_data_dir();
    let store = FileStore::open(temp_dir.path()).unwrap();

    let mut last = store.file_size().unwrap();
    for price in 1..=5 {
        store.put(&id("a"), doc("a", &price.to_string())).unwrap();
        let size = store.file_size().unwrap();
        assert!(size > last);
        last = size;
    }
    store.delete(&id("a")).unwrap();
    assert!(store.file_size().unwrap() > last);
}

// =============================================================================
// Replay
// =============================================================================

#[test]
fn test_replay_rebuilds_acknowledged_state() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    {
        let store = FileStore::open(data_dir).unwrap();
        store.put(&id("a"), doc("a", "19.99")).unwrap();
        store.put(&id("b"), doc("b", "100")).unwrap();
        store.put(&id("c"), doc("c", "3")).unwrap();
        store.delete(&id("c")).unwrap();
        store.put(&id("b"), doc("b", "101")).unwrap();
    }

    let store = FileStore::open(data_dir).unwrap();
    assert_eq!(store.len().unwrap(), 2);
    assert_eq!(store.get(&id("a")).unwrap().unwrap()["price"].to_string(), "19.99");
    assert_eq!(store.get(&id("b")).unwrap().unwrap()["price"].to_string(), "101");
    assert!(store.get(&id("c")).unwrap().is_none());
}

#[test]
fn test_reopen_twice_is_stable() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    write_items(data_dir, &[("a", "1"), ("b", "2")]);

    let first = FileStore::open(data_dir).unwrap().len().unwrap();
    let second = FileStore::open(data_dir).unwrap().len().unwrap();
    assert_eq!(first, 2);
    assert_eq!(first, second);
}

// =============================================================================
// Compaction
// =============================================================================

#[test]
fn test_compaction_preserves_state() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    let store = FileStore::open(data_dir).unwrap();
    for n in 0..10 {
        store.put(&id("hot"), doc("hot", &n.to_string())).unwrap();
    }
    store.put(&id("cold"), doc("cold", "0.5")).unwrap();
    store.put(&id("gone"), doc("gone", "1")).unwrap();
    store.delete(&id("gone")).unwrap();

    let mut before = store.list().unwrap();
    let report = store.compact().unwrap();
    let mut after = store.list().unwrap();
    before.sort_by_key(|d| d["id"].as_str().unwrap().to_string());
    after.sort_by_key(|d| d["id"].as_str().unwrap().to_string());

    assert_eq!(before, after);
    assert_eq!(report.items, 2);
    assert!(report.bytes_after < report.bytes_before);

    let records = RecordReader::open(&FileStore::record_path(data_dir))
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.kind == RecordKind::Put));
    drop(store);

    let reopened = FileStore::open(data_dir).unwrap();
    assert_eq!(reopened.get(&id("hot")).unwrap().unwrap(), doc("hot", "9"));
    assert_eq!(reopened.get(&id("cold")).unwrap().unwrap(), doc("cold", "0.5"));
    assert!(reopened.get(&id("gone")).unwrap().is_none());
}

#[test]
fn test_compaction_of_empty_store() {
    let temp_dir = create_temp_data_dir();
    let store = FileStore::open(temp_dir.path()).unwrap();

    let report = store.compact().unwrap();
    assert_eq!(report.items, 0);
    assert_eq!(report.bytes_after, 0);
    assert!(store.is_empty().unwrap());
}
