//! Volatile item store

use std::collections::HashMap;
use std::sync::RwLock;

use super::errors::StorageResult;
use super::ItemStore;
use crate::item::{Document, ItemId};

/// In-memory [`ItemStore`]. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemStore for MemoryStore {
    fn put(&self, id: &ItemId, document: Document) -> StorageResult<()> {
        self.items
            .write()?
            .insert(id.as_str().to_string(), document);
        Ok(())
    }

    fn get(&self, id: &ItemId) -> StorageResult<Option<Document>> {
        Ok(self.items.read()?.get(id.as_str()).cloned())
    }

    fn list(&self) -> StorageResult<Vec<Document>> {
        Ok(self.items.read()?.values().cloned().collect())
    }

    fn delete(&self, id: &ItemId) -> StorageResult<()> {
        self.items.write()?.remove(id.as_str());
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.items.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> Document {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_put_get_delete() {
        let store = MemoryStore::new();
        let id = ItemId::parse("a").unwrap();

        assert!(store.get(&id).unwrap().is_none());
        store.put(&id, doc(r#"{"id": "a", "price": 1}"#)).unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap()["price"].to_string(), "1");

        store.delete(&id).unwrap();
        assert!(store.get(&id).unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete(&ItemId::parse("nope").unwrap()).is_ok());
    }
}
