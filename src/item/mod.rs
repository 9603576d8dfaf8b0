//! Item model
//!
//! The store itself is schemaless: it persists an ordered field→value
//! [`Document`] per [`ItemId`]. The canonical item shape
//! (`id`, `name`, `price`) is enforced here, at the HTTP boundary, by
//! [`Item::from_value`].

mod price;

pub use price::{Price, PriceError, MAX_EXPONENT, MAX_SIGNIFICANT_DIGITS, MIN_EXPONENT};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field-value mapping persisted for one item.
///
/// `serde_json` is built with `preserve_order`, so field order is kept
/// exactly as the client sent it.
pub type Document = Map<String, Value>;

/// Name of the primary key field.
pub const ID_FIELD: &str = "id";
/// Name of the display name field.
pub const NAME_FIELD: &str = "name";
/// Name of the price field.
pub const PRICE_FIELD: &str = "price";

/// Validation failures for items and item ids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("Item must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ItemError {
    /// Name of the offending field, if the error is about one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ItemError::NotAnObject => None,
            ItemError::MissingField(field) => Some(field),
            ItemError::InvalidField { field, .. } => Some(field),
        }
    }
}

/// Primary key of an item. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Parse an id, rejecting the empty string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ItemError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ItemError::InvalidField {
                field: ID_FIELD,
                reason: "must be a non-empty string".to_string(),
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemId {
    type Error = ItemError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated item: the canonical fields plus the full document.
///
/// Fields other than `id`, `name` and `price` are carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    name: String,
    price: Price,
    document: Document,
}

impl Item {
    /// Build an item from its canonical fields.
    pub fn new(id: ItemId, name: impl Into<String>, price: Price) -> Self {
        let name = name.into();
        let mut document = Document::new();
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        document.insert(NAME_FIELD.to_string(), Value::String(name.clone()));
        document.insert(PRICE_FIELD.to_string(), price.to_value());
        Self {
            id,
            name,
            price,
            document,
        }
    }

    /// Validate an arbitrary JSON value as an item.
    pub fn from_value(value: Value) -> Result<Self, ItemError> {
        match value {
            Value::Object(document) => Self::from_document(document),
            _ => Err(ItemError::NotAnObject),
        }
    }

    /// Validate a document as an item. Fields are checked in
    /// `id`, `name`, `price` order; the first failure is reported.
    pub fn from_document(document: Document) -> Result<Self, ItemError> {
        let id = match document.get(ID_FIELD) {
            None => return Err(ItemError::MissingField(ID_FIELD)),
            Some(Value::String(s)) => ItemId::parse(s.as_str())?,
            Some(_) => {
                return Err(ItemError::InvalidField {
                    field: ID_FIELD,
                    reason: "must be a non-empty string".to_string(),
                })
            }
        };

        let name = match document.get(NAME_FIELD) {
            None => return Err(ItemError::MissingField(NAME_FIELD)),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(ItemError::InvalidField {
                    field: NAME_FIELD,
                    reason: "must be a string".to_string(),
                })
            }
        };

        let price = match document.get(PRICE_FIELD) {
            None => return Err(ItemError::MissingField(PRICE_FIELD)),
            Some(value) => Price::from_value(value).map_err(|e| ItemError::InvalidField {
                field: PRICE_FIELD,
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            id,
            name,
            price,
            document,
        })
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &Price {
        &self.price
    }

    /// The full document, including any extra fields.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Item, ItemError> {
        Item::from_value(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_valid_item() {
        let item = parse(r#"{"id": "abc", "name": "Widget", "price": 19.99}"#).unwrap();
        assert_eq!(item.id().as_str(), "abc");
        assert_eq!(item.name(), "Widget");
        assert_eq!(item.price().to_string(), "19.99");
    }

    #[test]
    fn test_missing_fields_are_named() {
        let err = parse(r#"{"name": "Widget", "price": 1}"#).unwrap_err();
        assert_eq!(err, ItemError::MissingField("id"));

        let err = parse(r#"{"id": "a", "price": 1}"#).unwrap_err();
        assert_eq!(err, ItemError::MissingField("name"));

        let err = parse(r#"{"id": "a", "name": "Widget"}"#).unwrap_err();
        assert_eq!(err, ItemError::MissingField("price"));
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_invalid_fields_are_named() {
        let err = parse(r#"{"id": "", "name": "w", "price": 1}"#).unwrap_err();
        assert_eq!(err.field(), Some("id"));

        let err = parse(r#"{"id": 7, "name": "w", "price": 1}"#).unwrap_err();
        assert_eq!(err.field(), Some("id"));

        let err = parse(r#"{"id": "a", "name": null, "price": 1}"#).unwrap_err();
        assert_eq!(err.field(), Some("name"));

        let err = parse(r#"{"id": "a", "name": "w", "price": "1"}"#).unwrap_err();
        assert_eq!(err.field(), Some("price"));
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(parse("[1, 2]").unwrap_err(), ItemError::NotAnObject);
        assert_eq!(parse("\"item\"").unwrap_err(), ItemError::NotAnObject);
    }

    #[test]
    fn test_extra_fields_and_order_preserved() {
        let item =
            parse(r#"{"price": 5, "tags": ["a"], "id": "x", "name": "n", "color": "red"}"#)
                .unwrap();
        let keys: Vec<&str> = item.document().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["price", "tags", "id", "name", "color"]);
    }

    #[test]
    fn test_new_builds_canonical_document() {
        let item = Item::new(
            ItemId::parse("k").unwrap(),
            "Thing",
            "100".parse().unwrap(),
        );
        assert_eq!(
            serde_json::to_string(item.document()).unwrap(),
            r#"{"id":"k","name":"Thing","price":100}"#
        );
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(ItemId::parse("").is_err());
        assert_eq!(ItemId::parse("a b").unwrap().as_str(), "a b");
    }
}
