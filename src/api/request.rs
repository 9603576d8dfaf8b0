//! API request types
//!
//! A request is reduced to one [`Operation`] before anything touches the
//! store. Parsing never depends on the store's state.

use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use crate::item::{Item, ItemId, ID_FIELD};

/// One store operation, fully validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Put(Item),
    List,
    Get(ItemId),
    Delete(ItemId),
}

impl Operation {
    /// Parse a PUT body into a [`Operation::Put`].
    ///
    /// The body must be a JSON object with `id`, `name` and `price`; any other
    /// fields are kept.
    pub fn put(body: &[u8]) -> ApiResult<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidBody)?;
        Ok(Operation::Put(Item::from_value(value)?))
    }

    /// A [`Operation::Get`] for an already decoded path parameter.
    pub fn get(raw_id: &str) -> ApiResult<Self> {
        Ok(Operation::Get(path_id(raw_id)?))
    }

    /// A [`Operation::Delete`] for an already decoded path parameter.
    pub fn delete(raw_id: &str) -> ApiResult<Self> {
        Ok(Operation::Delete(path_id(raw_id)?))
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Put(_) => "put",
            Operation::List => "list",
            Operation::Get(_) => "get",
            Operation::Delete(_) => "delete",
        }
    }

    /// The item id this operation targets, if any.
    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            Operation::Put(item) => Some(item.id()),
            Operation::List => None,
            Operation::Get(id) | Operation::Delete(id) => Some(id),
        }
    }
}

fn path_id(raw_id: &str) -> ApiResult<ItemId> {
    ItemId::parse(raw_id).map_err(|_| ApiError::MissingParam(ID_FIELD))
}
