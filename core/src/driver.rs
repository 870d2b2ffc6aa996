//! The storage capability consumed by the executor.

use crate::{Item, Value};
use thiserror::Error;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors raised at the lookup boundary. The executor propagates them verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriverError {
    #[error("Object not found: {id}")]
    NotFound { id: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Corrupt record for key {key}: {message}")]
    Corrupt { key: String, message: String },
}

impl DriverError {
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn corrupt(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Object and association lookup over a graph-shaped store.
///
/// Implementations must be reentrant if they are shared by concurrent queries.
pub trait Driver {
    /// Resolve identifiers to full records, in the order given.
    /// Every returned item carries `:id`.
    fn object_lookup(&self, ids: &[Value]) -> DriverResult<Vec<Item>>;

    /// Edges of one association type leaving one source identifier.
    ///
    /// Each edge is `{":id": destination, ":time": t, "data": payload}`;
    /// edges are ordered by strictly descending time and scoped to exactly
    /// this `(assoc, id)` pair.
    fn association_lookup(&self, assoc: &str, id: &Value) -> DriverResult<Vec<Item>>;
}

impl<D: Driver + ?Sized> Driver for &D {
    fn object_lookup(&self, ids: &[Value]) -> DriverResult<Vec<Item>> {
        (**self).object_lookup(ids)
    }

    fn association_lookup(&self, assoc: &str, id: &Value) -> DriverResult<Vec<Item>> {
        (**self).association_lookup(assoc, id)
    }
}

/// Build an edge item in the shape drivers are expected to return.
pub fn edge(destination: impl Into<Value>, time: i64, data: impl Into<Value>) -> Item {
    let mut item = Item::with_id(destination);
    item.set(crate::TIME_FIELD, time);
    item.set(crate::DATA_FIELD, data);
    item
}
