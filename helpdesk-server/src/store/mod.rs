//! Document Store
//!
//! Schemaless, collection-scoped record store consumed through the
//! [`DocumentStore`] trait.
//!
//! - [`MemoryStore`] - process-local, used by tests and `STORE_BACKEND=memory`
//! - [`SqliteStore`] - JSON documents in a single SQLite table
//!
//! Patches follow JSON merge-patch semantics: a `null` value removes the field.

pub mod memory;
pub mod sqlite;

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::utils::AppError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Document body: top-level field name to JSON value
pub type Fields = Map<String, Value>;

/// A stored document with its id
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Fields,
}

impl Record {
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Sort direction for ordered queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("{collection}/{id} does not match the expected state")]
    Conflict { collection: String, id: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(collection: &str, id: &str) -> Self {
        StoreError::Conflict {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(format!("Malformed document: {}", err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => {
                AppError::not_found(format!("{}/{}", collection, id))
            }
            StoreError::Conflict { .. } => AppError::conflict(err.to_string()),
            StoreError::Backend(msg) => AppError::database(msg),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its store-assigned id
    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    /// Insert or replace a document under a caller-chosen id
    async fn put(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// All documents of a collection, in insertion order
    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Record>>;

    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Record>;

    /// Merge `patch` into an existing document
    async fn update_fields(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()>;

    /// Merge `patch` only while every `expected` field still holds its value.
    /// An expected `null` means the field must be absent (or null).
    ///
    /// Fails with [`StoreError::Conflict`] when the document changed.
    async fn update_fields_if(
        &self,
        collection: &str,
        id: &str,
        expected: &Fields,
        patch: Fields,
    ) -> StoreResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// All documents ordered by `field`; documents lacking it sort last
    async fn query_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Record>>;

    /// Cheap liveness check of the backend
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Apply a merge patch to a document body
pub(crate) fn apply_patch(target: &mut Fields, patch: Fields) {
    for (key, value) in patch {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

/// Whether every expected field matches the document
pub(crate) fn matches_expected(fields: &Fields, expected: &Fields) -> bool {
    expected.iter().all(|(key, want)| match fields.get(key) {
        None | Some(Value::Null) => want.is_null(),
        Some(have) => have == want,
    })
}

/// Ordering used for `query_ordered`: numbers before strings before
/// everything else, missing values last regardless of direction
pub(crate) fn compare_field(
    a: Option<&Value>,
    b: Option<&Value>,
    direction: Direction,
) -> Ordering {
    fn present(v: Option<&Value>) -> Option<&Value> {
        v.filter(|v| !v.is_null())
    }

    match (present(a), present(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y);
            match direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Bool(_) | Value::Number(_) => 0,
            Value::String(_) => 1,
            _ => 2,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
