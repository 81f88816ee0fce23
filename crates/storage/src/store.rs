//! Document store contract.
//!
//! Modeled after a managed document database: untyped JSON documents keyed by
//! `(collection, id)`, with transactional read-modify-write as the only way
//! to perform dependent updates (counter increments, collision checks,
//! exactly-once materialization).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::mpsc;

use crate::error::StorageError;

/// A persisted record in its untyped, on-the-wire form.
pub type Document = serde_json::Value;

/// One write in a batched multi-record write.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWrite {
    Put {
        collection: String,
        id: String,
        doc: Document,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// Kind of change observed on a collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A change notification delivered to collection subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
    /// The document after the change; `None` for deletions.
    pub doc: Option<Document>,
}

/// Read/write view inside an atomic transaction.
///
/// Reads observe the committed state plus the transaction's own staged
/// writes. Writes are buffered and become visible to other readers only when
/// the transaction commits; returning an error from the transaction closure
/// discards every staged write.
pub trait StoreTransaction {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StorageError>;

    fn exists(&self, collection: &str, id: &str) -> Result<bool, StorageError> {
        Ok(self.get(collection, id)?.is_some())
    }

    /// Stage an upsert.
    fn set(&mut self, collection: &str, id: &str, doc: Document);

    /// Stage an insert; fails with [`StorageError::AlreadyExists`] if the id
    /// is taken (by committed state or by this transaction's own writes).
    fn insert(&mut self, collection: &str, id: &str, doc: Document) -> Result<(), StorageError>;

    /// Stage a deletion.
    fn delete(&mut self, collection: &str, id: &str);
}

/// The storage collaborator boundary.
///
/// Any replacement backend must provide equivalent transaction isolation:
/// the counter increments and collision checks in the allocator rely on
/// strict read-then-write atomicity per transaction.
pub trait DocumentStore: Send + Sync {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StorageError>;

    fn exists(&self, collection: &str, id: &str) -> Result<bool, StorageError>;

    /// All documents of a collection, ordered by id.
    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StorageError>;

    /// Apply a batch of writes as one unit.
    fn apply_batch(&self, writes: Vec<BatchWrite>) -> Result<(), StorageError>;

    /// Run `f` as an atomic read-modify-write transaction.
    ///
    /// On `Ok` every staged write commits; on `Err` none do. Outputs are
    /// returned by letting the closure capture its environment.
    fn transact(
        &self,
        f: &mut dyn FnMut(&mut dyn StoreTransaction) -> Result<(), StorageError>,
    ) -> Result<(), StorageError>;

    /// Subscribe to the change feed of one collection.
    fn subscribe(&self, collection: &str) -> mpsc::Receiver<ChangeEvent>;

    /// Backing-store generated identifier (last-resort allocation strategy).
    fn auto_id(&self) -> String {
        uuid::Uuid::now_v7().to_string()
    }
}

/// Decode a document into its typed entity.
///
/// The strict parsing boundary: loose or missing fields surface as
/// [`StorageError::MalformedRecord`] instead of defaulting to zero.
pub fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, StorageError> {
    serde_json::from_value(doc).map_err(|e| StorageError::MalformedRecord(e.to_string()))
}

/// Encode a typed entity into its persisted document form.
pub fn encode<T: Serialize>(value: &T) -> Result<Document, StorageError> {
    serde_json::to_value(value).map_err(|e| StorageError::MalformedRecord(e.to_string()))
}
