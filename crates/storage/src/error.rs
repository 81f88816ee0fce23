//! Storage operation errors.

use thiserror::Error;

/// Infrastructure-level storage error.
///
/// These are storage concerns (conflicts, contention, decode failures) as
/// opposed to domain errors (validation, invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// An insert targeted an id that is already taken.
    #[error("record already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    /// The atomic transaction aborted due to concurrent modification.
    #[error("transaction aborted: {0}")]
    Contention(String),

    /// The backing store could not be reached or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A persisted record failed to decode into its typed entity.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// An in-process lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn already_exists(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            collection: collection.into(),
            id: id.into(),
        }
    }
}
