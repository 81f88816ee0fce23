//! `clinistock-storage` — the storage collaborator contract.
//!
//! The engine talks to its backing store exclusively through the
//! [`DocumentStore`] trait: atomic read-modify-write transactions, existence
//! checks, batched writes, and per-collection change subscriptions. The
//! [`InMemoryStore`] implements the full contract and doubles as the
//! reference semantics for any replacement backend (which must offer at
//! least snapshot isolation).
//!
//! External records are decoded into typed entities at this boundary; a
//! decode failure is a [`StorageError::MalformedRecord`], never a silent
//! default.

pub mod clock;
pub mod error;
pub mod in_memory;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StorageError;
pub use in_memory::InMemoryStore;
pub use store::{
    decode, encode, BatchWrite, ChangeEvent, ChangeKind, Document, DocumentStore, StoreTransaction,
};
