//! Allocation errors.

use clinistock_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The atomic allocation transaction aborted; nothing was written.
    /// The caller may retry or fall back to a lower-priority strategy.
    #[error("allocation failed: {0}")]
    Failed(#[from] StorageError),

    /// Every candidate id within the attempts budget was already taken.
    #[error("patterned allocation exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },
}
