//! `clinistock-allocator` — collision-free document identifiers.
//!
//! Two strategies, both built on the store's atomic transactions:
//!
//! - **Sequential**: a persisted counter incremented in the same transaction
//!   that writes the record. Strictly increasing, gap-free, zero-padded.
//! - **Patterned**: a randomized digit-group id (e.g. `22-2232`) claimed by
//!   an atomic check-and-insert, retried on collision.
//!
//! [`allocate_with_fallback`] chains them in fixed priority order:
//! patterned, then sequential, then the backing store's auto id.

pub mod error;
pub mod patterned;
pub mod sequential;
pub mod strategy;

pub use error::AllocationError;
pub use patterned::{allocate_patterned, PatternedIdOptions};
pub use sequential::{allocate_sequential, SequentialIdOptions, COUNTERS_COLLECTION};
pub use strategy::{allocate_with_fallback, AllocationStrategy};
