//! Fixed-priority allocation chain.

use rand::Rng;

use clinistock_storage::{Document, DocumentStore};

use crate::error::AllocationError;
use crate::patterned::{allocate_patterned, PatternedIdOptions};
use crate::sequential::{allocate_sequential, SequentialIdOptions};

/// Strategy chain configuration for one record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationStrategy {
    pub patterned: PatternedIdOptions,
    pub sequential: SequentialIdOptions,
    /// Counter name for the sequential fallback.
    pub counter_name: String,
}

impl AllocationStrategy {
    pub fn for_counter(counter_name: impl Into<String>) -> Self {
        Self {
            patterned: PatternedIdOptions::default(),
            sequential: SequentialIdOptions::default(),
            counter_name: counter_name.into(),
        }
    }
}

/// Allocate an id and write the record, trying strategies in fixed priority
/// order: patterned, then sequential, then the store's auto id. A strategy
/// is skipped only when the previous one returned an error; each fallback is
/// logged.
pub fn allocate_with_fallback<S, R, F>(
    store: &S,
    rng: &mut R,
    collection: &str,
    strategy: &AllocationStrategy,
    payload: F,
) -> Result<String, AllocationError>
where
    S: DocumentStore + ?Sized,
    R: Rng,
    F: Fn(&str) -> Document,
{
    match allocate_patterned(store, rng, collection, &strategy.patterned, &payload) {
        Ok(id) => return Ok(id),
        Err(e) => {
            tracing::warn!(error = %e, collection, "patterned allocation failed, falling back to sequential");
        }
    }

    match allocate_sequential(
        store,
        &strategy.counter_name,
        collection,
        &strategy.sequential,
        &payload,
    ) {
        Ok(id) => return Ok(id),
        Err(e) => {
            tracing::warn!(error = %e, collection, "sequential allocation failed, falling back to auto id");
        }
    }

    let id = store.auto_id();
    store.transact(&mut |tx| tx.insert(collection, &id, payload(&id)))?;
    Ok(id)
}
