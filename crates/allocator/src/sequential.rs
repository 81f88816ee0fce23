//! Sequential counter-backed identifiers.

use serde::{Deserialize, Serialize};

use clinistock_storage::{decode, encode, Document, DocumentStore};

use crate::error::AllocationError;

/// Collection holding the allocator's counters. Only allocator transactions
/// may read or write these records.
pub const COUNTERS_COLLECTION: &str = "counters";

/// Persisted monotonic counter, keyed by counter name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub seq: u64,
}

/// Formatting options for sequential ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialIdOptions {
    /// Optional prefix, e.g. `"ORD-"`.
    pub prefix: String,
    /// Zero-padding width of the numeric part.
    pub digits: usize,
}

impl Default for SequentialIdOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            digits: 4,
        }
    }
}

impl SequentialIdOptions {
    fn format(&self, seq: u64) -> String {
        format!("{}{:0width$}", self.prefix, seq, width = self.digits)
    }
}

/// Allocate the next id from `counter_name` and write the record under it.
///
/// The counter read-and-increment and the record insert are one atomic unit:
/// both succeed or both fail, so ids from the same counter are strictly
/// increasing and gap-free even under concurrent callers. `payload` is
/// called with the allocated id to produce the record to store.
///
/// A transaction abort surfaces as [`AllocationError::Failed`] with no
/// partial write; the caller may retry.
pub fn allocate_sequential<S, F>(
    store: &S,
    counter_name: &str,
    collection: &str,
    opts: &SequentialIdOptions,
    payload: F,
) -> Result<String, AllocationError>
where
    S: DocumentStore + ?Sized,
    F: Fn(&str) -> Document,
{
    let mut allocated: Option<String> = None;
    store.transact(&mut |tx| {
        let seq = match tx.get(COUNTERS_COLLECTION, counter_name)? {
            Some(doc) => decode::<Counter>(doc)?.seq + 1,
            None => 1,
        };
        let id = opts.format(seq);
        tx.set(COUNTERS_COLLECTION, counter_name, encode(&Counter { seq })?);
        tx.insert(collection, &id, payload(&id))?;
        allocated = Some(id);
        Ok(())
    })?;

    // The closure always sets `allocated` before returning Ok.
    allocated.ok_or_else(|| {
        AllocationError::Failed(clinistock_storage::StorageError::Unavailable(
            "transaction committed without allocating".to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinistock_storage::InMemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn initializes_counter_and_pads_ids() {
        let store = InMemoryStore::new();
        let opts = SequentialIdOptions::default();

        let first =
            allocate_sequential(&store, "ordered_counter", "orders", &opts, |_| json!({}))
                .unwrap();
        let second =
            allocate_sequential(&store, "ordered_counter", "orders", &opts, |_| json!({}))
                .unwrap();

        assert_eq!(first, "0001");
        assert_eq!(second, "0002");
        assert!(store.exists("orders", "0001").unwrap());
    }

    #[test]
    fn applies_prefix_and_width() {
        let store = InMemoryStore::new();
        let opts = SequentialIdOptions {
            prefix: "ORD-".to_string(),
            digits: 6,
        };
        let id = allocate_sequential(&store, "c", "orders", &opts, |_| json!({})).unwrap();
        assert_eq!(id, "ORD-000001");
    }

    #[test]
    fn payload_receives_the_allocated_id() {
        let store = InMemoryStore::new();
        let opts = SequentialIdOptions::default();
        let id = allocate_sequential(&store, "c", "orders", &opts, |id| {
            json!({ "id": id })
        })
        .unwrap();
        assert_eq!(
            store.get("orders", &id).unwrap(),
            Some(json!({ "id": "0001" }))
        );
    }

    #[test]
    fn concurrent_allocations_are_distinct_and_gap_free() {
        let store = Arc::new(InMemoryStore::new());
        let opts = SequentialIdOptions::default();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let opts = opts.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| {
                            allocate_sequential(
                                store.as_ref(),
                                "ordered_counter",
                                "orders",
                                &opts,
                                |_| json!({}),
                            )
                            .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();

        let expected: Vec<String> = (1..=200u64).map(|n| format!("{n:04}")).collect();
        assert_eq!(ids, expected);
    }
}
