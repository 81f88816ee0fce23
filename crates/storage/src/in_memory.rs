//! In-memory document store.
//!
//! Backs tests and single-process deployments. Transactions take the coarse
//! write lock for their whole duration, which gives serializable isolation —
//! stronger than the snapshot isolation the contract requires.

use std::collections::{BTreeMap, HashMap};
use std::sync::{mpsc, Mutex, RwLock};

use crate::error::StorageError;
use crate::store::{
    BatchWrite, ChangeEvent, ChangeKind, Document, DocumentStore, StoreTransaction,
};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// In-memory implementation of the full [`DocumentStore`] contract.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<Collections>,
    watchers: Mutex<HashMap<String, Vec<mpsc::Sender<ChangeEvent>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, events: Vec<ChangeEvent>) {
        let Ok(mut watchers) = self.watchers.lock() else {
            return;
        };
        for event in events {
            if let Some(senders) = watchers.get_mut(&event.collection) {
                // Drop subscribers whose receiver has gone away.
                senders.retain(|tx| tx.send(event.clone()).is_ok());
            }
        }
    }
}

/// Staged writes of one open transaction, keyed by `(collection, id)`.
/// `None` marks a staged deletion.
struct MemTransaction<'a> {
    base: &'a Collections,
    staged: BTreeMap<(String, String), Option<Document>>,
}

impl MemTransaction<'_> {
    fn committed(&self, collection: &str, id: &str) -> Option<&Document> {
        self.base.get(collection).and_then(|col| col.get(id))
    }
}

impl StoreTransaction for MemTransaction<'_> {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StorageError> {
        if let Some(staged) = self
            .staged
            .get(&(collection.to_string(), id.to_string()))
        {
            return Ok(staged.clone());
        }
        Ok(self.committed(collection, id).cloned())
    }

    fn set(&mut self, collection: &str, id: &str, doc: Document) {
        self.staged
            .insert((collection.to_string(), id.to_string()), Some(doc));
    }

    fn insert(&mut self, collection: &str, id: &str, doc: Document) -> Result<(), StorageError> {
        if self.exists(collection, id)? {
            return Err(StorageError::already_exists(collection, id));
        }
        self.set(collection, id, doc);
        Ok(())
    }

    fn delete(&mut self, collection: &str, id: &str) {
        self.staged
            .insert((collection.to_string(), id.to_string()), None);
    }
}

impl DocumentStore for InMemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StorageError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(collections
            .get(collection)
            .and_then(|col| col.get(id))
            .cloned())
    }

    fn exists(&self, collection: &str, id: &str) -> Result<bool, StorageError> {
        Ok(self.get(collection, id)?.is_some())
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StorageError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(collections
            .get(collection)
            .map(|col| {
                col.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn apply_batch(&self, writes: Vec<BatchWrite>) -> Result<(), StorageError> {
        let events = {
            let mut collections = self
                .collections
                .write()
                .map_err(|_| StorageError::LockPoisoned)?;
            let mut events = Vec::with_capacity(writes.len());
            for write in writes {
                match write {
                    BatchWrite::Put {
                        collection,
                        id,
                        doc,
                    } => {
                        let col = collections.entry(collection.clone()).or_default();
                        let kind = if col.contains_key(&id) {
                            ChangeKind::Updated
                        } else {
                            ChangeKind::Created
                        };
                        col.insert(id.clone(), doc.clone());
                        events.push(ChangeEvent {
                            collection,
                            id,
                            kind,
                            doc: Some(doc),
                        });
                    }
                    BatchWrite::Delete { collection, id } => {
                        let removed = collections
                            .get_mut(&collection)
                            .and_then(|col| col.remove(&id))
                            .is_some();
                        if removed {
                            events.push(ChangeEvent {
                                collection,
                                id,
                                kind: ChangeKind::Deleted,
                                doc: None,
                            });
                        }
                    }
                }
            }
            events
        };
        self.notify(events);
        Ok(())
    }

    fn transact(
        &self,
        f: &mut dyn FnMut(&mut dyn StoreTransaction) -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        let events = {
            let mut collections = self
                .collections
                .write()
                .map_err(|_| StorageError::LockPoisoned)?;

            let mut tx = MemTransaction {
                base: &*collections,
                staged: BTreeMap::new(),
            };
            f(&mut tx)?;
            let staged = tx.staged;

            let mut events = Vec::with_capacity(staged.len());
            for ((collection, id), op) in staged {
                match op {
                    Some(doc) => {
                        let col = collections.entry(collection.clone()).or_default();
                        let kind = if col.contains_key(&id) {
                            ChangeKind::Updated
                        } else {
                            ChangeKind::Created
                        };
                        col.insert(id.clone(), doc.clone());
                        events.push(ChangeEvent {
                            collection,
                            id,
                            kind,
                            doc: Some(doc),
                        });
                    }
                    None => {
                        let removed = collections
                            .get_mut(&collection)
                            .and_then(|col| col.remove(&id))
                            .is_some();
                        if removed {
                            events.push(ChangeEvent {
                                collection,
                                id,
                                kind: ChangeKind::Deleted,
                                doc: None,
                            });
                        }
                    }
                }
            }
            events
        };
        self.notify(events);
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> mpsc::Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.entry(collection.to_string()).or_default().push(tx);
        }
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transaction_commits_all_staged_writes() {
        let store = InMemoryStore::new();
        store
            .transact(&mut |tx| {
                tx.insert("inventory", "a", json!({ "quantity": 5 }))?;
                tx.set("counters", "ordered_counter", json!({ "seq": 1 }));
                Ok(())
            })
            .unwrap();

        assert!(store.exists("inventory", "a").unwrap());
        assert_eq!(
            store.get("counters", "ordered_counter").unwrap(),
            Some(json!({ "seq": 1 }))
        );
    }

    #[test]
    fn failed_transaction_leaves_no_partial_state() {
        let store = InMemoryStore::new();
        let result = store.transact(&mut |tx| {
            tx.set("inventory", "a", json!({ "quantity": 5 }));
            Err(StorageError::Unavailable("simulated".to_string()))
        });

        assert!(result.is_err());
        assert!(!store.exists("inventory", "a").unwrap());
    }

    #[test]
    fn insert_conflicts_with_committed_and_staged_state() {
        let store = InMemoryStore::new();
        store
            .apply_batch(vec![BatchWrite::Put {
                collection: "orders".to_string(),
                id: "22-2232".to_string(),
                doc: json!({}),
            }])
            .unwrap();

        let err = store
            .transact(&mut |tx| tx.insert("orders", "22-2232", json!({})))
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));

        let err = store
            .transact(&mut |tx| {
                tx.insert("orders", "31-0001", json!({}))?;
                tx.insert("orders", "31-0001", json!({}))
            })
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[test]
    fn transaction_reads_its_own_writes() {
        let store = InMemoryStore::new();
        store
            .transact(&mut |tx| {
                tx.set("counters", "c", json!({ "seq": 7 }));
                let seen = tx.get("counters", "c")?;
                assert_eq!(seen, Some(json!({ "seq": 7 })));
                tx.delete("counters", "c");
                assert!(!tx.exists("counters", "c")?);
                Ok(())
            })
            .unwrap();
        assert!(!store.exists("counters", "c").unwrap());
    }

    #[test]
    fn subscribers_observe_collection_changes() {
        let store = InMemoryStore::new();
        let rx = store.subscribe("inventory");

        store
            .transact(&mut |tx| {
                tx.set("inventory", "a", json!({ "quantity": 1 }));
                Ok(())
            })
            .unwrap();
        store
            .apply_batch(vec![BatchWrite::Delete {
                collection: "inventory".to_string(),
                id: "a".to_string(),
            }])
            .unwrap();

        let first = rx.recv().unwrap();
        assert_eq!(first.kind, ChangeKind::Created);
        assert_eq!(first.id, "a");
        let second = rx.recv().unwrap();
        assert_eq!(second.kind, ChangeKind::Deleted);
    }

    #[test]
    fn auto_ids_are_distinct() {
        let store = InMemoryStore::new();
        let a = store.auto_id();
        let b = store.auto_id();
        assert_ne!(a, b);
    }
}
