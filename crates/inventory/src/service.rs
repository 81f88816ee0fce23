//! Persistence adapter for the inventory engine.
//!
//! Loads current state, lets the pure planners decide, then commits one
//! atomic transaction per item: the quantity/status update and its stock-log
//! entry land together or not at all. There is no cross-item transaction; a
//! batch can partially succeed, and the [`CommitReport`] says exactly which
//! items were applied and which were not.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use clinistock_auth::IdentityProvider;
use clinistock_core::{DomainError, ItemId};
use clinistock_storage::{decode, encode, Clock, DocumentStore, StorageError};

use crate::engine::{
    plan_restock, plan_stock_out, BatchError, RestockChange, RestockLine, StockOutChange,
    StockOutLine,
};
use crate::item::{InventoryItem, ItemDraft, INVENTORY_COLLECTION};
use crate::policy::InventoryPolicy;
use crate::stock_log::{StockLogEntry, STOCK_LOG_COLLECTION};

#[derive(Debug, Error)]
pub enum InventoryServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] BatchError),

    #[error("inventory item not found: {0}")]
    ItemNotFound(ItemId),
}

/// One item in a restock submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockRequest {
    pub item_id: ItemId,
    pub add_qty: u32,
}

/// One item in a stock-out submission. `out_qty: None` means the field was
/// left blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockOutRequest {
    pub item_id: ItemId,
    pub out_qty: Option<u32>,
    pub note: Option<String>,
}

/// An item whose commit transaction failed after validation passed.
#[derive(Debug)]
pub struct FailedItem {
    pub item_id: ItemId,
    pub error: StorageError,
}

/// Outcome of a committed batch: which changes landed, which did not.
/// Already-committed items stay committed; there is no rollback of prior
/// items when a later one fails.
#[derive(Debug)]
pub struct CommitReport<C> {
    pub applied: Vec<C>,
    pub failed: Vec<FailedItem>,
}

impl<C> CommitReport<C> {
    /// True when the batch produced no changes at all (nothing to summarize).
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.failed.is_empty()
    }

    pub fn fully_applied(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Inventory persistence service.
pub struct InventoryService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    identity: Arc<dyn IdentityProvider>,
    policy: InventoryPolicy,
}

impl<S: DocumentStore> InventoryService<S> {
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        identity: Arc<dyn IdentityProvider>,
        policy: InventoryPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            identity,
            policy,
        }
    }

    pub fn policy(&self) -> &InventoryPolicy {
        &self.policy
    }

    /// Create a new item under a backing-store auto id.
    pub fn create_item(&self, draft: ItemDraft) -> Result<InventoryItem, InventoryServiceError> {
        let id = ItemId::new(self.store.auto_id())?;
        let item = InventoryItem::create(id, draft, &self.policy.thresholds)?;
        let doc = encode(&item)?;
        self.store.transact(&mut |tx| {
            tx.insert(INVENTORY_COLLECTION, item.id.as_str(), doc.clone())
        })?;
        Ok(item)
    }

    pub fn load_item(&self, item_id: &ItemId) -> Result<InventoryItem, InventoryServiceError> {
        let doc = self
            .store
            .get(INVENTORY_COLLECTION, item_id.as_str())?
            .ok_or_else(|| InventoryServiceError::ItemNotFound(item_id.clone()))?;
        Ok(decode(doc)?)
    }

    /// Restock a batch of items.
    ///
    /// Quantities are re-read from the store; the caller's view of current
    /// stock is not trusted. Each item with a positive added quantity is
    /// committed in its own transaction together with one restock log entry.
    pub fn restock(
        &self,
        requests: &[RestockRequest],
        reference: &str,
    ) -> Result<CommitReport<RestockChange>, InventoryServiceError> {
        let mut items: HashMap<ItemId, InventoryItem> = HashMap::new();
        let mut lines = Vec::with_capacity(requests.len());
        for request in requests {
            let item = self.load_item(&request.item_id)?;
            lines.push(RestockLine {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                current_qty: item.quantity,
                add_qty: request.add_qty,
            });
            items.insert(item.id.clone(), item);
        }

        let changes = plan_restock(&lines, &self.policy)?;
        let actor = self.identity.current();
        let now = self.clock.now();

        let mut applied = Vec::new();
        let mut failed = Vec::new();
        for change in changes {
            if change.added == 0 {
                continue;
            }
            // Validated above; the id came from the loaded items.
            let Some(item) = items.get(&change.item_id) else {
                continue;
            };
            let mut updated = item.clone();
            updated.set_quantity(change.after, &self.policy.thresholds);
            let entry =
                StockLogEntry::restock(&updated, change.added, reference, now, actor.id);

            match self.commit_item_change(&updated, change.before, &entry) {
                Ok(()) => applied.push(change),
                Err(error) => {
                    tracing::error!(
                        item = %change.item_id,
                        error = %error,
                        "restock commit failed; item not updated"
                    );
                    failed.push(FailedItem {
                        item_id: change.item_id.clone(),
                        error,
                    });
                }
            }
        }
        Ok(CommitReport { applied, failed })
    }

    /// Stock out a batch of items.
    ///
    /// Validation runs against the persisted quantities and statuses before
    /// any mutation; on success each moving item commits in its own
    /// transaction with one `stock_out` log entry. Returns the before/out/
    /// after summaries for the caller to render.
    pub fn stock_out(
        &self,
        requests: &[StockOutRequest],
        batch_note: Option<&str>,
        reference: &str,
    ) -> Result<CommitReport<StockOutChange>, InventoryServiceError> {
        let mut items: HashMap<ItemId, InventoryItem> = HashMap::new();
        let mut lines = Vec::with_capacity(requests.len());
        for request in requests {
            let item = self.load_item(&request.item_id)?;
            lines.push(StockOutLine {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                current_qty: item.quantity,
                status: item.status,
                out_qty: request.out_qty,
                note: request.note.clone(),
            });
            items.insert(item.id.clone(), item);
        }

        let changes = plan_stock_out(&lines, batch_note, &self.policy)?;
        let actor = self.identity.current();
        let now = self.clock.now();

        let mut applied = Vec::new();
        let mut failed = Vec::new();
        for change in changes {
            let Some(item) = items.get(&change.item_id) else {
                continue;
            };
            let mut updated = item.clone();
            updated.set_quantity(change.after, &self.policy.thresholds);
            let entry = StockLogEntry::stock_out(
                &updated,
                change.out,
                reference,
                change.note.clone(),
                now,
                actor.id,
            );

            match self.commit_item_change(&updated, change.before, &entry) {
                Ok(()) => applied.push(change),
                Err(error) => {
                    tracing::error!(
                        item = %change.item_id,
                        error = %error,
                        "stock-out commit failed; item not updated"
                    );
                    failed.push(FailedItem {
                        item_id: change.item_id.clone(),
                        error,
                    });
                }
            }
        }
        Ok(CommitReport { applied, failed })
    }

    /// One atomic unit per item: the item update and its log entry land
    /// together or not at all.
    ///
    /// The item is re-read inside the transaction and its quantity checked
    /// against the value the plan was computed from; a quantity that moved
    /// in between aborts the commit with [`StorageError::Contention`].
    fn commit_item_change(
        &self,
        updated: &InventoryItem,
        expected_before: u32,
        entry: &StockLogEntry,
    ) -> Result<(), StorageError> {
        let item_doc = encode(updated)?;
        let entry_doc = encode(entry)?;
        let entry_id = self.store.auto_id();
        self.store.transact(&mut |tx| {
            let current = tx.get(INVENTORY_COLLECTION, updated.id.as_str())?.ok_or_else(|| {
                StorageError::Contention(format!("{} was removed before commit", updated.id))
            })?;
            let current: InventoryItem = decode(current)?;
            if current.quantity != expected_before {
                return Err(StorageError::Contention(format!(
                    "{}: quantity moved from {} to {} since planning",
                    updated.id, expected_before, current.quantity
                )));
            }
            tx.set(INVENTORY_COLLECTION, updated.id.as_str(), item_doc.clone());
            tx.insert(STOCK_LOG_COLLECTION, &entry_id, entry_doc.clone())
        })
    }
}
