use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use clinistock_auth::PrincipalId;
use clinistock_core::{Category, DomainError, DomainResult, ItemId, OrderId, StatusThresholds, UnitCost};
use clinistock_inventory::InventoryItem;

/// Collection holding order records.
pub const ORDERS_COLLECTION: &str = "orders";

/// Order status lifecycle.
///
/// `Received`, `Pending` and `Cancelled` are terminal. While the lock window
/// is open, an `Ordered` order stays `Ordered` unless explicitly overridden.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Ordered,
    Received,
    Pending,
    Cancelled,
}

/// A placed order as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub item_name: String,
    pub category: Category,
    pub quantity: u32,
    pub unit: String,
    pub unit_cost: UnitCost,
    pub supplier: String,
    pub status: OrderStatus,
    /// Status transitions are ignored while `now < lock_until`.
    pub lock_until: DateTime<Utc>,
    /// Exactly-once guard for materialization into inventory.
    pub moved_to_inventory: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: PrincipalId,
}

/// Fields for a not-yet-placed order; id and timestamps are assigned at
/// placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub item_name: String,
    pub category: Category,
    pub quantity: u32,
    pub unit: String,
    pub unit_cost: UnitCost,
    pub supplier: String,
}

impl OrderDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.item_name.trim().is_empty() {
            return Err(DomainError::validation("order item name cannot be empty"));
        }
        if self.quantity == 0 {
            return Err(DomainError::validation("order quantity must be positive"));
        }
        Ok(())
    }
}

/// Outcome of a pure transition decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDecision {
    /// The transition is allowed; persist the new status.
    Apply(OrderStatus),
    /// The lock window is still open; leave the order untouched.
    Locked,
}

impl Order {
    /// Build a placed order. The id is whichever the allocator assigned.
    pub fn place(
        id: OrderId,
        draft: OrderDraft,
        now: DateTime<Utc>,
        lock_window: Duration,
        created_by: PrincipalId,
    ) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            item_name: draft.item_name,
            category: draft.category,
            quantity: draft.quantity,
            unit: draft.unit,
            unit_cost: draft.unit_cost,
            supplier: draft.supplier,
            status: OrderStatus::Ordered,
            lock_until: now + lock_window,
            moved_to_inventory: false,
            created_at: now,
            created_by,
        })
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.status == OrderStatus::Ordered && now < self.lock_until
    }

    /// Decide whether `target` may be applied at `now`.
    ///
    /// Locked orders produce [`TransitionDecision::Locked`] — a benign no-op,
    /// not an error. Transitions out of a terminal state, or back to
    /// `Ordered`, violate the lifecycle.
    pub fn transition(
        &self,
        target: OrderStatus,
        now: DateTime<Utc>,
        override_lock: bool,
    ) -> DomainResult<TransitionDecision> {
        if target == OrderStatus::Ordered {
            return Err(DomainError::invariant(
                "an order cannot transition back to Ordered",
            ));
        }
        match self.status {
            OrderStatus::Ordered => {
                if self.is_locked(now) && !override_lock {
                    return Ok(TransitionDecision::Locked);
                }
                Ok(TransitionDecision::Apply(target))
            }
            OrderStatus::Received | OrderStatus::Pending | OrderStatus::Cancelled => {
                Err(DomainError::invariant(format!(
                    "order is already {:?}",
                    self.status
                )))
            }
        }
    }

    /// Turn a received order into the inventory item it was ordered for.
    pub fn materialize(&self, item_id: ItemId, thresholds: &StatusThresholds) -> InventoryItem {
        InventoryItem {
            id: item_id,
            name: self.item_name.clone(),
            category: self.category,
            quantity: self.quantity,
            unit: self.unit.clone(),
            unit_cost: self.unit_cost,
            supplier: self.supplier.clone(),
            expiration: None,
            status: thresholds.derive(self.quantity),
        }
    }
}
