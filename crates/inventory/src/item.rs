use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use clinistock_core::{Category, DomainError, DomainResult, ItemId, StatusThresholds, StockStatus, UnitCost};

/// Collection holding inventory items.
pub const INVENTORY_COLLECTION: &str = "inventory";

/// An inventory item as persisted.
///
/// `status` is stored, not recomputed on read; every mutation path goes
/// through [`InventoryItem::set_quantity`] so quantity and status never
/// drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub category: Category,
    pub quantity: u32,
    pub unit: String,
    pub unit_cost: UnitCost,
    pub supplier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<NaiveDate>,
    pub status: StockStatus,
}

/// Fields for a not-yet-persisted item; the id is assigned at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub category: Category,
    pub quantity: u32,
    pub unit: String,
    pub unit_cost: UnitCost,
    pub supplier: String,
    pub expiration: Option<NaiveDate>,
}

impl InventoryItem {
    /// Build a new item from a draft, deriving the initial status.
    pub fn create(id: ItemId, draft: ItemDraft, thresholds: &StatusThresholds) -> DomainResult<Self> {
        if draft.name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        Ok(Self {
            id,
            name: draft.name,
            category: draft.category,
            quantity: draft.quantity,
            unit: draft.unit,
            unit_cost: draft.unit_cost,
            supplier: draft.supplier,
            expiration: draft.expiration,
            status: thresholds.derive(draft.quantity),
        })
    }

    /// Set the quantity and re-derive the status in the same step.
    pub fn set_quantity(&mut self, quantity: u32, thresholds: &StatusThresholds) {
        self.quantity = quantity;
        self.status = thresholds.derive(quantity);
    }
}
