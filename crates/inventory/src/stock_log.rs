use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinistock_auth::PrincipalId;
use clinistock_core::{Category, UnitCost};

use crate::item::InventoryItem;

/// Collection holding stock-log entries. Append-only: entries are written
/// once per committed item and never updated or deleted.
pub const STOCK_LOG_COLLECTION: &str = "stock_log";

/// What kind of movement an entry records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLogKind {
    #[serde(rename = "stock_out")]
    StockOut,
    #[serde(rename = "restock")]
    Restock,
}

/// Immutable record of one stock movement.
///
/// Unit cost and supplier are snapshots taken at commit time; later edits to
/// the item do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLogEntry {
    pub item_name: String,
    pub category: Category,
    /// Moved quantity (the delta, always positive).
    pub quantity: u32,
    pub unit: String,
    pub unit_cost: UnitCost,
    pub supplier: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub kind: StockLogKind,
    pub created_by: PrincipalId,
}

impl StockLogEntry {
    pub fn restock(
        item: &InventoryItem,
        quantity: u32,
        reference: &str,
        timestamp: DateTime<Utc>,
        created_by: PrincipalId,
    ) -> Self {
        Self::movement(item, quantity, reference, None, timestamp, created_by, StockLogKind::Restock)
    }

    pub fn stock_out(
        item: &InventoryItem,
        quantity: u32,
        reference: &str,
        notes: Option<String>,
        timestamp: DateTime<Utc>,
        created_by: PrincipalId,
    ) -> Self {
        Self::movement(item, quantity, reference, notes, timestamp, created_by, StockLogKind::StockOut)
    }

    fn movement(
        item: &InventoryItem,
        quantity: u32,
        reference: &str,
        notes: Option<String>,
        timestamp: DateTime<Utc>,
        created_by: PrincipalId,
        kind: StockLogKind,
    ) -> Self {
        Self {
            item_name: item.name.clone(),
            category: item.category,
            quantity,
            unit: item.unit.clone(),
            unit_cost: item.unit_cost,
            supplier: item.supplier.clone(),
            reference: reference.to_string(),
            notes,
            timestamp,
            kind,
            created_by,
        }
    }
}
