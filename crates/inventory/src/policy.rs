//! Inventory business policy.

use serde::{Deserialize, Serialize};

use clinistock_core::StatusThresholds;

/// Deployment-configurable rules for the quantity/status engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryPolicy {
    pub thresholds: StatusThresholds,
    /// Floor a stock-out must leave for items that are already running low.
    pub min_remaining: u32,
    /// Upper bound on a single restock or stock-out quantity.
    pub max_adjust_qty: u32,
}

impl Default for InventoryPolicy {
    fn default() -> Self {
        Self {
            thresholds: StatusThresholds::default(),
            min_remaining: 10,
            max_adjust_qty: 9999,
        }
    }
}
