//! Stock status derivation.
//!
//! Status is a value derived from quantity against two thresholds. It is
//! persisted alongside the quantity (not recomputed on every read), so every
//! mutation path must re-derive it through [`StatusThresholds::derive`].

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Derived severity level for an inventory item.
///
/// Serialized with the human-facing labels the records carry
/// (`"Critical"`, `"Low Stock"`, `"In Stock"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "Critical")]
    Critical,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "In Stock")]
    InStock,
}

impl StockStatus {
    /// Severity rank: `Critical > LowStock > InStock`.
    pub fn severity(&self) -> u8 {
        match self {
            StockStatus::Critical => 2,
            StockStatus::LowStock => 1,
            StockStatus::InStock => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Critical => "Critical",
            StockStatus::LowStock => "Low Stock",
            StockStatus::InStock => "In Stock",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantity thresholds that drive status derivation.
///
/// Configurable per deployment; invariant: `critical_max < low_stock_max`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusThresholds {
    pub critical_max: u32,
    pub low_stock_max: u32,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            critical_max: 20,
            low_stock_max: 60,
        }
    }
}

impl StatusThresholds {
    pub fn new(critical_max: u32, low_stock_max: u32) -> Result<Self, DomainError> {
        if critical_max >= low_stock_max {
            return Err(DomainError::invariant(format!(
                "critical_max ({critical_max}) must be below low_stock_max ({low_stock_max})"
            )));
        }
        Ok(Self {
            critical_max,
            low_stock_max,
        })
    }

    /// Derive the status for a quantity. Total over all `u32` quantities.
    ///
    /// - `quantity <= critical_max` → `Critical`
    /// - `critical_max < quantity <= low_stock_max` → `Low Stock`
    /// - `quantity > low_stock_max` → `In Stock`
    pub fn derive(&self, quantity: u32) -> StockStatus {
        if quantity <= self.critical_max {
            StockStatus::Critical
        } else if quantity <= self.low_stock_max {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derives_status_at_threshold_boundaries() {
        let t = StatusThresholds::default();
        assert_eq!(t.derive(0), StockStatus::Critical);
        assert_eq!(t.derive(20), StockStatus::Critical);
        assert_eq!(t.derive(21), StockStatus::LowStock);
        assert_eq!(t.derive(60), StockStatus::LowStock);
        assert_eq!(t.derive(61), StockStatus::InStock);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        assert!(StatusThresholds::new(60, 20).is_err());
        assert!(StatusThresholds::new(20, 20).is_err());
        assert!(StatusThresholds::new(20, 60).is_ok());
    }

    #[test]
    fn serializes_with_persisted_labels() {
        assert_eq!(
            serde_json::to_string(&StockStatus::LowStock).unwrap(),
            "\"Low Stock\""
        );
        let back: StockStatus = serde_json::from_str("\"In Stock\"").unwrap();
        assert_eq!(back, StockStatus::InStock);
    }

    proptest! {
        /// Increasing quantity never increases severity.
        #[test]
        fn severity_is_monotonic(q1 in 0u32..10_000, q2 in 0u32..10_000) {
            let t = StatusThresholds::default();
            let (lo, hi) = if q1 <= q2 { (q1, q2) } else { (q2, q1) };
            prop_assert!(t.derive(lo).severity() >= t.derive(hi).severity());
        }

        /// Derivation is total and consistent with the severity ranking.
        #[test]
        fn derivation_is_total(q in any::<u32>()) {
            let t = StatusThresholds::default();
            let status = t.derive(q);
            prop_assert!(status.severity() <= 2);
        }
    }
}
