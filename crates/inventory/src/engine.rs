//! Pure batch planners for restock and stock-out.
//!
//! Planners accept plain data and return decisions; they never touch the
//! store. The whole batch is validated before any change is produced, so a
//! single bad line rejects the batch with nothing mutated.

use thiserror::Error;

use clinistock_core::{ItemId, StockStatus};

use crate::policy::InventoryPolicy;

/// Batch validation failure. Messages carry the offending item and the
/// numeric context so the caller can surface them verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// A non-critical line arrived without an explicit quantity (0 is a
    /// valid quantity, blank is not).
    #[error("every selected item needs a stock-out quantity (0 is allowed, blank is not)")]
    IncompleteQuantities,

    /// Nothing in the batch would actually move stock.
    #[error("at least one item must have a stock-out quantity above zero")]
    NoPositiveQuantity,

    #[error("{name}: requested {requested} exceeds available {available}")]
    ExceedsAvailable {
        name: String,
        requested: u32,
        available: u32,
    },

    /// Critical items are locked for stock-out; a nonzero quantity is an
    /// error, never a silent clamp.
    #[error("{name}: critical items cannot be stocked out")]
    CriticalLocked { name: String },

    #[error("{name}: remaining would be {remaining}, must leave at least {min_remaining}")]
    BelowMinimumRemaining {
        name: String,
        remaining: u32,
        min_remaining: u32,
    },

    #[error("{name}: restock quantity {requested} is outside 0..={max}")]
    RestockOutOfRange {
        name: String,
        requested: u32,
        max: u32,
    },

    #[error("{name}: quantity overflow")]
    QuantityOverflow { name: String },
}

/// One item in a restock batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockLine {
    pub item_id: ItemId,
    pub item_name: String,
    pub current_qty: u32,
    pub add_qty: u32,
}

/// Planned outcome of a restock for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockChange {
    pub item_id: ItemId,
    pub before: u32,
    pub added: u32,
    pub after: u32,
    pub new_status: StockStatus,
}

/// Validate and compute a restock batch.
///
/// The engine re-validates the quantity bound even though the UI clamps
/// input; callers are not trusted. No minimum-remaining rule applies here
/// (quantity only increases).
pub fn plan_restock(
    lines: &[RestockLine],
    policy: &InventoryPolicy,
) -> Result<Vec<RestockChange>, BatchError> {
    for line in lines {
        if line.add_qty > policy.max_adjust_qty {
            return Err(BatchError::RestockOutOfRange {
                name: line.item_name.clone(),
                requested: line.add_qty,
                max: policy.max_adjust_qty,
            });
        }
    }

    lines
        .iter()
        .map(|line| {
            let after = line
                .current_qty
                .checked_add(line.add_qty)
                .ok_or_else(|| BatchError::QuantityOverflow {
                    name: line.item_name.clone(),
                })?;
            Ok(RestockChange {
                item_id: line.item_id.clone(),
                before: line.current_qty,
                added: line.add_qty,
                after,
                new_status: policy.thresholds.derive(after),
            })
        })
        .collect()
}

/// One item in a stock-out batch, as selected in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockOutLine {
    pub item_id: ItemId,
    pub item_name: String,
    pub current_qty: u32,
    /// Status at selection time; critical items are locked for stock-out.
    pub status: StockStatus,
    /// `None` means the operator left the field blank.
    pub out_qty: Option<u32>,
    /// Item-specific note; overrides the batch-wide note.
    pub note: Option<String>,
}

/// Planned outcome of a stock-out for one item (only items that move).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockOutChange {
    pub item_id: ItemId,
    pub item_name: String,
    pub before: u32,
    pub out: u32,
    pub after: u32,
    pub new_status: StockStatus,
    pub note: Option<String>,
}

/// Validate and compute a stock-out batch.
///
/// All rules run before any change is produced, in this order:
/// 1. every non-critical line has an explicit quantity;
/// 2. at least one non-critical line moves stock;
/// 3. no line takes more than is available;
/// 4. low-stock and critical lines that move stock must leave at least
///    `min_remaining` behind. In-stock lines are exempt and may be driven
///    to zero;
/// 5. critical lines are locked (nonzero quantity rejected).
///
/// Returns one summary per moving line; an item-specific note wins over the
/// batch-wide note.
pub fn plan_stock_out(
    lines: &[StockOutLine],
    batch_note: Option<&str>,
    policy: &InventoryPolicy,
) -> Result<Vec<StockOutChange>, BatchError> {
    if lines
        .iter()
        .any(|l| l.status != StockStatus::Critical && l.out_qty.is_none())
    {
        return Err(BatchError::IncompleteQuantities);
    }

    if !lines
        .iter()
        .any(|l| l.status != StockStatus::Critical && l.out_qty.unwrap_or(0) > 0)
    {
        return Err(BatchError::NoPositiveQuantity);
    }

    for line in lines {
        let out = line.out_qty.unwrap_or(0);
        if out > line.current_qty {
            return Err(BatchError::ExceedsAvailable {
                name: line.item_name.clone(),
                requested: out,
                available: line.current_qty,
            });
        }
    }

    for line in lines {
        let out = line.out_qty.unwrap_or(0);
        if line.status != StockStatus::InStock && out > 0 {
            let remaining = line.current_qty - out;
            if remaining < policy.min_remaining {
                return Err(BatchError::BelowMinimumRemaining {
                    name: line.item_name.clone(),
                    remaining,
                    min_remaining: policy.min_remaining,
                });
            }
        }
    }

    for line in lines {
        if line.status == StockStatus::Critical && line.out_qty.unwrap_or(0) > 0 {
            return Err(BatchError::CriticalLocked {
                name: line.item_name.clone(),
            });
        }
    }

    Ok(lines
        .iter()
        .filter(|line| line.out_qty.unwrap_or(0) > 0)
        .map(|line| {
            let out = line.out_qty.unwrap_or(0);
            let after = line.current_qty - out;
            StockOutChange {
                item_id: line.item_id.clone(),
                item_name: line.item_name.clone(),
                before: line.current_qty,
                out,
                after,
                new_status: policy.thresholds.derive(after),
                note: line
                    .note
                    .clone()
                    .or_else(|| batch_note.map(str::to_string)),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item_id(n: u32) -> ItemId {
        ItemId::new(format!("item-{n}")).unwrap()
    }

    fn out_line(n: u32, current: u32, status: StockStatus, out: Option<u32>) -> StockOutLine {
        StockOutLine {
            item_id: item_id(n),
            item_name: format!("item {n}"),
            current_qty: current,
            status,
            out_qty: out,
            note: None,
        }
    }

    #[test]
    fn restock_computes_quantity_and_status() {
        // Scenario: 18 (Critical) + 50 → 68, In Stock.
        let changes = plan_restock(
            &[RestockLine {
                item_id: item_id(1),
                item_name: "gloves".to_string(),
                current_qty: 18,
                add_qty: 50,
            }],
            &InventoryPolicy::default(),
        )
        .unwrap();
        assert_eq!(changes[0].after, 68);
        assert_eq!(changes[0].new_status, StockStatus::InStock);
    }

    #[test]
    fn restock_rejects_out_of_range_quantities() {
        let err = plan_restock(
            &[RestockLine {
                item_id: item_id(1),
                item_name: "gloves".to_string(),
                current_qty: 5,
                add_qty: 10_000,
            }],
            &InventoryPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::RestockOutOfRange { .. }));
    }

    #[test]
    fn stock_out_requires_explicit_quantities_for_non_critical_lines() {
        let err = plan_stock_out(
            &[
                out_line(1, 100, StockStatus::InStock, Some(5)),
                out_line(2, 80, StockStatus::InStock, None),
            ],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err, BatchError::IncompleteQuantities);
    }

    #[test]
    fn blank_quantity_on_a_critical_line_is_fine() {
        let changes = plan_stock_out(
            &[
                out_line(1, 15, StockStatus::Critical, None),
                out_line(2, 100, StockStatus::InStock, Some(5)),
            ],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].item_id, item_id(2));
    }

    #[test]
    fn stock_out_rejects_all_zero_batches() {
        let err = plan_stock_out(
            &[
                out_line(1, 100, StockStatus::InStock, Some(0)),
                out_line(2, 80, StockStatus::InStock, Some(0)),
            ],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err, BatchError::NoPositiveQuantity);
    }

    #[test]
    fn stock_out_rejects_overdraw_before_any_change() {
        let err = plan_stock_out(
            &[
                out_line(1, 100, StockStatus::InStock, Some(10)),
                out_line(2, 4, StockStatus::InStock, Some(5)),
                out_line(3, 100, StockStatus::InStock, Some(10)),
            ],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BatchError::ExceedsAvailable {
                name: "item 2".to_string(),
                requested: 5,
                available: 4,
            }
        );
    }

    #[test]
    fn critical_lines_cannot_move_stock() {
        let err = plan_stock_out(
            &[
                out_line(1, 15, StockStatus::Critical, Some(3)),
                out_line(2, 100, StockStatus::InStock, Some(5)),
            ],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BatchError::CriticalLocked {
                name: "item 1".to_string()
            }
        );
    }

    #[test]
    fn remaining_floor_is_checked_before_the_critical_lock() {
        // A moving critical line that also breaks the floor reports the
        // floor violation, not the lock.
        let err = plan_stock_out(
            &[
                out_line(1, 12, StockStatus::Critical, Some(8)),
                out_line(2, 100, StockStatus::InStock, Some(5)),
            ],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BatchError::BelowMinimumRemaining {
                name: "item 1".to_string(),
                remaining: 4,
                min_remaining: 10,
            }
        );
    }

    #[test]
    fn low_stock_lines_must_respect_the_remaining_floor() {
        // remaining would be 5 < 10: rejected.
        let err = plan_stock_out(
            &[out_line(1, 15, StockStatus::LowStock, Some(10))],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BatchError::BelowMinimumRemaining {
                name: "item 1".to_string(),
                remaining: 5,
                min_remaining: 10,
            }
        );

        // remaining exactly 10: allowed.
        let changes = plan_stock_out(
            &[out_line(1, 15, StockStatus::LowStock, Some(5))],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap();
        assert_eq!(changes[0].after, 10);
    }

    #[test]
    fn in_stock_lines_may_be_driven_to_zero() {
        // Scenario: 100 (In Stock) − 100 → 0, Critical.
        let changes = plan_stock_out(
            &[out_line(1, 100, StockStatus::InStock, Some(100))],
            None,
            &InventoryPolicy::default(),
        )
        .unwrap();
        assert_eq!(changes[0].after, 0);
        assert_eq!(changes[0].new_status, StockStatus::Critical);
    }

    #[test]
    fn item_note_overrides_batch_note() {
        let mut with_note = out_line(1, 100, StockStatus::InStock, Some(5));
        with_note.note = Some("damaged packaging".to_string());
        let without_note = out_line(2, 100, StockStatus::InStock, Some(5));

        let changes = plan_stock_out(
            &[with_note, without_note],
            Some("monthly clear-out"),
            &InventoryPolicy::default(),
        )
        .unwrap();
        assert_eq!(changes[0].note.as_deref(), Some("damaged packaging"));
        assert_eq!(changes[1].note.as_deref(), Some("monthly clear-out"));
    }

    proptest! {
        /// Conservation: for every planned change, `after = before - out`
        /// and nothing goes negative.
        #[test]
        fn stock_out_conserves_quantity(
            lines in prop::collection::vec((100u32..1000, 0u32..100), 1..8)
        ) {
            let batch: Vec<StockOutLine> = lines
                .iter()
                .enumerate()
                .map(|(i, (current, out))| {
                    out_line(i as u32, *current, StockStatus::InStock, Some(*out))
                })
                .collect();

            match plan_stock_out(&batch, None, &InventoryPolicy::default()) {
                Ok(changes) => {
                    for change in changes {
                        prop_assert_eq!(change.after, change.before - change.out);
                        prop_assert!(change.out > 0);
                    }
                }
                Err(e) => prop_assert_eq!(e, BatchError::NoPositiveQuantity),
            }
        }

        /// Restock never lowers quantity and always re-derives status.
        #[test]
        fn restock_is_monotonic(current in 0u32..5000, add in 0u32..5000) {
            let policy = InventoryPolicy::default();
            let changes = plan_restock(
                &[RestockLine {
                    item_id: item_id(1),
                    item_name: "x".to_string(),
                    current_qty: current,
                    add_qty: add,
                }],
                &policy,
            ).unwrap();
            prop_assert!(changes[0].after >= changes[0].before);
            prop_assert_eq!(changes[0].new_status, policy.thresholds.derive(changes[0].after));
        }
    }
}
