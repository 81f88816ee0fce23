//! `clinistock-inventory` — the inventory quantity/status engine.
//!
//! Split the way the rest of the workspace is: pure decision logic in
//! [`engine`] (batch validation and quantity arithmetic, no IO), persistence
//! in [`service`] (a thin adapter committing decisions through the storage
//! contract, one atomic transaction per item).

pub mod engine;
pub mod item;
pub mod policy;
pub mod service;
pub mod stock_log;

pub use engine::{
    plan_restock, plan_stock_out, BatchError, RestockChange, RestockLine, StockOutChange,
    StockOutLine,
};
pub use item::{InventoryItem, ItemDraft, INVENTORY_COLLECTION};
pub use policy::InventoryPolicy;
pub use service::{
    CommitReport, FailedItem, InventoryService, InventoryServiceError, RestockRequest,
    StockOutRequest,
};
pub use stock_log::{StockLogEntry, StockLogKind, STOCK_LOG_COLLECTION};
