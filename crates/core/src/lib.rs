//! `clinistock-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, category canonicalization, the stock-status value object
//! and its threshold derivation, and the domain error model.

pub mod category;
pub mod error;
pub mod id;
pub mod money;
pub mod status;

pub use category::Category;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, LogEntryId, OrderId};
pub use money::UnitCost;
pub use status::{StatusThresholds, StockStatus};
