//! `clinistock-orders` — order lifecycle and lock state machine.
//!
//! Orders are pre-inventory records. They are created `Ordered` with a lock
//! window during which status changes are ignored; once unlocked they move
//! to `Received` (materializing an inventory item exactly once), `Pending`,
//! or `Cancelled`. Transition decisions are pure; persistence happens in
//! [`service::OrderService`] through the storage contract.

pub mod order;
pub mod policy;
pub mod service;


pub use order::{Order, OrderDraft, OrderStatus, TransitionDecision, ORDERS_COLLECTION};
pub use policy::OrderPolicy;
pub use service::{OrderService, OrderServiceError, ReceiveOutcome, TransitionOutcome};
