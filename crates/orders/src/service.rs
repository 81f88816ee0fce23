//! Persistence adapter for the order state machine.

use std::sync::{Arc, Mutex};

use chrono::Duration;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use clinistock_allocator::{allocate_with_fallback, AllocationError, AllocationStrategy};
use clinistock_auth::IdentityProvider;
use clinistock_core::{DomainError, ItemId, OrderId, StatusThresholds};
use clinistock_inventory::INVENTORY_COLLECTION;
use clinistock_storage::{decode, encode, Clock, DocumentStore, StorageError};

use crate::order::{Order, OrderDraft, OrderStatus, TransitionDecision, ORDERS_COLLECTION};
use crate::policy::OrderPolicy;

#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),
}

/// Outcome of a receive attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// The order was received and materialized into inventory.
    Received { item_id: ItemId },
    /// The order had already been materialized; nothing was created.
    AlreadyMoved,
    /// The lock window is still open; the order is untouched.
    Locked,
}

/// Outcome of a plain (non-receive) transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    Locked,
}

/// Order persistence service.
pub struct OrderService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    identity: Arc<dyn IdentityProvider>,
    policy: OrderPolicy,
    thresholds: StatusThresholds,
    rng: Mutex<StdRng>,
}

impl<S: DocumentStore> OrderService<S> {
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        identity: Arc<dyn IdentityProvider>,
        policy: OrderPolicy,
        thresholds: StatusThresholds,
    ) -> Self {
        Self::with_rng(
            store,
            clock,
            identity,
            policy,
            thresholds,
            StdRng::from_entropy(),
        )
    }

    /// Construct with a caller-supplied rng (deterministic in tests).
    pub fn with_rng(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        identity: Arc<dyn IdentityProvider>,
        policy: OrderPolicy,
        thresholds: StatusThresholds,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            clock,
            identity,
            policy,
            thresholds,
            rng: Mutex::new(rng),
        }
    }

    /// Place a new order.
    ///
    /// The id comes from the allocation chain (patterned, then sequential on
    /// the configured counter, then an auto id); the record is written by
    /// the winning allocation transaction itself.
    pub fn place_order(&self, draft: OrderDraft) -> Result<Order, OrderServiceError> {
        let now = self.clock.now();
        let actor = self.identity.current();
        let order = Order::place(
            // Placeholder id; the allocator patches the real one into the
            // document and we swap it in below.
            OrderId::new("unallocated")?,
            draft,
            now,
            Duration::hours(self.policy.lock_window_hours),
            actor.id,
        )?;
        let template = encode(&order)?;

        let strategy = AllocationStrategy::for_counter(self.policy.counter_name.clone());
        let id = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| StorageError::LockPoisoned)?;
            allocate_with_fallback(
                self.store.as_ref(),
                &mut *rng,
                ORDERS_COLLECTION,
                &strategy,
                |id| {
                    let mut doc = template.clone();
                    doc["id"] = serde_json::Value::String(id.to_string());
                    doc
                },
            )?
        };

        tracing::info!(order = %id, "order placed");
        Ok(Order {
            id: OrderId::new(id)?,
            ..order
        })
    }

    pub fn get_order(&self, order_id: &OrderId) -> Result<Order, OrderServiceError> {
        let doc = self
            .store
            .get(ORDERS_COLLECTION, order_id.as_str())?
            .ok_or_else(|| OrderServiceError::OrderNotFound(order_id.clone()))?;
        Ok(decode(doc)?)
    }

    /// Receive an order, materializing its inventory item exactly once.
    ///
    /// The status flip, the `moved_to_inventory` guard and the item insert
    /// are one atomic transaction, so a duplicate receive can never create
    /// a second item.
    pub fn receive_order(
        &self,
        order_id: &OrderId,
        override_lock: bool,
    ) -> Result<ReceiveOutcome, OrderServiceError> {
        let now = self.clock.now();
        // Pre-generated so the closure stays deterministic on retry.
        let item_id = ItemId::new(self.store.auto_id())?;

        let mut found = false;
        let mut domain_error: Option<DomainError> = None;
        let mut outcome = ReceiveOutcome::Locked;
        self.store.transact(&mut |tx| {
            let Some(doc) = tx.get(ORDERS_COLLECTION, order_id.as_str())? else {
                return Ok(());
            };
            found = true;
            let order: Order = decode(doc)?;

            // Duplicate receive: the guard makes this a benign no-op.
            if order.status == OrderStatus::Received && order.moved_to_inventory {
                outcome = ReceiveOutcome::AlreadyMoved;
                return Ok(());
            }

            match order.transition(OrderStatus::Received, now, override_lock) {
                Err(e) => {
                    domain_error = Some(e);
                    Ok(())
                }
                Ok(TransitionDecision::Locked) => {
                    outcome = ReceiveOutcome::Locked;
                    Ok(())
                }
                Ok(TransitionDecision::Apply(status)) => {
                    let mut updated = order.clone();
                    updated.status = status;
                    if updated.moved_to_inventory {
                        outcome = ReceiveOutcome::AlreadyMoved;
                    } else {
                        updated.moved_to_inventory = true;
                        let item = updated.materialize(item_id.clone(), &self.thresholds);
                        tx.insert(INVENTORY_COLLECTION, item.id.as_str(), encode(&item)?)?;
                        outcome = ReceiveOutcome::Received {
                            item_id: item_id.clone(),
                        };
                    }
                    tx.set(ORDERS_COLLECTION, order_id.as_str(), encode(&updated)?);
                    Ok(())
                }
            }
        })?;

        if !found {
            return Err(OrderServiceError::OrderNotFound(order_id.clone()));
        }
        if let Some(e) = domain_error {
            return Err(e.into());
        }
        if outcome == ReceiveOutcome::Locked {
            tracing::debug!(order = %order_id, "receive ignored, lock window still open");
        }
        Ok(outcome)
    }

    pub fn mark_pending(
        &self,
        order_id: &OrderId,
        override_lock: bool,
    ) -> Result<TransitionOutcome, OrderServiceError> {
        self.apply_transition(order_id, OrderStatus::Pending, override_lock)
    }

    pub fn cancel_order(
        &self,
        order_id: &OrderId,
        override_lock: bool,
    ) -> Result<TransitionOutcome, OrderServiceError> {
        self.apply_transition(order_id, OrderStatus::Cancelled, override_lock)
    }

    fn apply_transition(
        &self,
        order_id: &OrderId,
        target: OrderStatus,
        override_lock: bool,
    ) -> Result<TransitionOutcome, OrderServiceError> {
        let now = self.clock.now();
        let mut found = false;
        let mut domain_error: Option<DomainError> = None;
        let mut outcome = TransitionOutcome::Locked;
        self.store.transact(&mut |tx| {
            let Some(doc) = tx.get(ORDERS_COLLECTION, order_id.as_str())? else {
                return Ok(());
            };
            found = true;
            let order: Order = decode(doc)?;
            match order.transition(target, now, override_lock) {
                Err(e) => {
                    domain_error = Some(e);
                    Ok(())
                }
                Ok(TransitionDecision::Locked) => {
                    outcome = TransitionOutcome::Locked;
                    Ok(())
                }
                Ok(TransitionDecision::Apply(status)) => {
                    let mut updated = order;
                    updated.status = status;
                    tx.set(ORDERS_COLLECTION, order_id.as_str(), encode(&updated)?);
                    outcome = TransitionOutcome::Applied;
                    Ok(())
                }
            }
        })?;

        if !found {
            return Err(OrderServiceError::OrderNotFound(order_id.clone()));
        }
        if let Some(e) = domain_error {
            return Err(e.into());
        }
        if outcome == TransitionOutcome::Locked {
            tracing::debug!(order = %order_id, ?target, "transition ignored, lock window still open");
        }
        Ok(outcome)
    }
}
