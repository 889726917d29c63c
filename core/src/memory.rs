// comanda_core/src/memory.rs

//! In-memory store implementations.
//!
//! Reference implementations of the persistence seams, backed by
//! `parking_lot` maps. The engine's integration tests run against these;
//! they are also handy for local tooling that does not want a database.

use crate::error::EngineResult;
use crate::order::Order;
use crate::payment::Payment;
use crate::status::OrderStatus;
use crate::store::{OrderStore, PaymentStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryOrderStore {
  inner: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.inner.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.read().is_empty()
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn insert(&self, order: &Order) -> EngineResult<()> {
    self.inner.write().insert(order.id, order.clone());
    Ok(())
  }

  async fn get(&self, id: Uuid) -> EngineResult<Option<Order>> {
    Ok(self.inner.read().get(&id).cloned())
  }

  async fn get_by_tracking(&self, tracking_number: &str) -> EngineResult<Option<Order>> {
    Ok(
      self
        .inner
        .read()
        .values()
        .find(|order| order.tracking_number.as_deref() == Some(tracking_number))
        .cloned(),
    )
  }

  async fn list(&self) -> EngineResult<Vec<Order>> {
    let mut orders: Vec<Order> = self.inner.read().values().cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }

  async fn update(&self, order: &Order) -> EngineResult<()> {
    self.inner.write().insert(order.id, order.clone());
    Ok(())
  }

  async fn update_if_status(&self, order: &Order, expected: OrderStatus) -> EngineResult<bool> {
    let mut guard = self.inner.write();
    match guard.get(&order.id) {
      Some(stored) if stored.status == expected => {
        guard.insert(order.id, order.clone());
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn delete(&self, id: Uuid) -> EngineResult<bool> {
    Ok(self.inner.write().remove(&id).is_some())
  }
}

#[derive(Default)]
pub struct MemoryPaymentStore {
  inner: RwLock<HashMap<Uuid, Payment>>,
}

impl MemoryPaymentStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.inner.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.read().is_empty()
  }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
  async fn insert(&self, payment: &Payment) -> EngineResult<()> {
    self.inner.write().insert(payment.id, payment.clone());
    Ok(())
  }

  async fn get(&self, id: Uuid) -> EngineResult<Option<Payment>> {
    Ok(self.inner.read().get(&id).cloned())
  }

  async fn get_by_reference(&self, reference: &str) -> EngineResult<Option<Payment>> {
    Ok(
      self
        .inner
        .read()
        .values()
        .find(|payment| payment.reference == reference)
        .cloned(),
    )
  }

  async fn list(&self) -> EngineResult<Vec<Payment>> {
    let mut payments: Vec<Payment> = self.inner.read().values().cloned().collect();
    payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(payments)
  }

  async fn update(&self, payment: &Payment) -> EngineResult<()> {
    self.inner.write().insert(payment.id, payment.clone());
    Ok(())
  }

  async fn upsert_by_reference(&self, payment: &Payment) -> EngineResult<Payment> {
    let mut guard = self.inner.write();
    let existing = guard.values().find(|p| p.reference == payment.reference).cloned();
    let stored = match existing {
      Some(previous) => {
        // Keep the original identity; replace the rest.
        let mut replacement = payment.clone();
        replacement.id = previous.id;
        replacement.created_at = previous.created_at;
        replacement
      }
      None => payment.clone(),
    };
    guard.insert(stored.id, stored.clone());
    Ok(stored)
  }
}
