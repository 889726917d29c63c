// comanda_core/src/store.rs

//! Persistence seams for orders and payment records.
//!
//! Each operation is a single-record read or write. `update_if_status` is
//! the conditional write the transition paths use so that a validated
//! transition is atomic with its effect: the update applies only if the
//! stored status still equals the status the validation ran against.

use crate::error::EngineResult;
use crate::order::Order;
use crate::payment::Payment;
use crate::status::OrderStatus;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert(&self, order: &Order) -> EngineResult<()>;

  async fn get(&self, id: Uuid) -> EngineResult<Option<Order>>;

  async fn get_by_tracking(&self, tracking_number: &str) -> EngineResult<Option<Order>>;

  /// All orders, newest first.
  async fn list(&self) -> EngineResult<Vec<Order>>;

  async fn update(&self, order: &Order) -> EngineResult<()>;

  /// Writes `order` only if the stored record still has status `expected`.
  /// Returns whether the write applied.
  async fn update_if_status(&self, order: &Order, expected: OrderStatus) -> EngineResult<bool>;

  /// Returns whether a record was deleted.
  async fn delete(&self, id: Uuid) -> EngineResult<bool>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
  async fn insert(&self, payment: &Payment) -> EngineResult<()>;

  async fn get(&self, id: Uuid) -> EngineResult<Option<Payment>>;

  async fn get_by_reference(&self, reference: &str) -> EngineResult<Option<Payment>>;

  /// All payment records, newest first.
  async fn list(&self) -> EngineResult<Vec<Payment>>;

  async fn update(&self, payment: &Payment) -> EngineResult<()>;

  /// Inserts or replaces the record with the same `reference`. The stored
  /// record keeps its original `id` and `created_at` when one exists.
  /// Returns the stored record.
  async fn upsert_by_reference(&self, payment: &Payment) -> EngineResult<Payment>;
}
