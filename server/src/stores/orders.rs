// comanda_server/src/stores/orders.rs

use crate::models::order::{items_json, OrderRow};
use crate::stores::db_err;
use async_trait::async_trait;
use comanda_core::{EngineResult, Order, OrderStatus, OrderStore};
use sqlx::PgPool;
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, tracking_number, name, email, phone1, phone2, address, items, total_cents, \
                             status, payment_method, payment_status, gateway_session_id, estimated_delivery, \
                             created_at, updated_at";

pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    PgOrderStore { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  async fn insert(&self, order: &Order) -> EngineResult<()> {
    sqlx::query(
      "INSERT INTO orders (id, tracking_number, name, email, phone1, phone2, address, items, total_cents, \
       status, payment_method, payment_status, gateway_session_id, estimated_delivery, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(order.id)
    .bind(&order.tracking_number)
    .bind(&order.customer.name)
    .bind(&order.customer.email)
    .bind(&order.customer.phone1)
    .bind(&order.customer.phone2)
    .bind(&order.customer.address)
    .bind(items_json(order)?)
    .bind(order.total_cents)
    .bind(order.status.as_str())
    .bind(order.payment_method.as_str())
    .bind(order.payment_status.as_str())
    .bind(&order.gateway_session_id)
    .bind(order.estimated_delivery)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await
    .map_err(db_err)?;
    Ok(())
  }

  async fn get(&self, id: Uuid) -> EngineResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_err)?;
    row.map(OrderRow::into_domain).transpose()
  }

  async fn get_by_tracking(&self, tracking_number: &str) -> EngineResult<Option<Order>> {
    let row: Option<OrderRow> =
      sqlx::query_as(&format!("SELECT {} FROM orders WHERE tracking_number = $1", ORDER_COLUMNS))
        .bind(tracking_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
    row.map(OrderRow::into_domain).transpose()
  }

  async fn list(&self) -> EngineResult<Vec<Order>> {
    let rows: Vec<OrderRow> =
      sqlx::query_as(&format!("SELECT {} FROM orders ORDER BY created_at DESC", ORDER_COLUMNS))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
    rows.into_iter().map(OrderRow::into_domain).collect()
  }

  async fn update(&self, order: &Order) -> EngineResult<()> {
    sqlx::query(
      "UPDATE orders SET tracking_number = $2, items = $3, total_cents = $4, status = $5, \
       payment_method = $6, payment_status = $7, gateway_session_id = $8, estimated_delivery = $9, \
       updated_at = $10 WHERE id = $1",
    )
    .bind(order.id)
    .bind(&order.tracking_number)
    .bind(items_json(order)?)
    .bind(order.total_cents)
    .bind(order.status.as_str())
    .bind(order.payment_method.as_str())
    .bind(order.payment_status.as_str())
    .bind(&order.gateway_session_id)
    .bind(order.estimated_delivery)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await
    .map_err(db_err)?;
    Ok(())
  }

  async fn update_if_status(&self, order: &Order, expected: OrderStatus) -> EngineResult<bool> {
    // The status predicate makes the transition check atomic with its
    // effect: a concurrent writer that already changed the status causes
    // this update to touch zero rows.
    let result = sqlx::query(
      "UPDATE orders SET tracking_number = $3, status = $4, payment_status = $5, \
       gateway_session_id = $6, updated_at = $7 WHERE id = $1 AND status = $2",
    )
    .bind(order.id)
    .bind(expected.as_str())
    .bind(&order.tracking_number)
    .bind(order.status.as_str())
    .bind(order.payment_status.as_str())
    .bind(&order.gateway_session_id)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await
    .map_err(db_err)?;
    Ok(result.rows_affected() == 1)
  }

  async fn delete(&self, id: Uuid) -> EngineResult<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(db_err)?;
    Ok(result.rows_affected() == 1)
  }
}
