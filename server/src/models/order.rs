// comanda_server/src/models/order.rs

use chrono::{DateTime, Utc};
use comanda_core::{CustomerInfo, EngineError, EngineResult, Order, OrderItem, PaymentMethod, PaymentStatus};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the `orders` table. Line items are a JSONB snapshot; enums
/// are stored as their wire literals.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: Uuid,
  pub tracking_number: Option<String>,
  pub name: String,
  pub email: String,
  pub phone1: String,
  pub phone2: Option<String>,
  pub address: String,
  pub items: JsonValue,
  pub total_cents: i64,
  pub status: String,
  pub payment_method: String,
  pub payment_status: String,
  pub gateway_session_id: Option<String>,
  pub estimated_delivery: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl OrderRow {
  pub fn into_domain(self) -> EngineResult<Order> {
    let items: Vec<OrderItem> = serde_json::from_value(self.items)
      .map_err(|e| EngineError::store(anyhow::anyhow!("order {} has malformed items: {}", self.id, e)))?;
    let status = self
      .status
      .parse()
      .map_err(|_| EngineError::store(anyhow::anyhow!("order {} has unknown status '{}'", self.id, self.status)))?;
    let payment_method = PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
      EngineError::store(anyhow::anyhow!(
        "order {} has unknown payment method '{}'",
        self.id,
        self.payment_method
      ))
    })?;
    let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
      EngineError::store(anyhow::anyhow!(
        "order {} has unknown payment status '{}'",
        self.id,
        self.payment_status
      ))
    })?;

    Ok(Order {
      id: self.id,
      tracking_number: self.tracking_number,
      customer: CustomerInfo {
        name: self.name,
        email: self.email,
        phone1: self.phone1,
        phone2: self.phone2,
        address: self.address,
      },
      items,
      total_cents: self.total_cents,
      status,
      payment_method,
      payment_status,
      gateway_session_id: self.gateway_session_id,
      estimated_delivery: self.estimated_delivery,
      created_at: self.created_at,
      updated_at: self.updated_at,
    })
  }
}

pub fn items_json(order: &Order) -> EngineResult<JsonValue> {
  serde_json::to_value(&order.items)
    .map_err(|e| EngineError::store(anyhow::anyhow!("order {} items not serializable: {}", order.id, e)))
}
