// comanda_core/src/order.rs

//! Order records and their line-item snapshots.

use crate::status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
  #[serde(rename = "cod")]
  CashOnDelivery,
  #[serde(rename = "stripe")]
  HostedCheckout,
}

impl PaymentMethod {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentMethod::CashOnDelivery => "cod",
      PaymentMethod::HostedCheckout => "stripe",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "cod" => Some(PaymentMethod::CashOnDelivery),
      "stripe" => Some(PaymentMethod::HostedCheckout),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
  Pending,
  Paid,
}

impl PaymentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentStatus::Pending => "Pending",
      PaymentStatus::Paid => "Paid",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "Pending" => Some(PaymentStatus::Pending),
      "Paid" => Some(PaymentStatus::Paid),
      _ => None,
    }
  }
}

/// Customer details copied onto the order at creation time. Not a live
/// reference to any customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
  pub name: String,
  pub email: String,
  pub phone1: String,
  pub phone2: Option<String>,
  pub address: String,
}

/// A point-in-time snapshot of a catalog item. Name and price integrity
/// after later catalog changes is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
  pub menu_id: i64,
  pub name: String,
  pub unit_price_cents: i64,
  pub quantity: u32,
}

impl OrderItem {
  pub fn line_total_cents(&self) -> i64 {
    self.unit_price_cents * i64::from(self.quantity)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  /// Human-facing identifier, assigned at most once and never regenerated.
  pub tracking_number: Option<String>,
  pub customer: CustomerInfo,
  pub items: Vec<OrderItem>,
  /// Computed once at creation; stored, not recomputed on read.
  pub total_cents: i64,
  pub status: OrderStatus,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  /// Set only when a hosted checkout session has been created.
  pub gateway_session_id: Option<String>,
  /// Set externally by an administrator, never derived here.
  pub estimated_delivery: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  pub fn total_of(items: &[OrderItem]) -> i64 {
    items.iter().map(OrderItem::line_total_cents).sum()
  }
}

/// The customer-visible view returned by guest lookups. Omits the customer
/// snapshot beyond what the guest already supplied.
#[derive(Debug, Clone, Serialize)]
pub struct OrderProjection {
  #[serde(rename = "trackingNumber")]
  pub tracking_number: Option<String>,
  pub status: OrderStatus,
  #[serde(rename = "paymentStatus")]
  pub payment_status: PaymentStatus,
  #[serde(rename = "totalCents")]
  pub total_cents: i64,
  pub items: Vec<OrderItem>,
  #[serde(rename = "estimatedDelivery")]
  pub estimated_delivery: Option<DateTime<Utc>>,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "gatewaySessionId")]
  pub gateway_session_id: Option<String>,
}

impl From<&Order> for OrderProjection {
  fn from(order: &Order) -> Self {
    OrderProjection {
      tracking_number: order.tracking_number.clone(),
      status: order.status,
      payment_status: order.payment_status,
      total_cents: order.total_cents,
      items: order.items.clone(),
      estimated_delivery: order.estimated_delivery,
      created_at: order.created_at,
      gateway_session_id: order.gateway_session_id.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_sums_line_items() {
    // 6.50 x2 + 3.00 x1 = 16.00
    let items = vec![
      OrderItem { menu_id: 1, name: "Jollof Rice".into(), unit_price_cents: 650, quantity: 2 },
      OrderItem { menu_id: 2, name: "Puff Puff".into(), unit_price_cents: 300, quantity: 1 },
    ];
    assert_eq!(Order::total_of(&items), 1600);
  }

  #[test]
  fn payment_method_wire_literals() {
    assert_eq!(PaymentMethod::CashOnDelivery.as_str(), "cod");
    assert_eq!(PaymentMethod::HostedCheckout.as_str(), "stripe");
    assert_eq!(PaymentMethod::parse("stripe"), Some(PaymentMethod::HostedCheckout));
    assert_eq!(PaymentMethod::parse("card"), None);
  }
}
