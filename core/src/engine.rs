// comanda_core/src/engine.rs

//! The order lifecycle engine.
//!
//! Owns guest order creation, requested status transitions (with the
//! hosted-checkout session side effect on confirmation), cash-on-delivery
//! settlement, guest lookups, and the standalone payment-record flow. All
//! I/O goes through the collaborator traits; the engine itself holds no
//! mutable state.

use crate::error::{EngineError, EngineResult};
use crate::gateway::{CheckoutLineItem, CheckoutSession, CheckoutSessionRequest, PaymentGateway};
use crate::idgen;
use crate::notify::NotificationDispatcher;
use crate::order::{CustomerInfo, Order, OrderItem, OrderProjection, PaymentMethod, PaymentStatus};
use crate::payment::{Payment, PaymentRecordMethod, PaymentRecordStatus, PayerInfo};
use crate::status::{validate_transition, OrderStatus, Transition};
use crate::store::{OrderStore, PaymentStore};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Base URL of the customer-facing frontend, used for the gateway's
  /// success/cancel redirects.
  pub client_base_url: String,
  /// ISO currency code for orders and gateway sessions, e.g. "GBP".
  pub currency: String,
  /// Channel key for admin push events.
  pub admin_channel: String,
}

impl Default for EngineConfig {
  fn default() -> Self {
    EngineConfig {
      client_base_url: "http://localhost:3000".to_string(),
      currency: "GBP".to_string(),
      admin_channel: "admin-orders".to_string(),
    }
  }
}

/// Input for guest order creation. Line items arrive already resolved
/// against the menu catalog; the engine snapshots them as-is.
#[derive(Debug, Clone)]
pub struct GuestOrderDraft {
  pub customer: CustomerInfo,
  pub items: Vec<OrderItem>,
  pub payment_method: PaymentMethod,
}

/// Input for the standalone guest payment-record flow.
#[derive(Debug, Clone)]
pub struct GuestPaymentDraft {
  pub payer: PayerInfo,
  pub amount_cents: i64,
  pub method: Option<PaymentRecordMethod>,
  pub description: Option<String>,
  pub order_id: Option<Uuid>,
}

/// Admin-side change to a payment record.
#[derive(Debug, Clone, Default)]
pub struct PaymentStatusChange {
  pub status: Option<PaymentRecordStatus>,
  pub verified_by_admin: Option<bool>,
  pub transaction_id: Option<String>,
}

/// Result of a successful requested transition. `payment_url` is only
/// present when the transition produced a hosted checkout session.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
  pub order: Order,
  pub payment_url: Option<String>,
}

pub struct LifecycleEngine {
  orders: Arc<dyn OrderStore>,
  payments: Arc<dyn PaymentStore>,
  gateway: Arc<dyn PaymentGateway>,
  notifier: Arc<dyn NotificationDispatcher>,
  config: EngineConfig,
}

impl LifecycleEngine {
  pub fn new(
    orders: Arc<dyn OrderStore>,
    payments: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn NotificationDispatcher>,
    config: EngineConfig,
  ) -> Self {
    LifecycleEngine {
      orders,
      payments,
      gateway,
      notifier,
      config,
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub(crate) fn orders(&self) -> &dyn OrderStore {
    self.orders.as_ref()
  }

  pub(crate) fn payments(&self) -> &dyn PaymentStore {
    self.payments.as_ref()
  }

  pub(crate) fn gateway(&self) -> &dyn PaymentGateway {
    self.gateway.as_ref()
  }

  // --- Guest orders ---

  #[instrument(name = "engine::create_guest_order", skip(self, draft), fields(payment_method = draft.payment_method.as_str()))]
  pub async fn create_guest_order(&self, draft: GuestOrderDraft) -> EngineResult<Order> {
    validate_customer(&draft.customer)?;
    validate_items(&draft.items)?;

    let now = Utc::now();
    let order = Order {
      id: Uuid::new_v4(),
      tracking_number: Some(idgen::tracking_number()),
      total_cents: Order::total_of(&draft.items),
      customer: draft.customer,
      items: draft.items,
      status: OrderStatus::Pending,
      payment_method: draft.payment_method,
      payment_status: PaymentStatus::Pending,
      gateway_session_id: None,
      estimated_delivery: None,
      created_at: now,
      updated_at: now,
    };

    self.orders.insert(&order).await?;
    info!(order_id = %order.id, tracking = ?order.tracking_number, total_cents = order.total_cents, "Guest order created");

    let (subject, body) = order_received_email(&order);
    self.best_effort_email(&order.customer.email, &subject, &body).await;
    self
      .best_effort_push(
        "order-created",
        json!({
          "orderId": order.id,
          "trackingNumber": order.tracking_number,
          "totalCents": order.total_cents,
          "paymentMethod": order.payment_method.as_str(),
        }),
      )
      .await;

    Ok(order)
  }

  pub async fn get_order(&self, order_id: Uuid) -> EngineResult<Order> {
    self
      .orders
      .get(order_id)
      .await?
      .ok_or_else(|| EngineError::NotFound(format!("Order {}", order_id)))
  }

  pub async fn order_projection(&self, order_id: Uuid) -> EngineResult<OrderProjection> {
    Ok(OrderProjection::from(&self.get_order(order_id).await?))
  }

  /// Guest lookup by tracking number, with an optional exact-match email
  /// filter. The filter is plain string equality, nothing stronger.
  #[instrument(name = "engine::track", skip(self, email))]
  pub async fn track(&self, tracking_number: &str, email: Option<&str>) -> EngineResult<OrderProjection> {
    let order = self
      .orders
      .get_by_tracking(tracking_number)
      .await?
      .filter(|order| email.map_or(true, |e| order.customer.email == e))
      .ok_or_else(|| EngineError::NotFound("Order not found with provided details".to_string()))?;
    Ok(OrderProjection::from(&order))
  }

  pub async fn list_orders(&self) -> EngineResult<Vec<Order>> {
    self.orders.list().await
  }

  #[instrument(name = "engine::delete_order", skip(self))]
  pub async fn delete_order(&self, order_id: Uuid) -> EngineResult<()> {
    if !self.orders.delete(order_id).await? {
      return Err(EngineError::NotFound(format!("Order {}", order_id)));
    }
    info!(%order_id, "Order deleted");
    Ok(())
  }

  // --- Status transitions ---

  /// Applies an admin-requested status change. On `Confirmed` with a
  /// hosted-checkout order this also requests a checkout session; gateway
  /// failure is logged and the transition completes without a payment
  /// link. The write is conditional on the status the validation saw.
  #[instrument(name = "engine::request_status", skip(self), fields(requested = requested.as_str()))]
  pub async fn request_status(&self, order_id: Uuid, requested: OrderStatus) -> EngineResult<TransitionOutcome> {
    let mut order = self.get_order(order_id).await?;
    let previous = order.status;
    order.status = validate_transition(previous, Transition::Requested(requested))?;

    if order.tracking_number.is_none() {
      order.tracking_number = Some(idgen::tracking_number());
    }

    let mut payment_url = None;
    if order.status == OrderStatus::Confirmed && order.payment_method == PaymentMethod::HostedCheckout {
      match self.gateway.create_checkout_session(self.order_session_request(&order)).await {
        Ok(CheckoutSession { id, url }) => {
          order.gateway_session_id = Some(id);
          payment_url = Some(url);
        }
        Err(e) => {
          // Soft-fail: the status still changes, the customer just gets no
          // payment link. Not retried here.
          warn!(order_id = %order.id, error = %e, "Checkout session creation failed; continuing without payment link");
        }
      }
    }

    order.updated_at = Utc::now();
    if !self.orders.update_if_status(&order, previous).await? {
      return Err(EngineError::Conflict(format!(
        "Order {} was updated concurrently; transition from {} not applied",
        order.id, previous
      )));
    }
    info!(order_id = %order.id, from = previous.as_str(), to = order.status.as_str(), "Order status updated");

    let (subject, body) = status_email(&order, payment_url.as_deref());
    self.best_effort_email(&order.customer.email, &subject, &body).await;

    Ok(TransitionOutcome { order, payment_url })
  }

  /// Marks a cash-on-delivery order as paid. Payment collected out-of-band;
  /// only explicit administrative action moves it to `Paid`.
  #[instrument(name = "engine::mark_cod_paid", skip(self))]
  pub async fn mark_cod_paid(&self, order_id: Uuid) -> EngineResult<Order> {
    let mut order = self.get_order(order_id).await?;
    if order.payment_method != PaymentMethod::CashOnDelivery {
      return Err(EngineError::Validation(
        "Only cash-on-delivery payments can be marked manually".to_string(),
      ));
    }
    order.payment_status = PaymentStatus::Paid;
    order.updated_at = Utc::now();
    self.orders.update(&order).await?;
    info!(%order_id, "Cash-on-delivery payment marked as paid");
    Ok(order)
  }

  pub async fn set_estimated_delivery(
    &self,
    order_id: Uuid,
    estimated_delivery: Option<chrono::DateTime<Utc>>,
  ) -> EngineResult<Order> {
    let mut order = self.get_order(order_id).await?;
    order.estimated_delivery = estimated_delivery;
    order.updated_at = Utc::now();
    self.orders.update(&order).await?;
    Ok(order)
  }

  // --- Standalone payment records ---

  #[instrument(name = "engine::create_guest_payment", skip(self, draft))]
  pub async fn create_guest_payment(&self, draft: GuestPaymentDraft) -> EngineResult<Payment> {
    if draft.payer.full_name.trim().is_empty() || draft.payer.email.trim().is_empty() {
      return Err(EngineError::Validation("Full name, email, and amount are required".to_string()));
    }
    if draft.amount_cents <= 0 {
      return Err(EngineError::Validation("Amount must be greater than zero".to_string()));
    }

    let now = Utc::now();
    let payment = Payment {
      id: Uuid::new_v4(),
      reference: idgen::payment_reference(),
      payer: draft.payer,
      amount_cents: draft.amount_cents,
      currency: self.config.currency.clone(),
      method: draft.method.unwrap_or(PaymentRecordMethod::Card),
      status: PaymentRecordStatus::Pending,
      verified_by_admin: false,
      transaction_id: None,
      paid_at: None,
      description: draft.description,
      order_id: draft.order_id,
      created_at: now,
      updated_at: now,
    };

    self.payments.insert(&payment).await?;
    info!(payment_id = %payment.id, reference = %payment.reference, "Guest payment record created");

    let (subject, body) = payment_received_email(&payment);
    self.best_effort_email(&payment.payer.email, &subject, &body).await;

    Ok(payment)
  }

  pub async fn get_payment(&self, payment_id: Uuid) -> EngineResult<Payment> {
    self
      .payments
      .get(payment_id)
      .await?
      .ok_or_else(|| EngineError::NotFound(format!("Payment {}", payment_id)))
  }

  pub async fn list_payments(&self) -> EngineResult<Vec<Payment>> {
    self.payments.list().await
  }

  /// Creates a hosted checkout session for a standalone payment record.
  /// Gated: an administrator must have verified the record first. Gateway
  /// errors surface to the caller here — unlike the order-confirmation
  /// side effect, there is no transition to protect.
  #[instrument(name = "engine::create_payment_session", skip(self))]
  pub async fn create_payment_session(&self, payment_id: Uuid) -> EngineResult<CheckoutSession> {
    let payment = self.get_payment(payment_id).await?;
    if !payment.verified_by_admin {
      return Err(EngineError::Forbidden(
        "Admin has not verified this payment yet".to_string(),
      ));
    }

    let mut metadata = HashMap::new();
    metadata.insert("paymentId".to_string(), payment.id.to_string());
    metadata.insert("reference".to_string(), payment.reference.clone());

    let request = CheckoutSessionRequest {
      line_items: vec![CheckoutLineItem {
        name: payment.description.clone().unwrap_or_else(|| "Order Payment".to_string()),
        unit_amount_cents: payment.amount_cents,
        quantity: 1,
      }],
      currency: payment.currency.to_lowercase(),
      customer_email: payment.payer.email.clone(),
      success_url: format!(
        "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
        self.config.client_base_url
      ),
      cancel_url: format!("{}/payment-cancel", self.config.client_base_url),
      metadata,
    };

    self.gateway.create_checkout_session(request).await
  }

  #[instrument(name = "engine::update_payment_status", skip(self, change))]
  pub async fn update_payment_status(&self, payment_id: Uuid, change: PaymentStatusChange) -> EngineResult<Payment> {
    let mut payment = self.get_payment(payment_id).await?;
    let now = Utc::now();

    if let Some(verified) = change.verified_by_admin {
      payment.verified_by_admin = verified;
    }
    if let Some(transaction_id) = change.transaction_id {
      if payment.transaction_id.is_none() {
        payment.transaction_id = Some(transaction_id);
      }
    }
    if let Some(status) = change.status {
      if status == PaymentRecordStatus::Paid {
        payment.mark_paid(None, now);
      } else {
        payment.status = status;
      }
    }
    payment.updated_at = now;

    self.payments.update(&payment).await?;
    Ok(payment)
  }

  pub async fn mark_payment_paid(&self, payment_id: Uuid, transaction_id: Option<String>) -> EngineResult<Payment> {
    let mut payment = self.get_payment(payment_id).await?;
    payment.mark_paid(transaction_id.as_deref(), Utc::now());
    self.payments.update(&payment).await?;
    info!(%payment_id, "Payment record marked as paid");
    Ok(payment)
  }

  // --- Internals shared with the reconciliation path ---

  pub(crate) fn order_session_request(&self, order: &Order) -> CheckoutSessionRequest {
    let mut metadata = HashMap::new();
    metadata.insert("orderId".to_string(), order.id.to_string());
    CheckoutSessionRequest {
      line_items: order
        .items
        .iter()
        .map(|item| CheckoutLineItem {
          name: item.name.clone(),
          unit_amount_cents: item.unit_price_cents,
          quantity: item.quantity,
        })
        .collect(),
      currency: self.config.currency.to_lowercase(),
      customer_email: order.customer.email.clone(),
      success_url: format!("{}/order-success?orderId={}", self.config.client_base_url, order.id),
      cancel_url: format!("{}/cancel-payment?orderId={}", self.config.client_base_url, order.id),
      metadata,
    }
  }

  pub(crate) async fn best_effort_email(&self, to: &str, subject: &str, html_body: &str) {
    if let Err(e) = self.notifier.send_email(to, subject, html_body).await {
      warn!(to, subject, error = %e, "Email dispatch failed; continuing");
    }
  }

  pub(crate) async fn best_effort_push(&self, event: &str, payload: serde_json::Value) {
    if let Err(e) = self.notifier.push_admin_event(&self.config.admin_channel, event, payload).await {
      warn!(event, error = %e, "Admin push failed; continuing");
    }
  }
}

fn validate_customer(customer: &CustomerInfo) -> EngineResult<()> {
  if customer.name.trim().is_empty()
    || customer.email.trim().is_empty()
    || customer.phone1.trim().is_empty()
    || customer.address.trim().is_empty()
  {
    return Err(EngineError::Validation(
      "Missing required customer information".to_string(),
    ));
  }
  if !customer.email.contains('@') {
    return Err(EngineError::Validation("Please enter a valid email address".to_string()));
  }
  Ok(())
}

fn validate_items(items: &[OrderItem]) -> EngineResult<()> {
  if items.is_empty() {
    return Err(EngineError::Validation("No items in order".to_string()));
  }
  for item in items {
    if item.quantity == 0 {
      return Err(EngineError::Validation(format!(
        "Item '{}' has zero quantity",
        item.name
      )));
    }
    if item.unit_price_cents <= 0 {
      return Err(EngineError::Validation(format!(
        "Item '{}' has a non-positive price",
        item.name
      )));
    }
  }
  Ok(())
}

pub(crate) fn format_amount(cents: i64) -> String {
  format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

fn order_received_email(order: &Order) -> (String, String) {
  let subject = "Order Received!".to_string();
  let item_lines: String = order
    .items
    .iter()
    .map(|item| {
      format!(
        "<li>{} x{} ({})</li>",
        item.name,
        item.quantity,
        format_amount(item.unit_price_cents)
      )
    })
    .collect();
  let body = format!(
    "<h2>Hi {},</h2>\
     <p>Your order has been received, totaling <strong>{}</strong>.</p>\
     <p><strong>Tracking Number:</strong> {}</p>\
     <ul>{}</ul>\
     <p>We will notify you when your order is confirmed and ready for delivery.</p>",
    order.customer.name,
    format_amount(order.total_cents),
    order.tracking_number.as_deref().unwrap_or("-"),
    item_lines,
  );
  (subject, body)
}

fn status_email(order: &Order, payment_url: Option<&str>) -> (String, String) {
  let tracking = order.tracking_number.as_deref().unwrap_or("-");
  let (subject, message) = match order.status {
    OrderStatus::Confirmed => match payment_url {
      Some(url) => (
        "Your order is confirmed!".to_string(),
        format!(
          "Your order has been confirmed! Please complete your online payment:<br/>\
           <a href=\"{}\">Pay Online Now</a><br/>\
           Tracking Number: {}<br/>Total: {}",
          url,
          tracking,
          format_amount(order.total_cents)
        ),
      ),
      None => (
        "Your order is confirmed!".to_string(),
        format!("Your order has been confirmed. Tracking Number: {}", tracking),
      ),
    },
    OrderStatus::Processing => (
      "Your order is being processed!".to_string(),
      "Your order is now in processing.".to_string(),
    ),
    OrderStatus::OutForDelivery => (
      "Your order is out for delivery!".to_string(),
      "Your order is on the way.".to_string(),
    ),
    OrderStatus::Delivered => (
      "Your order has been delivered!".to_string(),
      format!(
        "Your order has been delivered successfully. Payment status: {}",
        order.payment_status.as_str()
      ),
    ),
    OrderStatus::Cancelled => (
      "Your order has been cancelled".to_string(),
      "Your order has been cancelled. Please contact us if this is a mistake.".to_string(),
    ),
    other => (
      format!("Order Status Updated: {}", other),
      format!("Your order status is now: {}", other),
    ),
  };

  let body = format!("<h2>Hi {},</h2><p>{}</p>", order.customer.name, message);
  (subject, body)
}

fn payment_received_email(payment: &Payment) -> (String, String) {
  let subject = "Payment Received".to_string();
  let body = format!(
    "<h2>Hi {},</h2>\
     <p>Your payment of {} {} has been received.</p>\
     <p><strong>Reference:</strong> {}</p>",
    payment.payer.full_name,
    format_amount(payment.amount_cents),
    payment.currency,
    payment.reference,
  );
  (subject, body)
}

pub(crate) fn payment_confirmed_email(order: &Order) -> (String, String) {
  let subject = "Payment Successful!".to_string();
  let body = format!(
    "<h2>Hi {},</h2>\
     <p>Your payment of <strong>{}</strong> has been successfully received.</p>\
     <p>Your order is now being processed.</p>\
     <p><strong>Tracking Number:</strong> {}</p>",
    order.customer.name,
    format_amount(order.total_cents),
    order.tracking_number.as_deref().unwrap_or("-"),
  );
  (subject, body)
}
