// comanda_core/src/gateway.rs

//! The payment gateway seam.
//!
//! The engine never talks HTTP itself; it asks a `PaymentGateway` for a
//! hosted checkout session and hands it raw webhook payloads to verify.
//! The server supplies a Stripe-style implementation; tests supply mocks.

use crate::error::EngineResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// One line item of a checkout session, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLineItem {
  pub name: String,
  pub unit_amount_cents: i64,
  pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
  pub line_items: Vec<CheckoutLineItem>,
  pub currency: String,
  pub customer_email: String,
  pub success_url: String,
  pub cancel_url: String,
  /// Attached to the session and echoed back in the completion event.
  pub metadata: HashMap<String, String>,
}

/// The gateway's reference to a hosted checkout flow. The customer
/// completes payment at `url`; this system only ever sees the id again,
/// in the asynchronous completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
  pub id: String,
  pub url: String,
}

pub const EVENT_CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// A verified, parsed gateway event.
#[derive(Debug, Clone, Default)]
pub struct GatewayEvent {
  pub event_type: String,
  pub session_id: String,
  pub payment_intent: Option<String>,
  pub amount_total_cents: Option<i64>,
  pub currency: Option<String>,
  pub customer_email: Option<String>,
  pub metadata: HashMap<String, String>,
}

impl GatewayEvent {
  pub fn is_checkout_completed(&self) -> bool {
    self.event_type == EVENT_CHECKOUT_COMPLETED
  }

  /// Parses a gateway event envelope of the form
  /// `{"type": ..., "data": {"object": {...}}}`. Call only after the
  /// signature over the raw payload has been verified.
  pub fn from_json_payload(payload: &[u8]) -> crate::error::EngineResult<Self> {
    use serde_json::Value;

    let value: Value = serde_json::from_slice(payload)
      .map_err(|e| crate::error::EngineError::Validation(format!("Invalid JSON payload: {}", e)))?;

    let event_type = value
      .get("type")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string();
    let object = value.pointer("/data/object").cloned().unwrap_or(Value::Null);

    let metadata = object
      .get("metadata")
      .and_then(Value::as_object)
      .map(|map| {
        map
          .iter()
          .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
          .collect()
      })
      .unwrap_or_default();

    Ok(GatewayEvent {
      event_type,
      session_id: object.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
      payment_intent: object
        .get("payment_intent")
        .and_then(Value::as_str)
        .map(str::to_string),
      amount_total_cents: object.get("amount_total").and_then(Value::as_i64),
      currency: object.get("currency").and_then(Value::as_str).map(str::to_string),
      customer_email: object
        .get("customer_email")
        .and_then(Value::as_str)
        .map(str::to_string),
      metadata,
    })
  }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Creates a hosted checkout session. Blocking I/O from the caller's
  /// perspective; implementations bound the call with a timeout.
  async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> EngineResult<CheckoutSession>;

  /// Verifies the signature over `payload` and parses the event. Must not
  /// return event data unless the signature checks out.
  fn verify_event(&self, payload: &[u8], signature_header: &str) -> EngineResult<GatewayEvent>;
}
