// comanda_core/src/reconcile.rs

//! Gateway callback reconciliation.
//!
//! Reconciliation updates local order/payment state in response to a
//! trusted external event rather than a direct user request. The signature
//! must verify before any field of the event is read; a verified
//! `checkout.session.completed` event then marks the referenced order paid
//! and moves it to `Processing` via a trusted transition, upserting the
//! payment ledger row keyed by the session id so replays stay idempotent.

use crate::engine::{payment_confirmed_email, LifecycleEngine};
use crate::error::{EngineError, EngineResult};
use crate::gateway::GatewayEvent;
use crate::idgen;
use crate::order::PaymentStatus;
use crate::payment::{Payment, PaymentRecordMethod, PaymentRecordStatus, PayerInfo};
use crate::status::{validate_transition, OrderStatus, Transition};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// What the engine did with a verified event. Returned so the transport
/// layer can log it; the HTTP response to the gateway is `200` either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
  /// The referenced order was marked paid and moved to Processing.
  OrderReconciled { order_id: Uuid },
  /// A standalone payment record was marked paid.
  PaymentReconciled { payment_id: Uuid },
  /// The event referenced an order this system does not have. Ignored so
  /// the gateway does not retry a permanently-missing record forever.
  OrderMissing { order_id: Uuid },
  /// Unhandled event type, or no recognisable metadata.
  Ignored,
}

impl LifecycleEngine {
  /// Entry point for the webhook transport. Verifies the signature, then
  /// routes the event. Signature failure mutates nothing.
  #[instrument(name = "engine::handle_gateway_event", skip_all, fields(payload_len = payload.len()))]
  pub async fn handle_gateway_event(&self, payload: &[u8], signature_header: &str) -> EngineResult<ReconcileOutcome> {
    let event = self.gateway().verify_event(payload, signature_header)?;

    if !event.is_checkout_completed() {
      debug!(event_type = %event.event_type, "Unhandled gateway event type");
      return Ok(ReconcileOutcome::Ignored);
    }

    if let Some(raw_order_id) = event.metadata.get("orderId") {
      let Ok(order_id) = Uuid::parse_str(raw_order_id) else {
        warn!(raw_order_id, "Completed session carries an unparseable order id; ignoring");
        return Ok(ReconcileOutcome::Ignored);
      };
      return self.reconcile_order_session(order_id, &event).await;
    }

    if event.metadata.contains_key("paymentId") || event.metadata.contains_key("reference") {
      return self.reconcile_payment_session(&event).await;
    }

    warn!(session_id = %event.session_id, "Completed session without order or payment metadata; ignoring");
    Ok(ReconcileOutcome::Ignored)
  }

  async fn reconcile_order_session(&self, order_id: Uuid, event: &GatewayEvent) -> EngineResult<ReconcileOutcome> {
    let Some(mut order) = self.orders().get(order_id).await? else {
      warn!(%order_id, session_id = %event.session_id, "Completed session references a missing order; ignoring");
      return Ok(ReconcileOutcome::OrderMissing { order_id });
    };

    let previous = order.status;
    // Trusted transition: the gateway confirmed payment, so the rank check
    // used for requested transitions does not apply.
    order.status = validate_transition(previous, Transition::Trusted(OrderStatus::Processing))?;
    order.payment_status = PaymentStatus::Paid;
    order.gateway_session_id = Some(event.session_id.clone());
    if order.tracking_number.is_none() {
      order.tracking_number = Some(idgen::tracking_number());
    }
    order.updated_at = Utc::now();

    if !self.orders().update_if_status(&order, previous).await? {
      // Raced with another writer between read and write. Surface as a
      // conflict; the transport still answers 200 and the gateway's next
      // replay converges.
      return Err(EngineError::Conflict(format!(
        "Order {} changed while reconciling session {}",
        order.id, event.session_id
      )));
    }
    info!(order_id = %order.id, session_id = %event.session_id, "Order reconciled as paid");

    // Ledger upsert keyed by the session id: replays rewrite the same row.
    let now = Utc::now();
    let ledger_row = Payment {
      id: Uuid::new_v4(),
      reference: event.session_id.clone(),
      payer: PayerInfo {
        full_name: order.customer.name.clone(),
        email: order.customer.email.clone(),
        phone: Some(order.customer.phone1.clone()),
        address: Some(order.customer.address.clone()),
      },
      amount_cents: event.amount_total_cents.unwrap_or(order.total_cents),
      currency: event
        .currency
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| self.config().currency.clone()),
      method: PaymentRecordMethod::Card,
      status: PaymentRecordStatus::Paid,
      verified_by_admin: true,
      transaction_id: event.payment_intent.clone(),
      paid_at: Some(now),
      description: Some("Gateway payment for order".to_string()),
      order_id: Some(order.id),
      created_at: now,
      updated_at: now,
    };
    self.payments().upsert_by_reference(&ledger_row).await?;

    let (subject, body) = payment_confirmed_email(&order);
    self.best_effort_email(&order.customer.email, &subject, &body).await;
    self
      .best_effort_push(
        "payment-received",
        json!({
          "orderId": order.id,
          "trackingNumber": order.tracking_number,
          "amountCents": order.total_cents,
          "sessionId": event.session_id,
        }),
      )
      .await;

    Ok(ReconcileOutcome::OrderReconciled { order_id: order.id })
  }

  async fn reconcile_payment_session(&self, event: &GatewayEvent) -> EngineResult<ReconcileOutcome> {
    let payment = match event.metadata.get("paymentId").map(String::as_str).map(Uuid::parse_str) {
      Some(Ok(payment_id)) => self.payments().get(payment_id).await?,
      _ => match event.metadata.get("reference") {
        Some(reference) => self.payments().get_by_reference(reference).await?,
        None => None,
      },
    };

    let Some(mut payment) = payment else {
      warn!(session_id = %event.session_id, "Completed session references a missing payment record; ignoring");
      return Ok(ReconcileOutcome::Ignored);
    };

    payment.mark_paid(event.payment_intent.as_deref(), Utc::now());
    self.payments().update(&payment).await?;
    info!(payment_id = %payment.id, session_id = %event.session_id, "Payment record reconciled as paid");

    let (subject, body) = (
      "Payment Successful!".to_string(),
      format!(
        "<h2>Hi {},</h2><p>Your payment has been received. Reference: {}</p>",
        payment.payer.full_name, payment.reference
      ),
    );
    self.best_effort_email(&payment.payer.email, &subject, &body).await;

    Ok(ReconcileOutcome::PaymentReconciled { payment_id: payment.id })
  }
}
