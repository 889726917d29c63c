// tests/reconcile_tests.rs
mod common;

use common::*;
use comanda_core::{
  EngineError, OrderStatus, PaymentMethod, PaymentRecordStatus, PaymentStatus, PaymentStatusChange, ReconcileOutcome,
};
use uuid::Uuid;

#[tokio::test]
async fn completed_event_marks_the_order_paid_and_processing() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::HostedCheckout)).await.unwrap();
  h.engine.request_status(order.id, OrderStatus::Confirmed).await.unwrap();

  let payload = completed_event_for_order(order.id, "cs_test_1");
  let outcome = h.engine.handle_gateway_event(&payload, &signed_header(&payload)).await.unwrap();

  assert_eq!(outcome, ReconcileOutcome::OrderReconciled { order_id: order.id });
  let stored = h.orders.get(order.id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Processing);
  assert_eq!(stored.payment_status, PaymentStatus::Paid);
  assert_eq!(stored.gateway_session_id.as_deref(), Some("cs_test_1"));

  // The ledger row is keyed by the session id and linked to the order.
  let ledger = h.payments.get_by_reference("cs_test_1").await.unwrap().unwrap();
  assert_eq!(ledger.status, PaymentRecordStatus::Paid);
  assert_eq!(ledger.order_id, Some(order.id));
  assert_eq!(ledger.transaction_id.as_deref(), Some("pi_test_123"));
  assert_eq!(ledger.amount_cents, 1600);
  assert!(ledger.verified_by_admin);
}

#[tokio::test]
async fn replayed_completed_event_is_idempotent() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::HostedCheckout)).await.unwrap();
  h.engine.request_status(order.id, OrderStatus::Confirmed).await.unwrap();

  let payload = completed_event_for_order(order.id, "cs_test_1");
  for _ in 0..2 {
    let outcome = h.engine.handle_gateway_event(&payload, &signed_header(&payload)).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::OrderReconciled { order_id: order.id });

    let stored = h.orders.get(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Processing);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
  }

  // No duplicate order or payment record after the replay.
  assert_eq!(h.orders.len(), 1);
  assert_eq!(h.payments.len(), 1);
}

#[tokio::test]
async fn invalid_signature_rejects_the_event_and_mutates_nothing() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::HostedCheckout)).await.unwrap();
  h.engine.request_status(order.id, OrderStatus::Confirmed).await.unwrap();
  let before = h.orders.get(order.id).await.unwrap().unwrap();

  let payload = completed_event_for_order(order.id, "cs_test_1");
  let forged = comanda_core::signature::sign(&payload, "not_the_secret", chrono::Utc::now().timestamp());

  let result = h.engine.handle_gateway_event(&payload, &forged).await;
  assert!(matches!(result, Err(EngineError::GatewaySignature(_))));

  let after = h.orders.get(order.id).await.unwrap().unwrap();
  assert_eq!(after.status, before.status);
  assert_eq!(after.payment_status, before.payment_status);
  assert_eq!(after.updated_at, before.updated_at);
  assert!(h.payments.is_empty());
}

#[tokio::test]
async fn missing_order_is_ignored_without_error() {
  let h = harness();
  let ghost = Uuid::new_v4();
  let payload = completed_event_for_order(ghost, "cs_ghost");

  let outcome = h.engine.handle_gateway_event(&payload, &signed_header(&payload)).await.unwrap();

  assert_eq!(outcome, ReconcileOutcome::OrderMissing { order_id: ghost });
  assert_eq!(h.orders.len(), 0);
  assert!(h.payments.is_empty());
}

#[tokio::test]
async fn unhandled_event_types_are_ignored() {
  let h = harness();
  let payload = br#"{"type":"invoice.created","data":{"object":{"id":"in_1"}}}"#.to_vec();

  let outcome = h.engine.handle_gateway_event(&payload, &signed_header(&payload)).await.unwrap();
  assert_eq!(outcome, ReconcileOutcome::Ignored);
}

#[tokio::test]
async fn reconciliation_bypasses_the_requested_transition_validator() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::HostedCheckout)).await.unwrap();
  // Walk the order past Processing. A requested Delivered -> Processing
  // move would be rejected; the trusted reconciliation applies it anyway.
  h.engine.request_status(order.id, OrderStatus::Delivered).await.unwrap();

  let payload = completed_event_for_order(order.id, "cs_late");
  h.engine.handle_gateway_event(&payload, &signed_header(&payload)).await.unwrap();

  let stored = h.orders.get(order.id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Processing);
  assert_eq!(stored.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn completed_event_settles_a_standalone_payment_record() {
  let h = harness();
  let payment = h
    .engine
    .create_guest_payment(comanda_core::GuestPaymentDraft {
      payer: comanda_core::PayerInfo {
        full_name: "Ada Obi".to_string(),
        email: "ada@example.com".to_string(),
        phone: None,
        address: None,
      },
      amount_cents: 2500,
      method: None,
      description: Some("Catering deposit".to_string()),
      order_id: None,
    })
    .await
    .unwrap();

  // The hosted session is gated on admin verification.
  let result = h.engine.create_payment_session(payment.id).await;
  assert!(matches!(result, Err(EngineError::Forbidden(_))));

  h.engine
    .update_payment_status(
      payment.id,
      PaymentStatusChange {
        verified_by_admin: Some(true),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  let session = h.engine.create_payment_session(payment.id).await.unwrap();
  assert_eq!(h.gateway.calls(), 1);

  let payload = completed_event_for_payment(payment.id, &payment.reference, &session.id);
  let outcome = h.engine.handle_gateway_event(&payload, &signed_header(&payload)).await.unwrap();
  assert_eq!(outcome, ReconcileOutcome::PaymentReconciled { payment_id: payment.id });

  let stored = h.payments.get(payment.id).await.unwrap().unwrap();
  assert_eq!(stored.status, PaymentRecordStatus::Paid);
  assert_eq!(stored.transaction_id.as_deref(), Some("pi_test_456"));
  let first_paid_at = stored.paid_at.unwrap();

  // Replay: paid_at and transaction id stay put.
  h.engine.handle_gateway_event(&payload, &signed_header(&payload)).await.unwrap();
  let replayed = h.payments.get(payment.id).await.unwrap().unwrap();
  assert_eq!(replayed.paid_at, Some(first_paid_at));
  assert_eq!(replayed.transaction_id.as_deref(), Some("pi_test_456"));
}
