// tests/transition_tests.rs
mod common;

use common::*;
use comanda_core::{EngineError, OrderStatus, PaymentMethod, PaymentStatus};

const FLOW: [OrderStatus; 6] = [
  OrderStatus::Pending,
  OrderStatus::Confirmed,
  OrderStatus::Processing,
  OrderStatus::OutForDelivery,
  OrderStatus::Delivered,
  OrderStatus::Cancelled,
];

#[tokio::test]
async fn forward_requested_transitions_succeed_and_backward_fail() {
  for (i, &from) in FLOW.iter().enumerate() {
    for (j, &to) in FLOW.iter().enumerate() {
      let h = harness();
      let order = h.engine.create_guest_order(draft(PaymentMethod::CashOnDelivery)).await.unwrap();
      if from != OrderStatus::Pending {
        // Walk the order into the starting state with a trusted write so the
        // requested-transition validator is the only thing under test.
        let mut staged = h.orders.get(order.id).await.unwrap().unwrap();
        staged.status = from;
        h.orders.update(&staged).await.unwrap();
      }

      let result = h.engine.request_status(order.id, to).await;
      if j >= i {
        let outcome = result.expect("forward transition should succeed");
        assert_eq!(outcome.order.status, to);
      } else {
        match result {
          Err(EngineError::InvalidTransition { from: f, to: t }) => {
            assert_eq!((f, t), (from, to));
          }
          other => panic!("{} -> {} should fail with InvalidTransition, got {:?}", from, to, other.map(|o| o.order.status)),
        }
        // The stored record is untouched by a rejected transition.
        let stored = h.orders.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, from);
      }
    }
  }
}

#[tokio::test]
async fn confirming_a_hosted_checkout_order_creates_exactly_one_session() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::HostedCheckout)).await.unwrap();

  let outcome = h.engine.request_status(order.id, OrderStatus::Confirmed).await.unwrap();

  assert_eq!(h.gateway.calls(), 1);
  assert_eq!(outcome.order.status, OrderStatus::Confirmed);
  assert_eq!(outcome.order.gateway_session_id.as_deref(), Some("cs_test_1"));
  assert_eq!(outcome.payment_url.as_deref(), Some("https://gateway.test/pay/cs_test_1"));
  // Payment is not yet collected: the customer still has to follow the link.
  assert_eq!(outcome.order.payment_status, PaymentStatus::Pending);

  let request = h.gateway.last_request.lock().clone().unwrap();
  assert_eq!(request.customer_email, "ada@example.com");
  assert_eq!(request.line_items.len(), 2);
  assert_eq!(request.line_items[0].unit_amount_cents, 650);
  assert_eq!(request.line_items[0].quantity, 2);
  assert_eq!(request.metadata.get("orderId").unwrap(), &order.id.to_string());
  assert!(request.success_url.contains(&order.id.to_string()));
}

#[tokio::test]
async fn confirming_a_cash_on_delivery_order_never_calls_the_gateway() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::CashOnDelivery)).await.unwrap();

  let outcome = h.engine.request_status(order.id, OrderStatus::Confirmed).await.unwrap();

  assert_eq!(h.gateway.calls(), 0);
  assert_eq!(outcome.order.status, OrderStatus::Confirmed);
  assert_eq!(outcome.order.payment_status, PaymentStatus::Pending);
  assert!(outcome.order.gateway_session_id.is_none());
  assert!(outcome.payment_url.is_none());
}

#[tokio::test]
async fn gateway_failure_on_confirmation_soft_fails() {
  let h = harness_with_gateway(MockGateway::failing());
  let order = h.engine.create_guest_order(draft(PaymentMethod::HostedCheckout)).await.unwrap();

  let outcome = h
    .engine
    .request_status(order.id, OrderStatus::Confirmed)
    .await
    .expect("transition must complete despite the gateway outage");

  assert_eq!(h.gateway.calls(), 1);
  assert_eq!(outcome.order.status, OrderStatus::Confirmed);
  assert!(outcome.order.gateway_session_id.is_none());
  assert!(outcome.payment_url.is_none());

  let stored = h.orders.get(order.id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn tracking_number_survives_transitions_unchanged() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::CashOnDelivery)).await.unwrap();
  let original = order.tracking_number.clone().expect("assigned at creation");

  let outcome = h.engine.request_status(order.id, OrderStatus::Confirmed).await.unwrap();
  assert_eq!(outcome.order.tracking_number.as_deref(), Some(original.as_str()));

  let outcome = h.engine.request_status(order.id, OrderStatus::Delivered).await.unwrap();
  assert_eq!(outcome.order.tracking_number.as_deref(), Some(original.as_str()));
}

#[tokio::test]
async fn a_transition_assigns_tracking_when_absent() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::CashOnDelivery)).await.unwrap();

  // Strip the tracking number to model records created before assignment.
  let mut stripped = h.orders.get(order.id).await.unwrap().unwrap();
  stripped.tracking_number = None;
  h.orders.update(&stripped).await.unwrap();

  let outcome = h.engine.request_status(order.id, OrderStatus::Confirmed).await.unwrap();
  let assigned = outcome.order.tracking_number.expect("assigned during the transition");
  assert!(assigned.starts_with("TK-"));
}

#[tokio::test]
async fn cancelled_is_reachable_from_anywhere_but_never_exited() {
  let h = harness();
  let order = h.engine.create_guest_order(draft(PaymentMethod::CashOnDelivery)).await.unwrap();

  h.engine.request_status(order.id, OrderStatus::OutForDelivery).await.unwrap();
  h.engine.request_status(order.id, OrderStatus::Cancelled).await.unwrap();

  let result = h.engine.request_status(order.id, OrderStatus::Pending).await;
  assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
  let result = h.engine.request_status(order.id, OrderStatus::Delivered).await;
  assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
}

#[tokio::test]
async fn notification_failure_never_fails_a_transition() {
  use comanda_core::{EngineConfig, LifecycleEngine, MemoryOrderStore, MemoryPaymentStore};
  use std::sync::Arc;

  setup_tracing();
  let orders = Arc::new(MemoryOrderStore::new());
  let payments = Arc::new(MemoryPaymentStore::new());
  let engine = LifecycleEngine::new(
    orders.clone(),
    payments,
    Arc::new(MockGateway::new()),
    Arc::new(FailingNotifier),
    EngineConfig::default(),
  );

  let order = engine.create_guest_order(draft(PaymentMethod::CashOnDelivery)).await.unwrap();
  let outcome = engine.request_status(order.id, OrderStatus::Confirmed).await.unwrap();
  assert_eq!(outcome.order.status, OrderStatus::Confirmed);
}
