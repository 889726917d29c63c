// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use comanda_core::{
  CheckoutSession, CheckoutSessionRequest, CustomerInfo, EngineConfig, EngineError, EngineResult, GatewayEvent,
  GuestOrderDraft, LifecycleEngine, MemoryOrderStore, MemoryPaymentStore, NotificationDispatcher, OrderItem,
  PaymentGateway, PaymentMethod, SignatureVerifier,
};
use parking_lot::Mutex;
use serde_json::{json, Value as JsonValue};

// The store traits must be in scope for tests poking at the memory stores
// directly.
pub use comanda_core::{OrderStore, PaymentStore};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use uuid::Uuid;

pub const TEST_SECRET: &str = "whsec_core_test_secret";

pub fn setup_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

// --- Mock gateway ---

pub struct MockGateway {
  verifier: SignatureVerifier,
  pub create_calls: AtomicUsize,
  pub fail_create: bool,
  pub last_request: Mutex<Option<CheckoutSessionRequest>>,
}

impl MockGateway {
  pub fn new() -> Self {
    MockGateway {
      verifier: SignatureVerifier::new(TEST_SECRET),
      create_calls: AtomicUsize::new(0),
      fail_create: false,
      last_request: Mutex::new(None),
    }
  }

  pub fn failing() -> Self {
    MockGateway {
      fail_create: true,
      ..MockGateway::new()
    }
  }

  pub fn calls(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PaymentGateway for MockGateway {
  async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> EngineResult<CheckoutSession> {
    let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
    *self.last_request.lock() = Some(request);
    if self.fail_create {
      return Err(EngineError::gateway(anyhow::anyhow!("simulated gateway outage")));
    }
    Ok(CheckoutSession {
      id: format!("cs_test_{}", n),
      url: format!("https://gateway.test/pay/cs_test_{}", n),
    })
  }

  fn verify_event(&self, payload: &[u8], signature_header: &str) -> EngineResult<GatewayEvent> {
    self.verifier.verify(payload, signature_header)?;
    GatewayEvent::from_json_payload(payload)
  }
}

// --- Recording notifier ---

#[derive(Default)]
pub struct RecordingNotifier {
  pub emails: Mutex<Vec<(String, String)>>, // (to, subject)
  pub pushes: Mutex<Vec<(String, String)>>, // (channel, event)
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
  async fn send_email(&self, to: &str, subject: &str, _html_body: &str) -> EngineResult<()> {
    self.emails.lock().push((to.to_string(), subject.to_string()));
    Ok(())
  }

  async fn push_admin_event(&self, channel: &str, event: &str, _payload: JsonValue) -> EngineResult<()> {
    self.pushes.lock().push((channel.to_string(), event.to_string()));
    Ok(())
  }
}

/// A notifier whose every call fails, to prove notification failure is
/// swallowed by the engine.
pub struct FailingNotifier;

#[async_trait]
impl NotificationDispatcher for FailingNotifier {
  async fn send_email(&self, _to: &str, _subject: &str, _html_body: &str) -> EngineResult<()> {
    Err(EngineError::notification(anyhow::anyhow!("smtp down")))
  }

  async fn push_admin_event(&self, _channel: &str, _event: &str, _payload: JsonValue) -> EngineResult<()> {
    Err(EngineError::notification(anyhow::anyhow!("push down")))
  }
}

// --- Harness ---

pub struct TestHarness {
  pub engine: LifecycleEngine,
  pub orders: Arc<MemoryOrderStore>,
  pub payments: Arc<MemoryPaymentStore>,
  pub gateway: Arc<MockGateway>,
  pub notifier: Arc<RecordingNotifier>,
}

pub fn harness() -> TestHarness {
  harness_with_gateway(MockGateway::new())
}

pub fn harness_with_gateway(gateway: MockGateway) -> TestHarness {
  setup_tracing();
  let orders = Arc::new(MemoryOrderStore::new());
  let payments = Arc::new(MemoryPaymentStore::new());
  let gateway = Arc::new(gateway);
  let notifier = Arc::new(RecordingNotifier::default());
  let engine = LifecycleEngine::new(
    orders.clone(),
    payments.clone(),
    gateway.clone(),
    notifier.clone(),
    EngineConfig::default(),
  );
  TestHarness {
    engine,
    orders,
    payments,
    gateway,
    notifier,
  }
}

// --- Draft/event builders ---

pub fn sample_customer() -> CustomerInfo {
  CustomerInfo {
    name: "Ada Obi".to_string(),
    email: "ada@example.com".to_string(),
    phone1: "07000 000001".to_string(),
    phone2: None,
    address: "1 Test Lane, London".to_string(),
  }
}

pub fn sample_items() -> Vec<OrderItem> {
  vec![
    OrderItem {
      menu_id: 7,
      name: "Jollof Rice".to_string(),
      unit_price_cents: 650,
      quantity: 2,
    },
    OrderItem {
      menu_id: 12,
      name: "Puff Puff".to_string(),
      unit_price_cents: 300,
      quantity: 1,
    },
  ]
}

pub fn draft(payment_method: PaymentMethod) -> GuestOrderDraft {
  GuestOrderDraft {
    customer: sample_customer(),
    items: sample_items(),
    payment_method,
  }
}

/// Builds the raw payload of a `checkout.session.completed` event for an
/// order-confirmation session, shaped like the gateway envelope.
pub fn completed_event_for_order(order_id: Uuid, session_id: &str) -> Vec<u8> {
  serde_json::to_vec(&json!({
    "type": "checkout.session.completed",
    "data": {
      "object": {
        "id": session_id,
        "payment_intent": "pi_test_123",
        "amount_total": 1600,
        "currency": "gbp",
        "customer_email": "ada@example.com",
        "metadata": { "orderId": order_id.to_string() }
      }
    }
  }))
  .unwrap()
}

pub fn completed_event_for_payment(payment_id: Uuid, reference: &str, session_id: &str) -> Vec<u8> {
  serde_json::to_vec(&json!({
    "type": "checkout.session.completed",
    "data": {
      "object": {
        "id": session_id,
        "payment_intent": "pi_test_456",
        "amount_total": 2500,
        "currency": "gbp",
        "metadata": { "paymentId": payment_id.to_string(), "reference": reference }
      }
    }
  }))
  .unwrap()
}

pub fn signed_header(payload: &[u8]) -> String {
  comanda_core::signature::sign(payload, TEST_SECRET, chrono::Utc::now().timestamp())
}
