// src/lib.rs

//! Comanda core: the order lifecycle & payment reconciliation engine.
//!
//! This crate owns the business rules of the ordering backend:
//!  - The order status state machine, with requested (validated) and
//!    trusted (gateway-driven) transitions.
//!  - Guest order creation, lookup, and administrative operations.
//!  - Hosted-checkout session creation as a side effect of confirmation.
//!  - Reconciliation of verified gateway callback events against stored
//!    order and payment records, idempotent under replay.
//!  - Tracking-number and payment-reference generation.
//!  - Webhook signature verification.
//!
//! Transport, persistence, and the real gateway/notification clients live
//! behind the traits in [`gateway`], [`notify`], and [`store`]; the server
//! crate supplies production implementations, tests supply mocks.

pub mod engine;
pub mod error;
pub mod gateway;
pub mod idgen;
pub mod memory;
pub mod notify;
pub mod order;
pub mod payment;
pub mod reconcile;
pub mod signature;
pub mod status;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::engine::{
  EngineConfig, GuestOrderDraft, GuestPaymentDraft, LifecycleEngine, PaymentStatusChange, TransitionOutcome,
};
pub use crate::error::{EngineError, EngineResult};
pub use crate::gateway::{
  CheckoutLineItem, CheckoutSession, CheckoutSessionRequest, GatewayEvent, PaymentGateway, EVENT_CHECKOUT_COMPLETED,
};
pub use crate::memory::{MemoryOrderStore, MemoryPaymentStore};
pub use crate::notify::NotificationDispatcher;
pub use crate::order::{CustomerInfo, Order, OrderItem, OrderProjection, PaymentMethod, PaymentStatus};
pub use crate::payment::{PayerInfo, Payment, PaymentRecordMethod, PaymentRecordStatus};
pub use crate::reconcile::ReconcileOutcome;
pub use crate::signature::SignatureVerifier;
pub use crate::status::{validate_transition, OrderStatus, Transition};
pub use crate::store::{OrderStore, PaymentStore};
