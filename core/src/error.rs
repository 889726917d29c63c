// comanda_core/src/error.rs
use crate::status::OrderStatus;
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Invalid status transition: {from} -> {to}")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Webhook signature rejected: {0}")]
  GatewaySignature(String),

  #[error("Payment gateway call failed: {source}")]
  GatewayCall {
    #[source]
    source: AnyhowError,
  },

  #[error("Notification dispatch failed: {source}")]
  Notification {
    #[source]
    source: AnyhowError,
  },

  #[error("Store operation failed: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },

  #[error("Concurrent update conflict: {0}")]
  Conflict(String),
}

impl EngineError {
  pub fn gateway(source: impl Into<AnyhowError>) -> Self {
    EngineError::GatewayCall { source: source.into() }
  }

  pub fn notification(source: impl Into<AnyhowError>) -> Self {
    EngineError::Notification { source: source.into() }
  }

  pub fn store(source: impl Into<AnyhowError>) -> Self {
    EngineError::Store { source: source.into() }
  }
}

pub type EngineResult<T, E = EngineError> = std::result::Result<T, E>;
