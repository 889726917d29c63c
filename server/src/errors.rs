// comanda_server/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use comanda_core::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Invalid status transition: {from} -> {to}")]
  InvalidTransition { from: String, to: String },

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Webhook signature rejected: {0}")]
  GatewaySignature(String),

  #[error("Payment Gateway Error: {0}")]
  Gateway(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String), // For miscellaneous errors
}

// The engine's taxonomy maps onto the HTTP surface here; GatewayCall and
// Notification never reach a caller through the engine's own paths, but a
// direct gateway call (payment-session creation) can.
impl From<EngineError> for AppError {
  fn from(err: EngineError) -> Self {
    match err {
      EngineError::Validation(m) => AppError::Validation(m),
      EngineError::NotFound(m) => AppError::NotFound(m),
      EngineError::InvalidTransition { from, to } => AppError::InvalidTransition {
        from: from.as_str().to_string(),
        to: to.as_str().to_string(),
      },
      EngineError::Forbidden(m) => AppError::Forbidden(m),
      EngineError::GatewaySignature(m) => AppError::GatewaySignature(m),
      EngineError::GatewayCall { source } => AppError::Gateway(source.to_string()),
      EngineError::Notification { source } => AppError::Internal(source.to_string()),
      EngineError::Store { source } => AppError::Internal(format!("store failure: {}", source)),
      EngineError::Conflict(m) => AppError::Conflict(m),
    }
  }
}

// Allow anyhow::Error to be converted into AppError::Internal for
// convenience in handlers that use `?` on anyhow-returning helpers.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::InvalidTransition { from, to } => HttpResponse::Conflict().json(json!({
        "error": "Cannot move order backward in status flow",
        "from": from,
        "to": to,
      })),
      AppError::Conflict(m) => HttpResponse::Conflict().json(json!({"error": m})),
      AppError::GatewaySignature(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Gateway(m) => {
        HttpResponse::BadGateway().json(json!({"error": "Payment provider error", "detail": m}))
      }
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"})),
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
