// comanda_server/src/web/handlers/payment_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::auth_handlers::AdminUser;
use crate::errors::AppError;
use crate::state::AppState;
use comanda_core::{GuestPaymentDraft, PayerInfo, PaymentRecordMethod, PaymentRecordStatus, PaymentStatusChange};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct GuestPaymentRequest {
  #[serde(rename = "fullName")]
  pub full_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub address: Option<String>,
  /// Major currency units, e.g. 16.00. Converted to minor units here.
  pub amount: f64,
  pub method: Option<String>,
  pub description: Option<String>,
  #[serde(rename = "orderId")]
  pub order_id: Option<Uuid>,
}

#[derive(Deserialize, Debug, Default)]
pub struct MarkPaidRequest {
  #[serde(rename = "transactionId")]
  pub transaction_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PaymentStatusRequest {
  pub status: Option<String>,
  #[serde(rename = "verifiedByAdmin")]
  pub verified_by_admin: Option<bool>,
  #[serde(rename = "transactionId")]
  pub transaction_id: Option<String>,
}

fn parse_record_method(raw: &str) -> Result<PaymentRecordMethod, AppError> {
  PaymentRecordMethod::parse(&raw.to_lowercase())
    .ok_or_else(|| AppError::Validation(format!("Invalid payment method: {}", raw)))
}

fn parse_record_status(raw: &str) -> Result<PaymentRecordStatus, AppError> {
  let normalized = raw.to_lowercase();
  // Some gateways report "success"; treat it as paid.
  if normalized == "success" {
    return Ok(PaymentRecordStatus::Paid);
  }
  PaymentRecordStatus::parse(&normalized).ok_or_else(|| AppError::Validation(format!("Invalid status value: {}", raw)))
}

// --- Handler Implementations ---

#[instrument(name = "handler::create_guest_payment", skip(app_state, payload), fields(email = %payload.email))]
pub async fn create_guest_payment_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<GuestPaymentRequest>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  if !payload.amount.is_finite() || payload.amount <= 0.0 {
    return Err(AppError::Validation(
      "Full name, email, and amount are required".to_string(),
    ));
  }

  let draft = GuestPaymentDraft {
    payer: PayerInfo {
      full_name: payload.full_name,
      email: payload.email,
      phone: payload.phone,
      address: payload.address,
    },
    amount_cents: (payload.amount * 100.0).round() as i64,
    method: payload.method.as_deref().map(parse_record_method).transpose()?,
    description: payload.description,
    order_id: payload.order_id,
  };

  let payment = app_state.engine.create_guest_payment(draft).await?;
  info!(payment_id = %payment.id, reference = %payment.reference, "Guest payment record accepted");

  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "message": "Payment record created successfully. Confirmation email sent.",
      "data": payment,
  })))
}

/// Creates the hosted checkout session for a standalone payment record.
/// 403 until an administrator has verified the record.
#[instrument(name = "handler::confirm_payment", skip(app_state, path), fields(payment_id = %path.as_ref()))]
pub async fn confirm_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let session = app_state.engine.create_payment_session(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "url": session.url,
      "sessionId": session.id,
  })))
}

#[instrument(name = "handler::list_payments", skip(app_state, admin), fields(admin = %admin.email))]
pub async fn list_payments_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let payments = app_state.engine.list_payments().await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "count": payments.len(),
      "data": payments,
  })))
}

#[instrument(name = "handler::get_payment", skip(app_state, admin, path), fields(admin = %admin.email))]
pub async fn get_payment_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let payment = app_state.engine.get_payment(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": payment,
  })))
}

#[instrument(name = "handler::mark_payment_paid", skip(app_state, admin, path, payload), fields(admin = %admin.email))]
pub async fn mark_payment_paid_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: Option<web::Json<MarkPaidRequest>>,
) -> Result<HttpResponse, AppError> {
  let transaction_id = payload.and_then(|p| p.into_inner().transaction_id);
  let payment = app_state.engine.mark_payment_paid(path.into_inner(), transaction_id).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Payment marked as paid",
      "data": payment,
  })))
}

#[instrument(name = "handler::update_payment_status", skip(app_state, admin, path, payload), fields(admin = %admin.email))]
pub async fn update_payment_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<PaymentStatusRequest>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let change = PaymentStatusChange {
    status: payload.status.as_deref().map(parse_record_status).transpose()?,
    verified_by_admin: payload.verified_by_admin,
    transaction_id: payload.transaction_id,
  };

  let payment = app_state.engine.update_payment_status(path.into_inner(), change).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": payment,
  })))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn record_status_parsing_accepts_gateway_aliases() {
    assert_eq!(parse_record_status("paid").unwrap(), PaymentRecordStatus::Paid);
    assert_eq!(parse_record_status("SUCCESS").unwrap(), PaymentRecordStatus::Paid);
    assert_eq!(parse_record_status("Refunded").unwrap(), PaymentRecordStatus::Refunded);
    assert!(parse_record_status("settled").is_err());
  }

  #[test]
  fn record_method_parsing_is_case_insensitive() {
    assert_eq!(parse_record_method("Card").unwrap(), PaymentRecordMethod::Card);
    assert!(parse_record_method("wire").is_err());
  }
}
