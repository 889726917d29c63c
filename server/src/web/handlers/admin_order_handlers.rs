// comanda_server/src/web/handlers/admin_order_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::auth_handlers::AdminUser;
use crate::errors::AppError;
use crate::state::AppState;
use comanda_core::OrderStatus;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct UpdateStatusRequest {
  pub status: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateEtaRequest {
  #[serde(rename = "estimatedDelivery")]
  pub estimated_delivery: Option<DateTime<Utc>>,
}

// --- Handler Implementations ---

#[instrument(name = "handler::list_orders", skip(app_state, admin), fields(admin = %admin.email))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let orders = app_state.engine.list_orders().await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(
    name = "handler::update_order_status",
    skip(app_state, admin, path, payload),
    fields(admin = %admin.email, order_id = %path.as_ref(), requested = %payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
  let requested: OrderStatus = payload.status.parse()?;
  let outcome = app_state.engine.request_status(path.into_inner(), requested).await?;

  info!(order_id = %outcome.order.id, status = outcome.order.status.as_str(), "Order status updated by admin");
  Ok(HttpResponse::Ok().json(json!({
      "message": format!("Order status updated to \"{}\"", outcome.order.status),
      "order": outcome.order,
      "paymentUrl": outcome.payment_url,
  })))
}

#[instrument(name = "handler::mark_order_paid", skip(app_state, admin, path), fields(admin = %admin.email))]
pub async fn mark_order_paid_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.engine.mark_cod_paid(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "COD payment marked as Paid",
      "order": order,
  })))
}

#[instrument(name = "handler::update_order_eta", skip(app_state, admin, path, payload), fields(admin = %admin.email))]
pub async fn update_order_eta_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateEtaRequest>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .engine
    .set_estimated_delivery(path.into_inner(), payload.estimated_delivery)
    .await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Estimated delivery updated",
      "order": order,
  })))
}

#[instrument(name = "handler::delete_order", skip(app_state, admin, path), fields(admin = %admin.email))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.engine.delete_order(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Order deleted successfully" })))
}
