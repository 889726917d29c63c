// comanda_server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use comanda_core::{CustomerInfo, GuestOrderDraft, OrderItem, PaymentMethod};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct OrderItemPayload {
  #[serde(rename = "menuId")]
  pub menu_id: Option<i64>,
  pub slug: Option<String>,
  pub quantity: u32,
}

#[derive(Deserialize, Debug)]
pub struct CustomerPayload {
  pub name: String,
  pub email: String,
  pub phone1: String,
  pub phone2: Option<String>,
  pub address: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateOrderRequest {
  pub customer: CustomerPayload,
  pub items: Vec<OrderItemPayload>,
  #[serde(rename = "paymentMethod")]
  pub payment_method: String,
}

#[derive(Deserialize, Debug)]
pub struct TrackOrderRequest {
  #[serde(rename = "trackingNumber")]
  pub tracking_number: String,
  pub email: Option<String>,
}

// --- Handler Implementations ---

#[instrument(name = "handler::create_order", skip(app_state, payload), fields(item_count = payload.items.len()))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();

  let payment_method = PaymentMethod::parse(&payload.payment_method)
    .ok_or_else(|| AppError::Validation(format!("Invalid payment method: {}", payload.payment_method)))?;

  // Resolve each line against the catalog and snapshot name + price.
  let mut items = Vec::with_capacity(payload.items.len());
  for line in &payload.items {
    let entry = app_state.catalog.resolve(line.menu_id, line.slug.as_deref()).await?;
    if !entry.available {
      return Err(AppError::Validation(format!(
        "Menu item '{}' is currently unavailable",
        entry.name
      )));
    }
    items.push(OrderItem {
      menu_id: entry.menu_id,
      name: entry.name,
      unit_price_cents: entry.price_cents,
      quantity: line.quantity,
    });
  }

  let draft = GuestOrderDraft {
    customer: CustomerInfo {
      name: payload.customer.name,
      email: payload.customer.email,
      phone1: payload.customer.phone1,
      phone2: payload.customer.phone2,
      address: payload.customer.address,
    },
    items,
    payment_method,
  };

  let order = app_state.engine.create_guest_order(draft).await?;
  info!(order_id = %order.id, "Guest order accepted");

  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "order": order,
  })))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let projection = app_state.engine.order_projection(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "order": projection,
  })))
}

#[instrument(name = "handler::track_order", skip(app_state, path))]
pub async fn track_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let projection = app_state.engine.track(&path.into_inner(), None).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "order": projection,
  })))
}

/// POST variant of tracking: tracking number in the body, plus the optional
/// exact-match email filter.
#[instrument(name = "handler::track_order_with_email", skip(app_state, payload))]
pub async fn track_order_post_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<TrackOrderRequest>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  if payload.tracking_number.trim().is_empty() {
    return Err(AppError::Validation("Tracking number is required".to_string()));
  }
  let projection = app_state
    .engine
    .track(&payload.tracking_number, payload.email.as_deref())
    .await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "order": projection,
  })))
}
