// comanda_server/src/web/handlers/menu_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::list_menu", skip(app_state))]
pub async fn list_menu_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let items = app_state.catalog.list().await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "items": items,
  })))
}

/// Lookup by numeric id or slug, in that order.
#[instrument(name = "handler::get_menu_item", skip(app_state, path), fields(key = %path.as_ref()))]
pub async fn get_menu_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let key = path.into_inner();
  let item = match key.parse::<i64>() {
    Ok(menu_id) => app_state.catalog.by_menu_id(menu_id).await?,
    Err(_) => app_state.catalog.by_slug(&key).await?,
  };

  match item {
    Some(item) => Ok(HttpResponse::Ok().json(json!({ "success": true, "item": item }))),
    None => Err(AppError::NotFound(format!("Menu item '{}' not found", key))),
  }
}
