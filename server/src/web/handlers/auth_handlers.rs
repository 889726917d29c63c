// comanda_server/src/web/handlers/auth_handlers.rs

use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::AdminUserRow;
use crate::services::auth;
use crate::state::AppState;

// --- Extractor for authenticated admins ---
// Admin routes take an `AdminUser` argument; extraction fails the request
// with 401 before the handler body runs.
#[derive(Debug)]
pub struct AdminUser {
  pub admin_id: Uuid,
  pub email: String,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let result = (|| {
      let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;
      let header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Auth("Missing Authorization header".to_string()))?;
      let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Expected a bearer token".to_string()))?;
      let claims = auth::verify_token(token, &state.config.jwt_secret)?;
      Ok(AdminUser {
        admin_id: claims.sub,
        email: claims.email,
      })
    })();

    if result.is_err() {
      warn!("AdminUser extractor rejected the request.");
    }
    futures_util::future::ready(result)
  }
}

// --- Request DTO ---
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

// --- Handler Implementation ---

#[instrument(name = "handler::admin_login", skip(app_state, payload), fields(email = %payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
  let admin: Option<AdminUserRow> = sqlx::query_as(
    "SELECT id, full_name, email, password_hash, created_at FROM admin_users WHERE email = $1",
  )
  .bind(&payload.email)
  .fetch_optional(&app_state.db_pool)
  .await?;

  // Same response for unknown email and wrong password.
  let Some(admin) = admin else {
    return Err(AppError::Auth("Invalid email or password".to_string()));
  };
  if !auth::verify_password(&admin.password_hash, &payload.password)? {
    return Err(AppError::Auth("Invalid email or password".to_string()));
  }

  let token = auth::issue_token(admin.id, &admin.email, &app_state.config.jwt_secret)?;
  info!(admin_id = %admin.id, "Admin signed in");

  Ok(HttpResponse::Ok().json(json!({
      "token": token,
      "admin": {
          "id": admin.id,
          "fullName": admin.full_name,
          "email": admin.email,
      }
  })))
}
