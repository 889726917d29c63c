// comanda_server/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use comanda_core::EngineError;

// --- Handler Implementation ---

/// Gateway callback endpoint. Requires the raw body: the signature is
/// computed over the exact bytes the gateway sent, so this route must not
/// go through JSON extraction.
///
/// Response policy: a signature failure is a 400 so the sender knows its
/// delivery was rejected; every other outcome — including internal
/// failures — acknowledges with `200 {"received": true}` to keep the
/// gateway from retry-storming us. Internal failures are logged only.
#[instrument(
    name = "handler::stripe_webhook",
    skip(app_state, req, body),
    fields(payload_len = body.len())
)]
pub async fn stripe_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let signature_header = req
    .headers()
    .get("stripe-signature")
    .and_then(|h| h.to_str().ok())
    .unwrap_or_default();

  match app_state.engine.handle_gateway_event(&body, signature_header).await {
    Ok(outcome) => {
      info!(?outcome, "Webhook event handled");
    }
    Err(EngineError::GatewaySignature(message)) => {
      warn!(%message, "Webhook signature verification failed");
      return Err(AppError::GatewaySignature(message));
    }
    Err(e) => {
      // Acknowledge anyway; the gateway redelivers on its own schedule and
      // the reconciliation path is idempotent.
      error!(error = %e, "Webhook handling failed internally; acknowledging");
    }
  }

  Ok(HttpResponse::Ok().json(json!({ "received": true })))
}
