// comanda_server/src/services/gateway.rs

//! Stripe-style hosted checkout client.
//!
//! Sessions are created with a form-encoded POST against the gateway's
//! checkout API; webhook events are authenticated with the shared-secret
//! signature scheme in `comanda_core::signature` before parsing.

use async_trait::async_trait;
use comanda_core::{
  CheckoutSession, CheckoutSessionRequest, EngineError, EngineResult, GatewayEvent, PaymentGateway, SignatureVerifier,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

/// Outbound calls are bounded so a slow gateway cannot stall the request
/// that triggered them.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(15);

pub struct StripeGateway {
  http: reqwest::Client,
  api_base: String,
  secret_key: String,
  verifier: SignatureVerifier,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
  id: String,
  url: String,
}

impl StripeGateway {
  pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
    let http = reqwest::Client::builder()
      .timeout(GATEWAY_TIMEOUT)
      .build()
      .expect("reqwest client with static options");
    StripeGateway {
      http,
      api_base: api_base.into(),
      secret_key: secret_key.into(),
      verifier: SignatureVerifier::new(webhook_secret),
    }
  }

  fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
      ("mode".into(), "payment".into()),
      ("payment_method_types[0]".into(), "card".into()),
      ("customer_email".into(), request.customer_email.clone()),
      ("success_url".into(), request.success_url.clone()),
      ("cancel_url".into(), request.cancel_url.clone()),
    ];
    for (i, item) in request.line_items.iter().enumerate() {
      form.push((
        format!("line_items[{}][price_data][currency]", i),
        request.currency.clone(),
      ));
      form.push((
        format!("line_items[{}][price_data][product_data][name]", i),
        item.name.clone(),
      ));
      form.push((
        format!("line_items[{}][price_data][unit_amount]", i),
        item.unit_amount_cents.to_string(),
      ));
      form.push((format!("line_items[{}][quantity]", i), item.quantity.to_string()));
    }
    for (key, value) in &request.metadata {
      form.push((format!("metadata[{}]", key), value.clone()));
    }
    form
  }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
  #[instrument(name = "gateway::create_checkout_session", skip(self, request), fields(line_items = request.line_items.len()))]
  async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> EngineResult<CheckoutSession> {
    let form = Self::session_form(&request);
    let response = self
      .http
      .post(format!("{}/v1/checkout/sessions", self.api_base))
      .bearer_auth(&self.secret_key)
      .form(&form)
      .send()
      .await
      .map_err(EngineError::gateway)?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(EngineError::gateway(anyhow::anyhow!(
        "checkout session creation returned {}: {}",
        status,
        body
      )));
    }

    let session: SessionResponse = response.json().await.map_err(EngineError::gateway)?;
    info!(session_id = %session.id, "Hosted checkout session created");
    Ok(CheckoutSession {
      id: session.id,
      url: session.url,
    })
  }

  fn verify_event(&self, payload: &[u8], signature_header: &str) -> EngineResult<GatewayEvent> {
    self.verifier.verify(payload, signature_header)?;
    GatewayEvent::from_json_payload(payload)
  }
}
