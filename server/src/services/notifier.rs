// comanda_server/src/services/notifier.rs

//! HTTP notification dispatcher.
//!
//! Transactional email goes through a Brevo-style REST API; admin push
//! events go to an optional push-channel endpoint. Both are best-effort
//! from the engine's point of view: the engine logs failures and moves on,
//! so nothing here may panic or block past its timeout.

use async_trait::async_trait;
use comanda_core::{EngineError, EngineResult, NotificationDispatcher};
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, instrument};

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpNotifier {
  http: reqwest::Client,
  email_api_base: String,
  email_api_key: String,
  email_sender: String,
  push_base_url: Option<String>,
  push_key: Option<String>,
}

impl HttpNotifier {
  pub fn new(
    email_api_base: impl Into<String>,
    email_api_key: impl Into<String>,
    email_sender: impl Into<String>,
    push_base_url: Option<String>,
    push_key: Option<String>,
  ) -> Self {
    let http = reqwest::Client::builder()
      .timeout(NOTIFY_TIMEOUT)
      .build()
      .expect("reqwest client with static options");
    HttpNotifier {
      http,
      email_api_base: email_api_base.into(),
      email_api_key: email_api_key.into(),
      email_sender: email_sender.into(),
      push_base_url,
      push_key,
    }
  }
}

#[async_trait]
impl NotificationDispatcher for HttpNotifier {
  #[instrument(name = "notifier::send_email", skip(self, html_body))]
  async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> EngineResult<()> {
    let response = self
      .http
      .post(format!("{}/v3/smtp/email", self.email_api_base))
      .header("api-key", &self.email_api_key)
      .json(&json!({
        "sender": { "email": self.email_sender },
        "to": [{ "email": to }],
        "subject": subject,
        "htmlContent": html_body,
      }))
      .send()
      .await
      .map_err(EngineError::notification)?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(EngineError::notification(anyhow::anyhow!(
        "email API returned {}: {}",
        status,
        body
      )));
    }
    debug!(to, subject, "Email accepted by provider");
    Ok(())
  }

  #[instrument(name = "notifier::push_admin_event", skip(self, payload))]
  async fn push_admin_event(&self, channel: &str, event: &str, payload: JsonValue) -> EngineResult<()> {
    let Some(base) = &self.push_base_url else {
      // Push is optional; without a configured endpoint this is a no-op.
      debug!(channel, event, "Push endpoint not configured; dropping event");
      return Ok(());
    };

    let mut request = self.http.post(format!("{}/events", base)).json(&json!({
      "channel": channel,
      "name": event,
      "data": payload,
    }));
    if let Some(key) = &self.push_key {
      request = request.header("authorization", format!("Bearer {}", key));
    }

    let response = request.send().await.map_err(EngineError::notification)?;
    let status = response.status();
    if !status.is_success() {
      return Err(EngineError::notification(anyhow::anyhow!(
        "push API returned {}",
        status
      )));
    }
    debug!(channel, event, "Admin event pushed");
    Ok(())
  }
}
