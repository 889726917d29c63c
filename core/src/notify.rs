// comanda_core/src/notify.rs

//! The notification seam.
//!
//! Email and admin push are best-effort side effects: the engine dispatches
//! them after the authoritative state change is persisted and logs
//! failures without propagating them. A successful transition therefore
//! never implies a delivered notification.

use crate::error::EngineResult;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
  async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> EngineResult<()>;

  async fn push_admin_event(&self, channel: &str, event: &str, payload: JsonValue) -> EngineResult<()>;
}
