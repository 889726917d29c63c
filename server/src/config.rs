// comanda_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// Customer-facing frontend, used for gateway success/cancel redirects.
  pub client_base_url: String,
  pub currency: String,

  // Payment gateway
  pub stripe_secret_key: String,
  pub stripe_webhook_secret: String,
  pub stripe_api_base: String,

  // Transactional email (Brevo-style HTTP API)
  pub email_api_key: String,
  pub email_api_base: String,
  pub email_sender: String,

  // Admin push channel (optional; push is skipped when unset)
  pub push_base_url: Option<String>,
  pub push_key: Option<String>,
  pub admin_channel: String,

  // Admin auth
  pub jwt_secret: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let client_base_url = get_env("CLIENT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let currency = get_env("CURRENCY").unwrap_or_else(|_| "GBP".to_string());

    let stripe_secret_key = get_env("STRIPE_SECRET_KEY")?;
    let stripe_webhook_secret = get_env("STRIPE_WEBHOOK_SECRET")?;
    let stripe_api_base = get_env("STRIPE_API_BASE").unwrap_or_else(|_| "https://api.stripe.com".to_string());

    let email_api_key = get_env("EMAIL_API_KEY")?;
    let email_api_base = get_env("EMAIL_API_BASE").unwrap_or_else(|_| "https://api.brevo.com".to_string());
    let email_sender = get_env("EMAIL_SENDER").unwrap_or_else(|_| "noreply@example.com".to_string());

    let push_base_url = get_env("PUSH_BASE_URL").ok();
    let push_key = get_env("PUSH_KEY").ok();
    let admin_channel = get_env("ADMIN_CHANNEL").unwrap_or_else(|_| "admin-orders".to_string());

    let jwt_secret = get_env("JWT_SECRET")?;

    tracing::info!("Application configuration loaded successfully.");
    // Avoid logging secrets directly; only non-sensitive values here.
    tracing::debug!(%server_host, server_port, %client_base_url, %currency, "Loaded config details");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      client_base_url,
      currency,
      stripe_secret_key,
      stripe_webhook_secret,
      stripe_api_base,
      email_api_key,
      email_api_base,
      email_sender,
      push_base_url,
      push_key,
      admin_channel,
      jwt_secret,
    })
  }
}
