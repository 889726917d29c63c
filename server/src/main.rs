// comanda_server/src/main.rs

// Declare modules for the application
mod config;
mod errors;
mod models;
mod services;
mod state;
mod stores;
mod web;

use crate::config::AppConfig;
use crate::services::{HttpNotifier, MenuCatalog, StripeGateway};
use crate::state::AppState;
use crate::stores::{PgOrderStore, PgPaymentStore};

use actix_web::{web as actix_data, App, HttpServer}; // Renamed web to actix_data
use comanda_core::{EngineConfig, LifecycleEngine};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

// Main function
#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize tracing subscriber for logging
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting ordering backend server...");

  // Load application configuration
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg), // Arc the config for sharing
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  // Initialize Database Pool
  let db_pool = match PgPool::connect(&app_config.database_url).await {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      panic!("Database connection error: {}", e);
    }
  };

  // Wire the lifecycle engine over the Postgres stores and HTTP clients.
  let gateway = StripeGateway::new(
    app_config.stripe_api_base.clone(),
    app_config.stripe_secret_key.clone(),
    app_config.stripe_webhook_secret.clone(),
  );
  let notifier = HttpNotifier::new(
    app_config.email_api_base.clone(),
    app_config.email_api_key.clone(),
    app_config.email_sender.clone(),
    app_config.push_base_url.clone(),
    app_config.push_key.clone(),
  );
  let engine = Arc::new(LifecycleEngine::new(
    Arc::new(PgOrderStore::new(db_pool.clone())),
    Arc::new(PgPaymentStore::new(db_pool.clone())),
    Arc::new(gateway),
    Arc::new(notifier),
    EngineConfig {
      client_base_url: app_config.client_base_url.clone(),
      currency: app_config.currency.clone(),
      admin_channel: app_config.admin_channel.clone(),
    },
  ));
  tracing::info!("Lifecycle engine wired.");

  // Create AppState
  let app_state = AppState {
    db_pool: db_pool.clone(),
    engine,
    catalog: Arc::new(MenuCatalog::new(db_pool.clone())),
    config: app_config.clone(), // Clone Arc for AppState
  };

  // Configure and Start Actix Web Server
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::routes::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
