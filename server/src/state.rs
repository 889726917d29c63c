// comanda_server/src/state.rs
use crate::config::AppConfig;
use crate::services::MenuCatalog;
use comanda_core::LifecycleEngine;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub engine: Arc<LifecycleEngine>,
  pub catalog: Arc<MenuCatalog>,
  pub config: Arc<AppConfig>, // Share loaded config
}
