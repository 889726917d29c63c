// comanda_server/src/models/admin_user.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct AdminUserRow {
  pub id: Uuid,
  pub full_name: String,
  pub email: String,
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
}
