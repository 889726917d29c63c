// comanda_server/src/models/menu_item.rs

use serde::Serialize;
use sqlx::FromRow;

/// A catalog entry. Read-only from this service's perspective: orders
/// snapshot name and price from here at creation time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MenuItemRow {
  pub menu_id: i64,
  pub slug: String,
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub available: bool,
}
