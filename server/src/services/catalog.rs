// comanda_server/src/services/catalog.rs

//! Read-only menu catalog lookups.
//!
//! Order creation resolves each requested line against this catalog and
//! snapshots the authoritative name and price onto the order.

use crate::errors::{AppError, Result};
use crate::models::MenuItemRow;
use sqlx::PgPool;

const MENU_COLUMNS: &str = "menu_id, slug, name, description, price_cents, available";

pub struct MenuCatalog {
  pool: PgPool,
}

impl MenuCatalog {
  pub fn new(pool: PgPool) -> Self {
    MenuCatalog { pool }
  }

  pub async fn list(&self) -> Result<Vec<MenuItemRow>> {
    let items: Vec<MenuItemRow> =
      sqlx::query_as(&format!("SELECT {} FROM menu_items ORDER BY name ASC", MENU_COLUMNS))
        .fetch_all(&self.pool)
        .await?;
    Ok(items)
  }

  pub async fn by_menu_id(&self, menu_id: i64) -> Result<Option<MenuItemRow>> {
    let item: Option<MenuItemRow> =
      sqlx::query_as(&format!("SELECT {} FROM menu_items WHERE menu_id = $1", MENU_COLUMNS))
        .bind(menu_id)
        .fetch_optional(&self.pool)
        .await?;
    Ok(item)
  }

  pub async fn by_slug(&self, slug: &str) -> Result<Option<MenuItemRow>> {
    let item: Option<MenuItemRow> = sqlx::query_as(&format!("SELECT {} FROM menu_items WHERE slug = $1", MENU_COLUMNS))
      .bind(slug)
      .fetch_optional(&self.pool)
      .await?;
    Ok(item)
  }

  /// Resolves a line reference by numeric id, falling back to slug.
  pub async fn resolve(&self, menu_id: Option<i64>, slug: Option<&str>) -> Result<MenuItemRow> {
    if let Some(menu_id) = menu_id {
      if let Some(item) = self.by_menu_id(menu_id).await? {
        return Ok(item);
      }
      return Err(AppError::Validation(format!("Menu item not found for id: {}", menu_id)));
    }
    if let Some(slug) = slug {
      if let Some(item) = self.by_slug(slug).await? {
        return Ok(item);
      }
      return Err(AppError::Validation(format!("Menu item not found for slug: {}", slug)));
    }
    Err(AppError::Validation(
      "Each item needs a menuId or a slug".to_string(),
    ))
  }
}
