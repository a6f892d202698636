//! # Item Repository
//!
//! Database operations for stocked items.
//!
//! ## Who Changes `quantity`
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ItemRepository::create / update ──► quantity = form value (restock)   │
//! │                                                                         │
//! │  OrderFinalizer (service::checkout) ──► quantity -= ordered            │
//! │     conditional UPDATE inside the order transaction                    │
//! │                                                                         │
//! │  Nothing else writes it. CHECK (quantity >= 0) backs both paths.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbResult, ServiceResult};
use stockbook_core::{CoreError, Item, NewItem};

const COLUMNS: &str =
    "id, name, quantity, cost_price_cents, selling_price_cents, created_at, updated_at";

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    pub async fn create(&self, input: &NewItem) -> ServiceResult<Item> {
        input.validate()?;

        let now = Utc::now();
        let item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (name, quantity, cost_price_cents, selling_price_cents, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING {COLUMNS}"
        ))
        .bind(input.name.trim())
        .bind(input.quantity)
        .bind(input.cost_price_cents)
        .bind(input.selling_price_cents)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(item_id = item.id, quantity = item.quantity, "Item created");
        Ok(item)
    }

    /// ## Returns
    /// * `Ok(Some(Item))` - Item found, with its current persisted quantity
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!("SELECT {COLUMNS} FROM items WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// All items in creation order.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!("SELECT {COLUMNS} FROM items ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Items that can still be sold, alphabetically (order form picker).
    pub async fn list_in_stock(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {COLUMNS} FROM items WHERE quantity > 0 ORDER BY name COLLATE NOCASE, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// All items alphabetically (report filter dropdowns).
    pub async fn list_by_name(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {COLUMNS} FROM items ORDER BY name COLLATE NOCASE, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Replaces every editable field, including the stock level. This is
    /// the manual restock path.
    ///
    /// Order lines keep the prices they were sold at.
    pub async fn update(&self, id: i64, input: &NewItem) -> ServiceResult<Item> {
        input.validate()?;

        let item = sqlx::query_as::<_, Item>(&format!(
            "UPDATE items
             SET name = ?2, quantity = ?3, cost_price_cents = ?4, selling_price_cents = ?5, updated_at = ?6
             WHERE id = ?1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.quantity)
        .bind(input.cost_price_cents)
        .bind(input.selling_price_cents)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::ItemNotFound(id))?;

        debug!(item_id = id, quantity = item.quantity, "Item updated");
        Ok(item)
    }

    /// Deletes an item and every order line that references it.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ItemNotFound(id).into());
        }

        debug!(item_id = id, "Item deleted");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Σ quantity over all items.
    pub async fn total_quantity(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
