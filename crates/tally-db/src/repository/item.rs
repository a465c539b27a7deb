//! # Item Repository
//!
//! Catalog storage. The catalog is always written as a whole: the terminal
//! edits its local copy and then replaces the stored list in one
//! transaction, so a failed write leaves the previous catalog intact.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tally_core::Item;

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    shop_id: String,
    name: String,
    price_cents: i64,
    category: String,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            shop_id: row.shop_id,
            name: row.name,
            price_cents: row.price_cents,
            category: row.category,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

/// Repository for catalog items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Loads the shop's catalog in the order it was last saved.
    pub async fn load_items(&self, shop_id: &str) -> DbResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, shop_id, name, price_cents, category, color, created_at
            FROM items
            WHERE shop_id = ?1
            ORDER BY position, created_at
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(shop_id = %shop_id, count = rows.len(), "Loaded items");

        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Replaces the whole catalog of a shop.
    ///
    /// ## Atomicity
    /// ```text
    /// BEGIN
    ///   DELETE FROM items WHERE shop_id = ?
    ///   INSERT item 0, item 1, ... (position = index)
    /// COMMIT            ← any failure before this rolls everything back
    /// ```
    pub async fn replace_items(&self, shop_id: &str, items: &[Item]) -> DbResult<()> {
        debug!(shop_id = %shop_id, count = items.len(), "Replacing items");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::Internal(msg) => DbError::TransactionFailed(msg),
                other => other,
            })?;

        sqlx::query("DELETE FROM items WHERE shop_id = ?1")
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO items (id, shop_id, name, price_cents, category, color, created_at, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(shop_id)
            .bind(&item.name)
            .bind(item.price_cents)
            .bind(&item.category)
            .bind(&item.color)
            .bind(item.created_at)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &item.id),
                other => other,
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(shop_id = %shop_id, count = items.len(), "Catalog replaced");
        Ok(())
    }

    /// Counts the shop's items.
    pub async fn count(&self, shop_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE shop_id = ?1")
            .bind(shop_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
