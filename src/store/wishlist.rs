//! Wishlist repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::domain::aggregates::{ProductId, UserId};
use crate::domain::value_objects::Money;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    product_id: i64,
    name: String,
    unit_price: i64,
    added_at: DateTime<Utc>,
}

pub struct WishlistRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WishlistRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns `false` when the pair was already bookmarked.
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO wishlist (user_id, product_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(product_id)
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM wishlist WHERE user_id = ? AND product_id = ?")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            "SELECT p.id AS product_id, p.name, p.unit_price, w.created_at AS added_at
             FROM wishlist w
             JOIN products p ON w.product_id = p.id
             WHERE w.user_id = ?
             ORDER BY w.created_at, p.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| WishlistItem { product_id: r.product_id, name: r.name, unit_price: Money::from_minor(r.unit_price), added_at: r.added_at })
            .collect())
    }
}
