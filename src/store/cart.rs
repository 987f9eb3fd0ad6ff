//! Cart repository.

use sqlx::{SqliteConnection, SqlitePool};

use super::{corrupt, count_from_db};
use crate::domain::aggregates::{Cart, CartLine, ProductId, UserId};
use crate::domain::value_objects::{Money, Quantity};
use crate::{Result, StorefrontError};

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: i64,
    name: String,
    unit_price: i64,
    stock: i64,
    quantity: i64,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = StorefrontError;

    fn try_from(r: CartLineRow) -> Result<Self> {
        let quantity = count_from_db("cart.quantity", r.quantity)?;
        Ok(CartLine {
            product_id: r.product_id,
            name: r.name,
            unit_price: Money::price(r.unit_price).map_err(|e| corrupt("products.unit_price", e))?,
            stock: count_from_db("products.stock", r.stock)?,
            quantity: Quantity::new(quantity).map_err(|e| corrupt("cart.quantity", e))?,
        })
    }
}

/// Reads the user's cart joined with the current product rows.
pub async fn load(conn: &mut SqliteConnection, user_id: UserId) -> Result<Cart> {
    let lines = sqlx::query_as::<_, CartLineRow>(
        "SELECT p.id AS product_id, p.name, p.unit_price, p.stock, c.quantity
         FROM cart c
         JOIN products p ON c.product_id = p.id
         WHERE c.user_id = ?
         ORDER BY p.id",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?
    .into_iter()
    .map(CartLine::try_from)
    .collect::<Result<Vec<_>>>()?;
    Ok(Cart::new(user_id, lines))
}

/// Sets the line for `(user_id, product_id)` to `quantity`, creating it if needed.
pub async fn upsert(conn: &mut SqliteConnection, user_id: UserId, product_id: ProductId, quantity: Quantity) -> Result<()> {
    sqlx::query(
        "INSERT INTO cart (user_id, product_id, quantity) VALUES (?, ?, ?)
         ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = excluded.quantity",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(i64::from(quantity.value()))
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn clear(conn: &mut SqliteConnection, user_id: UserId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart WHERE user_id = ?").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load(&self, user_id: UserId) -> Result<Cart> {
        let mut conn = self.pool.acquire().await?;
        load(&mut conn, user_id).await
    }

    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart WHERE user_id = ? AND product_id = ?")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
