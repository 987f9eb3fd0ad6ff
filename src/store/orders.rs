//! Order repository: the write path used by checkout and the read paths behind order history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use super::{corrupt, count_from_db};
use crate::domain::aggregates::{Order, OrderDraft, OrderId, OrderLine, OrderStatus, UserId};
use crate::domain::value_objects::{Money, Quantity};
use crate::{Result, StorefrontError};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
    status: String,
    total_amount: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: i64,
    product_id: i64,
    product_name: Option<String>,
    quantity: i64,
    unit_price: i64,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = StorefrontError;

    fn try_from(r: OrderLineRow) -> Result<Self> {
        let quantity = count_from_db("order_items.quantity", r.quantity)?;
        Ok(OrderLine {
            product_id: r.product_id,
            product_name: r.product_name,
            quantity: Quantity::new(quantity).map_err(|e| corrupt("order_items.quantity", e))?,
            unit_price: Money::price(r.unit_price).map_err(|e| corrupt("order_items.unit_price", e))?,
        })
    }
}

/// Writes the order header and lines and takes each line's quantity out of stock.
///
/// The stock decrement is conditional on enough stock remaining, so a row that changed after the
/// cart was read is reported as `InsufficientStock` instead of going negative. The caller owns the
/// transaction and must drop it uncommitted on any error.
pub async fn insert(conn: &mut SqliteConnection, draft: &OrderDraft) -> Result<OrderId> {
    let order_id = sqlx::query("INSERT INTO orders (user_id, created_at, status, total_amount) VALUES (?, ?, ?, ?)")
        .bind(draft.user_id)
        .bind(draft.created_at)
        .bind(draft.status.as_str())
        .bind(draft.total.minor())
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    for line in &draft.lines {
        let qty = i64::from(line.quantity.value());
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (?, ?, ?, ?)")
            .bind(order_id)
            .bind(line.product_id)
            .bind(qty)
            .bind(line.unit_price.minor())
            .execute(&mut *conn)
            .await?;

        let updated = sqlx::query("UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?")
            .bind(qty)
            .bind(line.product_id)
            .bind(qty)
            .execute(&mut *conn)
            .await?;
        if updated.rows_affected() == 0 {
            let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
                .bind(line.product_id)
                .fetch_optional(&mut *conn)
                .await?;
            return Err(StorefrontError::InsufficientStock {
                product_id: line.product_id,
                product: line.product_name.clone().unwrap_or_else(|| format!("product {}", line.product_id)),
                available: available.map_or(Ok(0), |s| count_from_db("products.stock", s))?,
                requested: line.quantity.value(),
            });
        }
    }
    Ok(order_id)
}

fn assemble(rows: Vec<OrderRow>, line_rows: Vec<OrderLineRow>) -> Result<Vec<Order>> {
    let mut lines: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for row in line_rows {
        lines.entry(row.order_id).or_default().push(OrderLine::try_from(row)?);
    }
    rows.into_iter()
        .map(|r| {
            let status = r.status.parse::<OrderStatus>().map_err(|e| corrupt("orders.status", e))?;
            let total = Money::from_minor(r.total_amount);
            Ok(Order::restore(r.id, r.user_id, r.created_at, status, total, lines.remove(&r.id).unwrap_or_default()))
        })
        .collect()
}

const ORDER_COLUMNS: &str = "id, user_id, created_at, status, total_amount";
const LINE_SELECT: &str = "SELECT oi.order_id, oi.product_id, p.name AS product_name, oi.quantity, oi.unit_price
     FROM order_items oi
     LEFT JOIN products p ON p.id = oi.product_id";

pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Every order of `user_id`, newest first, each with its lines.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        let lines = sqlx::query_as::<_, OrderLineRow>(&format!(
            "{LINE_SELECT} WHERE oi.order_id IN (SELECT id FROM orders WHERE user_id = ?) ORDER BY oi.order_id, oi.rowid"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        assemble(orders, lines)
    }

    pub async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let Some(order) = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        let lines = sqlx::query_as::<_, OrderLineRow>(&format!("{LINE_SELECT} WHERE oi.order_id = ? ORDER BY oi.rowid"))
            .bind(id)
            .fetch_all(self.pool)
            .await?;
        Ok(assemble(vec![order], lines)?.pop())
    }

    /// All orders in the shop, newest first.
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"))
            .fetch_all(self.pool)
            .await?;
        let lines = sqlx::query_as::<_, OrderLineRow>(&format!("{LINE_SELECT} ORDER BY oi.order_id, oi.rowid"))
            .fetch_all(self.pool)
            .await?;
        assemble(orders, lines)
    }
}
