//! Checkout and order history.
//!
//! `place_order` turns the caller's cart into an order in one write transaction: read the cart
//! with current prices and stock, reject the whole cart if any line cannot be supplied, write the
//! order and its lines, take stock, empty the cart, commit. Any failure before commit rolls every
//! write back.

use std::sync::Arc;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use super::session::Session;
use crate::domain::aggregates::{Order, OrderDraft, OrderId};
use crate::notify::{self, Notifier};
use crate::store::{cart, orders, OrderRepository, WriteTx};
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl OrderService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Places an order for everything in the session user's cart.
    ///
    /// # Errors
    ///
    /// - `EmptyCart` when there is nothing to order.
    /// - `InsufficientStock` naming the first line that cannot be supplied; nothing is written.
    /// - `OrderFailed` when the store reports an error; the transaction is rolled back.
    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub async fn place_order(&self, session: &Session) -> Result<Order> {
        let order = self.checkout(session).await.map_err(|e| match e {
            StorefrontError::Storage(err) => {
                tracing::error!(error = %err, "order transaction failed");
                StorefrontError::OrderFailed(err.to_string())
            }
            other => {
                tracing::warn!(reason = %other, "order rejected");
                other
            }
        })?;

        tracing::info!(order_id = order.id(), total = order.total().minor(), lines = order.lines().len(), "order placed");
        notify::publish(self.notifier.as_ref(), &order.placed_event(&session.username));
        Ok(order)
    }

    async fn checkout(&self, session: &Session) -> Result<Order> {
        let mut tx = WriteTx::begin(&self.pool).await?;
        let result = write_order(&mut tx, session).await;
        tx.finish(result).await
    }

    /// The session user's orders, newest first.
    pub async fn history(&self, session: &Session) -> Result<Vec<Order>> {
        OrderRepository::new(&self.pool).history(session.user_id).await
    }

    /// Customers only see their own orders; anything else reads as not found. Admins see all.
    pub async fn get_order(&self, session: &Session, id: OrderId) -> Result<Order> {
        OrderRepository::new(&self.pool)
            .get(id)
            .await?
            .filter(|o| session.is_admin() || o.user_id() == session.user_id)
            .ok_or_else(|| StorefrontError::not_found("order", id))
    }

    pub async fn list_all(&self, session: &Session) -> Result<Vec<Order>> {
        session.require_admin()?;
        OrderRepository::new(&self.pool).list_all().await
    }
}

async fn write_order(conn: &mut SqliteConnection, session: &Session) -> Result<Order> {
    let cart = cart::load(&mut *conn, session.user_id).await?;
    let draft = OrderDraft::from_cart(&cart, Utc::now())?;
    let order_id = orders::insert(&mut *conn, &draft).await?;
    cart::clear(&mut *conn, session.user_id).await?;
    Ok(draft.into_order(order_id))
}
