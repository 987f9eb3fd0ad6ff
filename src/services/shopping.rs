//! Cart and wishlist operations for a logged-in shopper.

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use super::session::Session;
use crate::domain::aggregates::{CartLine, ProductId, UserId};
use crate::domain::value_objects::{Money, Quantity};
use crate::store::wishlist::WishlistItem;
use crate::store::{cart, CartRepository, ProductRepository, WishlistRepository, WriteTx};
use crate::{Result, StorefrontError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: Money,
}

#[derive(Clone)]
pub struct ShoppingService {
    pool: SqlitePool,
}

impl ShoppingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Adds `quantity` of a product to the cart, merging with an existing line.
    ///
    /// The merged quantity is checked against current stock; nothing is reserved here.
    ///
    /// # Errors
    ///
    /// `Validation` for a zero quantity, `NotFound` for an unknown product, and
    /// `InsufficientStock` when the merged line would exceed stock (the cart is left unchanged).
    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub async fn add_to_cart(&self, session: &Session, product_id: ProductId, quantity: u32) -> Result<CartLine> {
        let quantity = Quantity::new(quantity)?;
        let mut tx = WriteTx::begin(&self.pool).await?;
        let result = add_line(&mut tx, session.user_id, product_id, quantity).await;
        let line = tx.finish(result).await?;
        tracing::info!(product_id, quantity = line.quantity.value(), "cart updated");
        Ok(line)
    }

    /// # Errors
    ///
    /// `NotFound` when the product is not in the cart.
    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub async fn remove_from_cart(&self, session: &Session, product_id: ProductId) -> Result<()> {
        if !CartRepository::new(&self.pool).remove(session.user_id, product_id).await? {
            return Err(StorefrontError::not_found("cart line", product_id));
        }
        Ok(())
    }

    pub async fn view_cart(&self, session: &Session) -> Result<CartView> {
        let cart = CartRepository::new(&self.pool).load(session.user_id).await?;
        let total = cart.total().ok_or_else(|| StorefrontError::validation("cart total overflows"))?;
        let lines = cart
            .lines()
            .iter()
            .map(|l| CartLineView {
                product_id: l.product_id,
                name: l.name.clone(),
                unit_price: l.unit_price,
                quantity: l.quantity,
                subtotal: l.subtotal().unwrap_or(Money::ZERO),
            })
            .collect();
        Ok(CartView { lines, total })
    }

    /// Bookmarks a product. Returns `false` if it was already on the wishlist.
    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub async fn add_to_wishlist(&self, session: &Session, product_id: ProductId) -> Result<bool> {
        if ProductRepository::new(&self.pool).get(product_id).await?.is_none() {
            return Err(StorefrontError::not_found("product", product_id));
        }
        WishlistRepository::new(&self.pool).add(session.user_id, product_id).await
    }

    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub async fn remove_from_wishlist(&self, session: &Session, product_id: ProductId) -> Result<()> {
        if !WishlistRepository::new(&self.pool).remove(session.user_id, product_id).await? {
            return Err(StorefrontError::not_found("wishlist entry", product_id));
        }
        Ok(())
    }

    pub async fn view_wishlist(&self, session: &Session) -> Result<Vec<WishlistItem>> {
        WishlistRepository::new(&self.pool).list(session.user_id).await
    }
}

async fn add_line(conn: &mut SqliteConnection, user_id: UserId, product_id: ProductId, quantity: Quantity) -> Result<CartLine> {
    let (name, stock) = sqlx::query_as::<_, (String, i64)>("SELECT name, stock FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StorefrontError::not_found("product", product_id))?;
    let available = u32::try_from(stock).unwrap_or(0);

    let wanted = cart::load(&mut *conn, user_id).await?.quantity_after_add(product_id, quantity);
    if wanted.value() > available {
        return Err(StorefrontError::InsufficientStock { product_id, product: name, available, requested: wanted.value() });
    }
    cart::upsert(&mut *conn, user_id, product_id, wanted).await?;
    cart::load(&mut *conn, user_id)
        .await?
        .line(product_id)
        .cloned()
        .ok_or_else(|| StorefrontError::not_found("cart line", product_id))
}
