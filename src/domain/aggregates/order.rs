//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use crate::domain::aggregates::cart::Cart;
use crate::domain::aggregates::product::ProductId;
use crate::domain::aggregates::user::UserId;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Money, Quantity};

pub type OrderId = i64;

/// Orders are created as `Processing` and nothing advances them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Processing,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Processing => "Processing" }
    }
}

impl FromStr for OrderStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s { "Processing" => Ok(Self::Processing), other => Err(format!("unknown order status '{other}'")) }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Line captured at purchase time; `unit_price` never follows later catalog edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn subtotal(&self) -> Option<Money> { self.unit_price.checked_mul(self.quantity) }
}

/// A priced, validated order that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Money,
    pub lines: Vec<OrderLine>,
}

impl OrderDraft {
    /// Prices a cart snapshot. Every line must be satisfiable from the stock read with it,
    /// otherwise nothing is produced.
    pub fn from_cart(cart: &Cart, now: DateTime<Utc>) -> Result<Self, OrderError> {
        if cart.is_empty() { return Err(OrderError::EmptyCart); }
        if let Some(line) = cart.first_shortfall() {
            return Err(OrderError::InsufficientStock {
                product_id: line.product_id, product: line.name.clone(),
                available: line.stock, requested: line.quantity.value(),
            });
        }
        let total = cart.total().ok_or(OrderError::TotalOverflow)?;
        let lines = cart.lines().iter().map(|l| OrderLine {
            product_id: l.product_id, product_name: Some(l.name.clone()), quantity: l.quantity, unit_price: l.unit_price,
        }).collect();
        Ok(Self { user_id: cart.user_id(), created_at: now, status: OrderStatus::Processing, total, lines })
    }

    pub fn into_order(self, id: OrderId) -> Order {
        Order { id, user_id: self.user_id, created_at: self.created_at, status: self.status, total: self.total, lines: self.lines }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    status: OrderStatus,
    total: Money,
    lines: Vec<OrderLine>,
}

impl Order {
    pub fn restore(id: OrderId, user_id: UserId, created_at: DateTime<Utc>, status: OrderStatus, total: Money, lines: Vec<OrderLine>) -> Self {
        Self { id, user_id, created_at, status, total, lines }
    }

    pub fn id(&self) -> OrderId { self.id }
    pub fn user_id(&self) -> UserId { self.user_id }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn total(&self) -> Money { self.total }
    pub fn lines(&self) -> &[OrderLine] { &self.lines }

    /// Recomputed from captured line prices; equals `total()` for every committed order.
    pub fn lines_total(&self) -> Option<Money> {
        self.lines.iter().try_fold(Money::ZERO, |acc, l| acc.checked_add(l.subtotal()?))
    }

    pub fn placed_event(&self, username: &str) -> DomainEvent {
        DomainEvent::Order(OrderEvent::Placed {
            order_id: self.id, user_id: self.user_id, username: username.to_string(),
            total: self.total, line_count: self.lines.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock { product_id: ProductId, product: String, available: u32, requested: u32 },
    #[error("order total overflows")]
    TotalOverflow,
}
