//! Cart Aggregate

use serde::Serialize;
use crate::domain::aggregates::product::ProductId;
use crate::domain::aggregates::user::UserId;
use crate::domain::value_objects::{Money, Quantity};

/// A cart line joined with the product row as it was read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub stock: u32,
    pub quantity: Quantity,
}

impl CartLine {
    pub fn subtotal(&self) -> Option<Money> { self.unit_price.checked_mul(self.quantity) }
    pub fn is_satisfiable(&self) -> bool { self.stock >= self.quantity.value() }
}

#[derive(Clone, Debug)]
pub struct Cart {
    user_id: UserId,
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(user_id: UserId, lines: Vec<CartLine>) -> Self { Self { user_id, lines } }

    pub fn user_id(&self) -> UserId { self.user_id }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> { self.lines.iter().find(|l| l.product_id == product_id) }

    /// Quantity the line for `product_id` would hold after adding `qty`; adds merge into the existing line.
    pub fn quantity_after_add(&self, product_id: ProductId, qty: Quantity) -> Quantity {
        self.line(product_id).map_or(qty, |l| l.quantity.add(qty))
    }

    /// First line whose requested quantity exceeds the stock that was read with it.
    pub fn first_shortfall(&self) -> Option<&CartLine> { self.lines.iter().find(|l| !l.is_satisfiable()) }

    /// Sum of line subtotals, `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        self.lines.iter().try_fold(Money::ZERO, |acc, l| acc.checked_add(l.subtotal()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: ProductId, price: i64, stock: u32, qty: u32) -> CartLine {
        CartLine { product_id, name: format!("Product {product_id}"), unit_price: Money::from_minor(price), stock, quantity: Quantity::new(qty).unwrap() }
    }

    #[test]
    fn test_cart_operations() {
        let cart = Cart::new(7, vec![line(1, 1000, 5, 2), line(2, 500, 5, 1)]);
        assert_eq!(cart.total(), Some(Money::from_minor(2500)));
        assert!(cart.first_shortfall().is_none());
        assert_eq!(cart.quantity_after_add(1, Quantity::new(3).unwrap()).value(), 5); // Merged
        assert_eq!(cart.quantity_after_add(9, Quantity::new(3).unwrap()).value(), 3);
    }

    #[test]
    fn test_shortfall_reports_first_unsatisfiable_line() {
        let cart = Cart::new(7, vec![line(1, 1000, 5, 2), line(2, 500, 0, 1), line(3, 10, 1, 4)]);
        assert_eq!(cart.first_shortfall().map(|l| l.product_id), Some(2));
    }

    #[test]
    fn test_total_overflow() {
        let cart = Cart::new(7, vec![line(1, i64::MAX, 5, 2)]);
        assert_eq!(cart.total(), None);
    }
}
