//! Product Aggregate

use serde::Serialize;
use thiserror::Error;
use crate::domain::value_objects::{Category, Money, ValueError};

pub type ProductId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    category: Category,
    category_code: i64,
    unit_price: Money,
    stock: u32,
}

/// Validated field set for creating or replacing a product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub category: Category,
    pub unit_price: Money,
    pub stock: u32,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, category: &str, unit_price: i64, stock: i64) -> Result<Self, ProductError> {
        let name = name.into().trim().to_string();
        if name.is_empty() { return Err(ProductError::MissingName); }
        let category = category.parse::<Category>()?;
        let unit_price = Money::price(unit_price)?;
        if stock < 0 { return Err(ValueError::NegativeStock.into()); }
        let stock = u32::try_from(stock).map_err(|_| ValueError::StockOutOfRange { max: u32::MAX })?;
        Ok(Self { name, category, unit_price, stock })
    }
}

impl Product {
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id, name: draft.name, category: draft.category, category_code: draft.category.code(),
            unit_price: draft.unit_price, stock: draft.stock,
        }
    }

    pub fn id(&self) -> ProductId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn category(&self) -> Category { self.category }
    pub fn unit_price(&self) -> Money { self.unit_price }
    pub fn stock(&self) -> u32 { self.stock }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product name must not be empty")]
    MissingName,
    #[error(transparent)]
    Invalid(#[from] ValueError),
}
