//! OpenSASE Supermarket
//!
//! Self-hosted supermarket storefront backed by a single SQLite database.
//!
//! ## Features
//! - Product catalog with search and admin management
//! - Per-user cart and wishlist
//! - Atomic order placement with stock reservation
//! - Order history with purchase-time prices
//! - Product ratings and reviews

use std::fmt;
use thiserror::Error;

pub mod api;
pub mod config;
pub mod domain;
pub mod notify;
pub mod services;
pub mod state;
pub mod store;

use domain::aggregates::{OrderError, ProductError, ProductId};
use domain::value_objects::ValueError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Insufficient stock for {product}. Available: {available}, Requested: {requested}")]
    InsufficientStock { product_id: ProductId, product: String, available: u32, requested: u32 },

    #[error("Order failed: {0}")]
    OrderFailed(String),

    #[error("Data corruption: {0}")]
    DataCorruption(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl StorefrontError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    /// Stable machine-readable code for API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateUsername(_) => "duplicate_username",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unauthenticated => "unauthenticated",
            Self::PermissionDenied => "permission_denied",
            Self::EmptyCart => "empty_cart",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::OrderFailed(_) => "order_failed",
            Self::DataCorruption(_) | Self::Storage(_) => "internal_error",
        }
    }
}

impl From<ValueError> for StorefrontError {
    fn from(err: ValueError) -> Self { Self::Validation(err.to_string()) }
}

impl From<ProductError> for StorefrontError {
    fn from(err: ProductError) -> Self { Self::Validation(err.to_string()) }
}

impl From<OrderError> for StorefrontError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyCart => Self::EmptyCart,
            OrderError::InsufficientStock { product_id, product, available, requested } => {
                Self::InsufficientStock { product_id, product, available, requested }
            }
            OrderError::TotalOverflow => Self::OrderFailed(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StorefrontError::InsufficientStock { product_id: 4, product: "Product 4".into(), available: 1, requested: 3 };
        assert_eq!(err.to_string(), "Insufficient stock for Product 4. Available: 1, Requested: 3");
        assert_eq!(err.code(), "insufficient_stock");
        assert_eq!(StorefrontError::not_found("product", 9).to_string(), "product 9 not found");
    }

    #[test]
    fn test_order_error_mapping() {
        assert!(matches!(StorefrontError::from(OrderError::EmptyCart), StorefrontError::EmptyCart));
        assert!(matches!(StorefrontError::from(OrderError::TotalOverflow), StorefrontError::OrderFailed(_)));
    }
}
