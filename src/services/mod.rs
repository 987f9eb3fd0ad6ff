//! Application services. Every customer or admin operation takes the caller's [`Session`].
pub mod auth;
pub mod catalog;
pub mod orders;
pub mod reviews;
pub mod session;
pub mod shopping;

pub use auth::AuthService;
pub use catalog::{CatalogService, ProductInput, SearchRequest, SearchResults};
pub use orders::OrderService;
pub use reviews::{ProductReviews, ReviewService};
pub use session::{Session, SessionStore};
pub use shopping::{CartView, ShoppingService};
