//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod user;

pub use product::{Product, ProductDraft, ProductError, ProductId};
pub use order::{Order, OrderDraft, OrderError, OrderId, OrderLine, OrderStatus};
pub use cart::{Cart, CartLine};
pub use user::{Role, User, UserId};
