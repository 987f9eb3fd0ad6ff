use std::sync::Arc;

use sqlx::SqlitePool;

use crate::notify::Notifier;
use crate::services::{AuthService, CatalogService, OrderService, ReviewService, SessionStore, ShoppingService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub shopping: ShoppingService,
    pub orders: OrderService,
    pub reviews: ReviewService,
}

impl AppState {
    pub fn new(db: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        let sessions = SessionStore::new();
        Self {
            auth: AuthService::new(db.clone(), sessions, notifier.clone()),
            catalog: CatalogService::new(db.clone()),
            shopping: ShoppingService::new(db.clone()),
            orders: OrderService::new(db.clone(), notifier),
            reviews: ReviewService::new(db.clone()),
            db,
        }
    }
}
