#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use opensase_supermarket::config::Config;
use opensase_supermarket::domain::aggregates::{Product, Role};
use opensase_supermarket::notify::MemoryNotifier;
use opensase_supermarket::services::{ProductInput, Session};
use opensase_supermarket::state::AppState;
use opensase_supermarket::store;

pub async fn setup() -> (AppState, MemoryNotifier) {
    let db = store::connect(&Config::default()).await.expect("in-memory database");
    let notifier = MemoryNotifier::new();
    let state = AppState::new(db, Arc::new(notifier.clone()));
    (state, notifier)
}

/// A database file with the deployment pool size, so requests land on different connections.
/// Keep the returned directory alive for the duration of the test.
pub async fn setup_file_db() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("supermarket.db");
    let config = Config {
        database_url: format!("sqlite://{}", path.display()),
        max_connections: 5,
        ..Config::default()
    };
    let db = store::connect(&config).await.expect("file database");
    (AppState::new(db, Arc::new(MemoryNotifier::new())), dir)
}

pub async fn login_as(state: &AppState, username: &str, role: Role) -> Session {
    state.auth.register(username, "password123", role).await.expect("register");
    state.auth.login(username, "password123").await.expect("login")
}

pub fn input(name: &str, category: &str, unit_price: i64, stock: i64) -> ProductInput {
    ProductInput { name: name.to_string(), category: category.to_string(), unit_price, stock }
}

pub async fn add_product(state: &AppState, admin: &Session, name: &str, unit_price: i64, stock: i64) -> Product {
    state.catalog.add_product(admin, input(name, "groceries", unit_price, stock)).await.expect("add product")
}
