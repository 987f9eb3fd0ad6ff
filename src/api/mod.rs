//! HTTP API.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod error;
pub mod extract;
pub mod orders;
pub mod products;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/categories", get(products::list_categories))
        .route("/api/v1/products", get(products::list_products).post(products::create_product))
        .route("/api/v1/products/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/api/v1/products/:id/reviews", get(products::list_reviews).post(products::create_review))
        .route("/api/v1/cart", get(cart::get_cart).post(cart::add_to_cart))
        .route("/api/v1/cart/:product_id", delete(cart::remove_from_cart))
        .route("/api/v1/wishlist", get(cart::get_wishlist).post(cart::add_to_wishlist))
        .route("/api/v1/wishlist/:product_id", delete(cart::remove_from_wishlist))
        .route("/api/v1/orders", get(orders::list_orders).post(orders::place_order))
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route("/api/v1/admin/orders", get(orders::list_all_orders))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness plus a round trip to the database. Answers 503 when the store is unreachable.
async fn health(State(s): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(&s.db).await {
        Ok(_) => (StatusCode::OK, Json(json!({"status": "healthy", "service": "opensase-supermarket", "database": "ok"}))),
        Err(err) => {
            tracing::error!(error = %err, "health check could not reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unhealthy", "service": "opensase-supermarket", "database": "unavailable"})),
            )
        }
    }
}
