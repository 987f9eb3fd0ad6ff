use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

use super::extract::{AdminSession, CurrentSession, JsonBody};
use crate::domain::aggregates::{Product, ProductId};
use crate::services::catalog::CategoryInfo;
use crate::services::{ProductInput, ProductReviews, SearchRequest, SearchResults};
use crate::store::ratings::Review;
use crate::state::AppState;
use crate::Result;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: String,
    #[validate(range(min = 1))]
    pub unit_price: i64,
    #[validate(range(min = 0))]
    pub stock: i64,
}

impl From<ProductRequest> for ProductInput {
    fn from(r: ProductRequest) -> Self {
        Self { name: r.name, category: r.category, unit_price: r.unit_price, stock: r.stock }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub review: String,
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<SearchParams>) -> Result<Json<SearchResults>> {
    let req = SearchRequest { query: p.q, category: p.category, min_price: p.min_price, max_price: p.max_price, page: p.page, per_page: p.per_page };
    Ok(Json(s.catalog.search(req).await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Product>> {
    Ok(Json(s.catalog.get_product(id).await?))
}

pub async fn create_product(State(s): State<AppState>, AdminSession(admin): AdminSession, JsonBody(r): JsonBody<ProductRequest>) -> Result<(StatusCode, Json<Product>)> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(s.catalog.add_product(&admin, r.into()).await?)))
}

pub async fn update_product(State(s): State<AppState>, AdminSession(admin): AdminSession, Path(id): Path<ProductId>, JsonBody(r): JsonBody<ProductRequest>) -> Result<Json<Product>> {
    r.validate()?;
    Ok(Json(s.catalog.update_product(&admin, id, r.into()).await?))
}

pub async fn delete_product(State(s): State<AppState>, AdminSession(admin): AdminSession, Path(id): Path<ProductId>) -> Result<StatusCode> {
    s.catalog.remove_product(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(State(s): State<AppState>) -> Json<Vec<CategoryInfo>> {
    Json(s.catalog.categories())
}

pub async fn list_reviews(State(s): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<ProductReviews>> {
    Ok(Json(s.reviews.product_reviews(id).await?))
}

pub async fn create_review(State(s): State<AppState>, CurrentSession(session): CurrentSession, Path(id): Path<ProductId>, JsonBody(r): JsonBody<ReviewRequest>) -> Result<(StatusCode, Json<Review>)> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(s.reviews.rate_product(&session, id, r.rating, &r.review).await?)))
}
