use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::extract::{CurrentSession, JsonBody};
use crate::domain::aggregates::{CartLine, ProductId};
use crate::services::CartView;
use crate::store::wishlist::WishlistItem;
use crate::state::AppState;
use crate::Result;

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)] pub struct WishlistRequest { pub product_id: ProductId }
#[derive(Debug, Serialize)] pub struct WishlistAdded { pub product_id: ProductId, pub added: bool }

pub async fn get_cart(State(s): State<AppState>, CurrentSession(session): CurrentSession) -> Result<Json<CartView>> {
    Ok(Json(s.shopping.view_cart(&session).await?))
}

pub async fn add_to_cart(State(s): State<AppState>, CurrentSession(session): CurrentSession, JsonBody(r): JsonBody<AddToCartRequest>) -> Result<(StatusCode, Json<CartLine>)> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(s.shopping.add_to_cart(&session, r.product_id, r.quantity).await?)))
}

pub async fn remove_from_cart(State(s): State<AppState>, CurrentSession(session): CurrentSession, Path(product_id): Path<ProductId>) -> Result<StatusCode> {
    s.shopping.remove_from_cart(&session, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_wishlist(State(s): State<AppState>, CurrentSession(session): CurrentSession) -> Result<Json<Vec<WishlistItem>>> {
    Ok(Json(s.shopping.view_wishlist(&session).await?))
}

pub async fn add_to_wishlist(State(s): State<AppState>, CurrentSession(session): CurrentSession, JsonBody(r): JsonBody<WishlistRequest>) -> Result<(StatusCode, Json<WishlistAdded>)> {
    let added = s.shopping.add_to_wishlist(&session, r.product_id).await?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(WishlistAdded { product_id: r.product_id, added })))
}

pub async fn remove_from_wishlist(State(s): State<AppState>, CurrentSession(session): CurrentSession, Path(product_id): Path<ProductId>) -> Result<StatusCode> {
    s.shopping.remove_from_wishlist(&session, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
