use axum::{extract::{Path, State}, http::StatusCode, Json};

use super::extract::{AdminSession, CurrentSession};
use crate::domain::aggregates::{Order, OrderId};
use crate::state::AppState;
use crate::Result;

pub async fn place_order(State(s): State<AppState>, CurrentSession(session): CurrentSession) -> Result<(StatusCode, Json<Order>)> {
    Ok((StatusCode::CREATED, Json(s.orders.place_order(&session).await?)))
}

pub async fn list_orders(State(s): State<AppState>, CurrentSession(session): CurrentSession) -> Result<Json<Vec<Order>>> {
    Ok(Json(s.orders.history(&session).await?))
}

pub async fn get_order(State(s): State<AppState>, CurrentSession(session): CurrentSession, Path(id): Path<OrderId>) -> Result<Json<Order>> {
    Ok(Json(s.orders.get_order(&session, id).await?))
}

pub async fn list_all_orders(State(s): State<AppState>, AdminSession(admin): AdminSession) -> Result<Json<Vec<Order>>> {
    Ok(Json(s.orders.list_all(&admin).await?))
}
