use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::extract::{CurrentSession, JsonBody};
use crate::domain::aggregates::{Role, UserId};
use crate::services::Session;
use crate::state::AppState;
use crate::Result;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)] pub struct UserResponse { pub id: UserId, pub username: String, pub role: Role }

pub async fn register(State(s): State<AppState>, JsonBody(r): JsonBody<RegisterRequest>) -> Result<(StatusCode, Json<UserResponse>)> {
    r.validate()?;
    let user = s.auth.register(&r.username, &r.password, r.role).await?;
    Ok((StatusCode::CREATED, Json(UserResponse { id: user.id, username: user.username.to_string(), role: user.role })))
}

pub async fn login(State(s): State<AppState>, JsonBody(r): JsonBody<LoginRequest>) -> Result<Json<Session>> {
    r.validate()?;
    Ok(Json(s.auth.login(&r.username, &r.password).await?))
}

pub async fn logout(State(s): State<AppState>, CurrentSession(session): CurrentSession) -> StatusCode {
    s.auth.logout(&session.token).await;
    StatusCode::NO_CONTENT
}

pub async fn me(CurrentSession(session): CurrentSession) -> Json<Session> {
    Json(session)
}
