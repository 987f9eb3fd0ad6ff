//! Session and body extractors.
//!
//! Callers authenticate with `Authorization: Bearer <token>` where the token came from login.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::services::Session;
use crate::state::AppState;
use crate::StorefrontError;

/// Any logged-in user. Rejects with 401 when the token is missing or not live.
pub struct CurrentSession(pub Session);

/// A logged-in admin. Rejects with 401 when not logged in and 403 for other roles.
pub struct AdminSession(pub Session);

pub(crate) fn bearer_token(parts: &Parts) -> Option<Uuid> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    token.trim().parse().ok()
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = StorefrontError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(StorefrontError::Unauthenticated)?;
        Ok(Self(state.auth.session(&token).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = StorefrontError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        session.require_admin()?;
        Ok(Self(session))
    }
}

/// A JSON request body. Malformed or ill-typed bodies reject with the usual `validation_error`
/// envelope instead of axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = StorefrontError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| StorefrontError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}
