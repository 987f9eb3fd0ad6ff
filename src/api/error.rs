use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::StorefrontError;

impl StorefrontError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateUsername(_) | Self::InsufficientStock { .. } => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OrderFailed(_) | Self::DataCorruption(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        // Don't expose store details to clients
        let message = match &self {
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage error");
                "A database error occurred".to_string()
            }
            Self::DataCorruption(msg) => {
                tracing::error!(error = %msg, "data corruption");
                "An internal error occurred".to_string()
            }
            Self::OrderFailed(_) => "The order could not be placed. Please try again.".to_string(),
            other => other.to_string(),
        };

        let mut body = json!({ "error": { "code": self.code(), "message": message } });
        if let Self::InsufficientStock { product_id, product, available, requested } = &self {
            body["error"]["details"] = json!({
                "product_id": product_id, "product": product, "available": available, "requested": requested,
            });
        }
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StorefrontError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(StorefrontError::not_found("order", 1).status(), StatusCode::NOT_FOUND);
        assert_eq!(StorefrontError::DuplicateUsername("alice".into()).status(), StatusCode::CONFLICT);
        assert_eq!(StorefrontError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(StorefrontError::PermissionDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(StorefrontError::EmptyCart.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(StorefrontError::OrderFailed("busy".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let response = StorefrontError::InsufficientStock { product_id: 1, product: "Rice".into(), available: 0, requested: 2 }.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
