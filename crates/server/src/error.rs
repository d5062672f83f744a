//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"error": "<message>"}` with a status code chosen per variant; server
//! errors are captured to Sentry and their details are never sent to clients.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::admin::AdminError;
use crate::services::auth::AuthError;
use crate::services::points::PointsError;

/// Application-level error type for the loyalty API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Points engine rejected the operation.
    #[error("Points error: {0}")]
    Points(#[from] PointsError),

    /// Admin operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// Request body or parameters are malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role may not do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidPhone(_)
                | AuthError::MissingIdentity
                | AuthError::InvalidShopName(_)
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::GuestNotFound
                | AuthError::InvalidToken
                | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::ShopNotFound => StatusCode::NOT_FOUND,
                AuthError::ShopAlreadyExists | AuthError::GuestAlreadyExists => {
                    StatusCode::CONFLICT
                }
                AuthError::TokenSigning | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Points(err) => match err {
                PointsError::InvalidInput(_) | PointsError::InsufficientBalance { .. } => {
                    StatusCode::BAD_REQUEST
                }
                PointsError::DuplicateCheck => StatusCode::CONFLICT,
                PointsError::ShopNotFound | PointsError::GuestNotFound => StatusCode::NOT_FOUND,
                PointsError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Admin(err) => match err {
                AdminError::NoFieldsProvided | AdminError::InvalidSetting(_) => {
                    StatusCode::BAD_REQUEST
                }
                AdminError::ShopNotFound => StatusCode::NOT_FOUND,
                AdminError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return "internal server error".to_owned();
        }

        match self {
            Self::Auth(AuthError::InvalidEmail(_)) => "invalid email address".to_owned(),
            Self::Auth(AuthError::InvalidPhone(_)) => "invalid phone number".to_owned(),
            Self::Points(PointsError::InsufficientBalance { .. }) => {
                "insufficient points".to_owned()
            }
            Self::Auth(err) => err.to_string(),
            Self::Points(err) => err.to_string(),
            Self::Admin(err) => err.to_string(),
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg) => msg.clone(),
            Self::Database(_) => "internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated principal.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("guest".to_string());
        assert_eq!(err.to_string(), "Not found: guest");

        let err = AppError::Validation("amount is required".to_string());
        assert_eq!(err.to_string(), "Validation error: amount is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("test".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("test".to_string()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Points(PointsError::DuplicateCheck).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Points(PointsError::InsufficientBalance {
                balance: 10,
                required: 600
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Admin(AdminError::NoFieldsProvided).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth(AuthError::GuestNotFound).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::ShopAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AuthError::TokenSigning).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_token_errors_are_unauthorized() {
        let response = AppError::from(AuthError::TokenExpired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "error": "token expired" }));

        let response = AppError::from(AuthError::InvalidToken).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "error": "invalid token" }));
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = AppError::Points(PointsError::DuplicateCheck).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "check already processed" })
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response =
            AppError::Database(RepositoryError::Database(sqlx::Error::PoolTimedOut))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "internal server error" })
        );
    }
}
