//! Error types for Bookshelf server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned for every failed sign-in, whatever the cause
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// No account with a password credential for the submitted email
    #[error("No account found with this email")]
    AccountNotFound,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Federated identity assertion rejected by the provider
    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Missing or invalid session")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// Status code and client-facing message
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::AccountNotFound | AppError::Authentication(_) => {
                (StatusCode::UNAUTHORIZED, AUTHENTICATION_FAILED.to_string())
            }
            AppError::Provider(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => {}
        }

        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_failures_share_one_message() {
        let (missing_status, missing_msg) = AppError::AccountNotFound.status_and_message();
        let (wrong_status, wrong_msg) =
            AppError::Authentication("Incorrect password".into()).status_and_message();

        assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
        assert_eq!(missing_status, wrong_status);
        assert_eq!(missing_msg, wrong_msg);
        assert_eq!(wrong_msg, AUTHENTICATION_FAILED);
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let (status, msg) =
            AppError::Internal("connection refused at 10.0.0.3:5432".into()).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!msg.contains("10.0.0.3"));

        let (status, msg) = AppError::Database(sqlx::Error::PoolTimedOut).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Database error");
    }

    #[test]
    fn resource_errors_map_to_expected_statuses() {
        assert_eq!(AppError::Forbidden.status_and_message().0, StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::NotFound("Book 1".into()).status_and_message(),
            (StatusCode::NOT_FOUND, "Not found".to_string())
        );
        assert_eq!(
            AppError::Unauthenticated.status_and_message().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Conflict("dup".into()).status_and_message().0,
            StatusCode::CONFLICT
        );
    }
}
