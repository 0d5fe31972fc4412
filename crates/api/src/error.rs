//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, ApiError>`; every error leaves the HTTP boundary as a JSON
//! body of the form `{"error": <message>}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use greengrocer_core::types::{EmailError, PhoneError, PriceError};
use greengrocer_core::validation::ValidationError;

use crate::db::RepositoryError;

/// Message returned for uniqueness/foreign-key violations at the store.
pub const INTEGRITY_ERROR_MESSAGE: &str = "Integrity error occurred.";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Semantic field violation (weak password, short username, ...).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Semantic value violation (malformed email/phone, non-positive price).
    #[error("{0}")]
    Value(String),

    /// Referenced entity absent.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness or foreign-key violation at the store.
    #[error("{INTEGRITY_ERROR_MESSAGE}")]
    IntegrityConflict,

    /// Unexpected database failure.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::IntegrityConflict,
            RepositoryError::NotFound => Self::NotFound("Not found".to_string()),
            RepositoryError::Database(e) => Self::Database(e),
            RepositoryError::DataCorruption(msg) => Self::Internal(msg),
        }
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        Self::Value(err.to_string())
    }
}

impl From<PhoneError> for ApiError {
    fn from(err: PhoneError) -> Self {
        Self::Value(err.to_string())
    }
}

impl From<PriceError> for ApiError {
    fn from(err: PriceError) -> Self {
        Self::Value(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) | Self::Value(_) | Self::IntegrityConflict => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(ApiError::Validation(ValidationError::WeakPassword)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Value("invalid email input".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::NotFound("Customer not found".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ApiError::IntegrityConflict),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::Conflict("duplicate email".to_string()).into();
        assert!(matches!(err, ApiError::IntegrityConflict));
        assert_eq!(err.to_string(), INTEGRITY_ERROR_MESSAGE);

        let err: ApiError = RepositoryError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let response = ApiError::Internal("connection string leaked".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
