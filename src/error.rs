use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The single error taxonomy every handler speaks. Each variant maps to one
/// HTTP status, and every error is terminal for its request: ownership and
/// parent-resolution checks run before any write, so a rejected request never
/// leaves a partial mutation behind.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    /// A request body failed field-level validation (400).
    #[error("validation failed on `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    /// Missing or unresolvable bearer token on a protected operation (401).
    #[error("authentication credentials were not provided or are invalid")]
    Unauthenticated,

    /// Authenticated, but acting on content owned by someone else (403).
    #[error("cannot modify or delete content belonging to another user")]
    PermissionDenied,

    /// Unknown id, or an unresolved parent post for a nested route (404).
    #[error("not found")]
    NotFound,

    /// A persistence failure that is not the client's fault (500). The
    /// underlying sqlx error has already been logged by `From<sqlx::Error>`.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn validation(field: &'static str, message: &'static str) -> Self {
        ApiError::Validation { field, message }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    /// Serializes the error the way the API clients expect: validation errors
    /// carry field-level messages, everything else a single `detail` string.
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Validation { field, message } => json!({ *field: [message] }),
            ApiError::Unauthenticated => {
                json!({ "detail": "Invalid token." })
            }
            ApiError::PermissionDenied => {
                json!({ "detail": "You cannot modify or delete content belonging to another user." })
            }
            ApiError::NotFound => json!({ "detail": "Not found." }),
            ApiError::Internal => json!({ "detail": "Internal server error." }),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    /// Database failures are logged here so handlers stay free of error
    /// plumbing. The one client-attributable case is a foreign-key violation:
    /// the only FK a request body can break is the post -> group reference
    /// (authors come from the token, comment parents are resolved from the
    /// path first), so it surfaces as a validation error on `group`.
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_foreign_key_violation() {
                return ApiError::validation("group", "Invalid pk - object does not exist.");
            }
        }
        tracing::error!("database error: {:?}", e);
        ApiError::Internal
    }
}
