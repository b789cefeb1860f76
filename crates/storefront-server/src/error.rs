//! Handler error type and its JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storefront_common::validation::{FieldError, ValidationErrors};
use thiserror::Error;

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler can report to a client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed `Authorization` header (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Token failed to parse, verify, or carried a bad subject (401).
    #[error("Invalid token")]
    InvalidToken,

    /// Token is past its expiry (401).
    #[error("Token has expired")]
    ExpiredToken,

    /// The token's subject no longer exists (401).
    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Field constraints failed (422).
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Request body, path or query could not be parsed (400).
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    /// Store or other server-side failure. Details are logged, never returned.
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_)
            | ApiError::InvalidToken
            | ApiError::ExpiredToken
            | ApiError::UserNotFound => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::ExpiredToken => "EXPIRED_TOKEN",
            ApiError::UserNotFound => "USER_NOT_FOUND",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.into())
    }
}

/// Error envelope: `{success: false, message, code, errors?}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let (message, errors) = match self {
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                ("Internal server error".to_string(), None)
            }
            ApiError::Validation(errors) => ("Validation failed".to_string(), Some(errors.fields)),
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            success: false,
            message,
            code,
            errors,
        };
        (status, Json(body)).into_response()
    }
}
