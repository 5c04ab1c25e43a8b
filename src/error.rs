//! Error types for the contacts server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{repository::StoreError, validation::FieldError};

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Storage error while {action}: {source}")]
    Storage {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database handle not initialized")]
    Uninitialized,
}

impl AppError {
    /// Wrap a store failure with the action that was being performed
    pub fn storage(action: &'static str, source: StoreError) -> Self {
        AppError::Storage { action, source }
    }
}

/// Single-cause error body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

/// Validation error body listing every failed rule
#[derive(Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(errors) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ValidationErrorResponse { errors }),
                )
                    .into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Storage { action, source } => {
                tracing::error!("Storage error while {}: {:?}", action, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error while {}.", action),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::Uninitialized => {
                tracing::error!("Database handle requested before initialization");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
