use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sovereign_core::error::{self, ApiError};
use sovereign_core::validation::FieldIssue;

use crate::ai::GenerationError;
use crate::storage::StorageError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        details: Vec<FieldIssue>,
        docs_hint: Option<String>,
    },
    /// Resource not found or not owned by the caller (404)
    NotFound { resource: String },
    /// Request conflicts with the resource's current state (409)
    Conflict { message: String },
    /// Storage failure (500); the cause is logged, never returned
    Storage(StorageError),
    /// Internal error (500)
    Internal(String),
}

impl AppError {
    pub fn validation(details: Vec<FieldIssue>) -> Self {
        let message = match details.as_slice() {
            [single] => single.message.clone(),
            _ => format!("{} fields failed validation", details.len()),
        };
        AppError::Validation {
            message,
            details,
            docs_hint: None,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldIssue::new(field, message)])
    }

    pub fn not_found(kind: &str, id: &str) -> Self {
        AppError::NotFound {
            resource: format!("{kind} {id}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                details,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    message,
                    field: details.first().map(|d| d.field.clone()),
                    details,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                ApiError {
                    error: error::codes::NOT_FOUND.to_string(),
                    message: format!("{resource} not found"),
                    field: None,
                    details: Vec::new(),
                    request_id,
                    docs_hint: None,
                },
            ),
            AppError::Conflict { message } => (
                StatusCode::CONFLICT,
                ApiError {
                    error: error::codes::CONFLICT.to_string(),
                    message,
                    field: None,
                    details: Vec::new(),
                    request_id,
                    docs_hint: None,
                },
            ),
            AppError::Storage(err) => {
                tracing::error!(request_id = %request_id, "Storage error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, internal(request_id))
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = %request_id, "Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, internal(request_id))
            }
        };

        (status, Json(api_error)).into_response()
    }
}

fn internal(request_id: String) -> ApiError {
    ApiError {
        error: error::codes::INTERNAL_ERROR.to_string(),
        message: "An internal error occurred".to_string(),
        field: None,
        details: Vec::new(),
        request_id,
        docs_hint: None,
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::Internal(err.to_string())
    }
}
