//! Error types for the bookstore server

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Fixed message returned for writes by users who neither own the book nor are staff
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action.";

/// Validation messages keyed by the offending field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0:?}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error carrying a single message for a single field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(errors)
    }
}

/// Error response body for everything except field validation
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
            }
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::PermissionDenied => {
                (StatusCode::FORBIDDEN, PERMISSION_DENIED_MESSAGE.to_string())
            }
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "Not found.".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        AppError::Validation(fields)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Unparseable ids cannot name an existing row
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::NotFound(rejection.body_text())
    }
}

/// Well-formed JSON whose fields do not fit the target type
impl From<serde_path_to_error::Error<serde_json::Error>> for AppError {
    fn from(error: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = error.path().to_string();
        let inner = error.into_inner().to_string();

        if let Some(field) = inner
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
        {
            let field = if path == "." {
                field.to_string()
            } else {
                format!("{}.{}", path, field)
            };
            return AppError::invalid_field(&field, "This field is required.");
        }

        if path == "." {
            return AppError::invalid_field(
                "non_field_errors",
                "Invalid data. Expected a dictionary.",
            );
        }

        AppError::invalid_field(&path, type_mismatch_message(&inner))
    }
}

fn type_mismatch_message(serde_message: &str) -> &'static str {
    if serde_message.contains("expected a boolean") {
        "Must be a valid boolean."
    } else if serde_message.contains("fixed-point number") {
        "A valid number is required."
    } else if serde_message.contains("expected i") || serde_message.contains("expected u") {
        "A valid integer is required."
    } else if serde_message.contains("expected a string") {
        "Not a valid string."
    } else {
        "Invalid value."
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
