use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::PreviewError;
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::services::identity::IdentityError;
use crate::services::ledger::LedgerError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    #[schema(example = false)]
    pub success: bool,
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `PERMISSION_DENIED`,
    /// `NOT_FOUND`, `PAYLOAD_TOO_LARGE`, `STORAGE_ERROR`, `DATABASE_ERROR`,
    /// `SERVER_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Title must not be empty")]
    pub message: String,
}

impl ErrorBody {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
        }
    }
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    PermissionDenied,
    NotFound(String),
    PayloadTooLarge(String),
    /// Blob store failure. The message is passed to the client as-is.
    Storage(String),
    /// Database failure. The message is passed to the client as-is.
    Persistence(String),
    /// A failed operation reported to the client only as "Server error".
    Server(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("VALIDATION_ERROR", msg),
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody::new(
                    "PERMISSION_DENIED",
                    "Allocation not found or does not belong to the caller",
                ),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new("NOT_FOUND", msg)),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody::new("PAYLOAD_TOO_LARGE", msg),
            ),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("STORAGE_ERROR", msg),
                )
            }
            AppError::Persistence(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("DATABASE_ERROR", msg),
                )
            }
            AppError::Server(detail) => {
                tracing::error!("Operation failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("SERVER_ERROR", "Server error"),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("INTERNAL_ERROR", "An unexpected error occurred"),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) | StorageError::InvalidName(_) => {
                AppError::NotFound("File not found".into())
            }
            StorageError::SizeLimitExceeded { limit, .. } => {
                AppError::PayloadTooLarge(format!("File exceeds maximum size of {limit} bytes"))
            }
            StorageError::Io(e) => AppError::Storage(e.to_string()),
        }
    }
}

impl From<PreviewError> for AppError {
    fn from(err: PreviewError) -> Self {
        match err {
            PreviewError::Storage(e) => AppError::from(e),
            PreviewError::Conversion(e) => {
                AppError::Internal(format!("Document conversion failed: {e}"))
            }
            PreviewError::Join(e) => AppError::Internal(format!("Conversion task failed: {e}")),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::PermissionDenied => AppError::PermissionDenied,
            LedgerError::InvalidReference(detail) => AppError::Server(detail),
            LedgerError::Database(e) => AppError::from(e),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Validation(msg) => AppError::Validation(msg),
            IdentityError::UnknownAccount(id) => {
                AppError::NotFound(format!("User {id} not found"))
            }
            IdentityError::Duplicate => AppError::Validation("Username already exists".into()),
            IdentityError::IncorrectPassword => {
                AppError::Validation("Incorrect old password".into())
            }
            IdentityError::Database(e) => AppError::from(e),
        }
    }
}
