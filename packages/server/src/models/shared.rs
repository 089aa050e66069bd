use serde::Serialize;

use crate::error::AppError;

/// Outcome of an operation that reports success or a handled failure with
/// a message and no further payload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    #[schema(example = "Literature allocated successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Number of rows touched by an update or delete.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ChangesResponse {
    #[schema(example = 1)]
    pub changes: u64,
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Require a field to contain something other than whitespace.
pub fn require_non_empty(value: &str, name: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }
    Ok(())
}
