use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const CALLER_HEADER: &str = "X-User-Id";

/// Id of the user on whose behalf the request is made, taken from the
/// `X-User-Id` header. The value is trusted as sent.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
    pub user_id: i32,
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i32>().ok())
            .ok_or(AppError::PermissionDenied)?;

        Ok(CallerIdentity { user_id })
    }
}
