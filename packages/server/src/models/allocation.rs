use chrono::{DateTime, NaiveDateTime};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    pub user_id: i32,
    pub literature_id: i32,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` without an offset.
    #[schema(example = "2024-05-01T10:00")]
    pub meeting_time: String,
}

/// An allocation joined with its assignee and literature item.
#[derive(Debug, Serialize, FromQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationView {
    pub id: i32,
    pub user_id: i32,
    pub literature_id: i32,
    pub meeting_time: NaiveDateTime,
    pub notes: Option<String>,
    pub slides_filename: Option<String>,
    pub user_name: String,
    pub literature_title: String,
    pub literature_author: String,
    pub literature_year: String,
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a meeting time. Offsets are normalized to UTC.
pub fn parse_meeting_time(raw: &str) -> Result<NaiveDateTime, AppError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| AppError::Validation(format!("Invalid meetingTime: '{raw}'")))
}
