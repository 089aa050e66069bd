use serde::{Deserialize, Serialize};

use crate::entity::literature;
use crate::error::AppError;
use crate::services::catalog::LiteratureFields;

use super::shared::require_non_empty;

#[derive(Serialize, utoipa::ToSchema)]
pub struct LiteratureResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub source: String,
    pub year: String,
    pub author: String,
    pub unit: String,
    /// Blob handle, usable with `/preview/{filename}` and `/files/{filename}`.
    #[schema(example = "0192f5d2c1b87c3e9a0b4c1d2e3f4a5b.docx")]
    pub file: String,
}

impl From<literature::Model> for LiteratureResponse {
    fn from(m: literature::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            source: m.source,
            year: m.year,
            author: m.author,
            unit: m.unit,
            file: m.file,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadLiteratureResponse {
    #[schema(example = 1)]
    pub id: i32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateLiteratureRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub unit: String,
    pub file: String,
}

impl UpdateLiteratureRequest {
    /// Split into metadata and the file handle.
    pub fn into_parts(self) -> (LiteratureFields, String) {
        (
            LiteratureFields {
                title: self.title,
                description: self.description,
                source: self.source,
                year: self.year,
                author: self.author,
                unit: self.unit,
            },
            self.file,
        )
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the author.
    pub author: Option<String>,
}

pub fn validate_fields(fields: &LiteratureFields) -> Result<(), AppError> {
    require_non_empty(&fields.title, "Title")
}

pub fn validate_update_request(req: &UpdateLiteratureRequest) -> Result<(), AppError> {
    require_non_empty(&req.title, "Title")?;
    require_non_empty(&req.file, "File")
}
