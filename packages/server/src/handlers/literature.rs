use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use common::storage::BlobName;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::literature::{
    LiteratureResponse, SearchQuery, UpdateLiteratureRequest, UploadLiteratureResponse,
    validate_fields, validate_update_request,
};
use crate::models::shared::ChangesResponse;
use crate::services::catalog::{CatalogService, LiteratureFields};
use crate::state::AppState;
use crate::utils::upload::{read_text_field, stream_field_to_store};

#[utoipa::path(
    post,
    path = "/upload-literature",
    tag = "Literature",
    operation_id = "uploadLiterature",
    summary = "Add a literature item with its document",
    description = "Multipart form with text fields `title`, `description`, `source`, `year`, \
        `author`, `unit` and the document in `file`. The document is stored first; if the \
        metadata cannot be saved afterwards the stored document is kept.",
    request_body(content_type = "multipart/form-data", description = "Metadata and document"),
    responses(
        (status = 200, description = "Literature created", body = UploadLiteratureResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "Document too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "Storage or database error", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_literature(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadLiteratureResponse>, AppError> {
    let mut fields = LiteratureFields::default();
    let mut stored: Option<BlobName> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let target = match field.name() {
            Some("file") => {
                let original_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
                stored = Some(
                    stream_field_to_store(
                        field,
                        &original_name,
                        &*state.blob_store,
                        state.config.storage.max_blob_size,
                    )
                    .await?,
                );
                continue;
            }
            Some("title") => &mut fields.title,
            Some("description") => &mut fields.description,
            Some("source") => &mut fields.source,
            Some("year") => &mut fields.year,
            Some("author") => &mut fields.author,
            Some("unit") => &mut fields.unit,
            _ => continue, // Ignore unknown fields.
        };
        *target = read_text_field(field).await?;
    }

    let file = stored.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    validate_fields(&fields)?;

    let id = CatalogService::new(&state.db)
        .create(fields, &file)
        .await
        .inspect_err(|e| {
            tracing::warn!(blob = %file, "Stored document has no literature record: {e}");
        })?;

    Ok(Json(UploadLiteratureResponse { id }))
}

#[utoipa::path(
    get,
    path = "/literatures",
    tag = "Literature",
    operation_id = "listLiteratures",
    summary = "List every literature item",
    responses(
        (status = 200, description = "Literature ordered by id", body = Vec<LiteratureResponse>),
        (status = 500, description = "Database error (DATABASE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_literatures(
    State(state): State<AppState>,
) -> Result<Json<Vec<LiteratureResponse>>, AppError> {
    let rows = CatalogService::new(&state.db).list().await?;
    Ok(Json(rows.into_iter().map(LiteratureResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Literature",
    operation_id = "searchLiteratures",
    summary = "Search literature by title and author",
    description = "Both filters are case-insensitive substring matches and are combined with AND. \
        Blank or omitted filters match everything.",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching literature ordered by id", body = Vec<LiteratureResponse>),
        (status = 500, description = "Database error (DATABASE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(title = ?query.title, author = ?query.author))]
pub async fn search_literatures(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<LiteratureResponse>>, AppError> {
    let rows = CatalogService::new(&state.db)
        .search(query.title.as_deref(), query.author.as_deref())
        .await?;
    Ok(Json(rows.into_iter().map(LiteratureResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/literatures/{id}",
    tag = "Literature",
    operation_id = "updateLiterature",
    summary = "Replace a literature item's metadata",
    description = "Overwrites every field including the `file` handle. `changes` is 0 when the \
        id does not exist.",
    params(("id" = i32, Path, description = "Literature ID")),
    request_body = UpdateLiteratureRequest,
    responses(
        (status = 200, description = "Rows changed", body = ChangesResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Database error (DATABASE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_literature(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateLiteratureRequest>,
) -> Result<Json<ChangesResponse>, AppError> {
    validate_update_request(&payload)?;
    let (fields, file) = payload.into_parts();

    let changes = CatalogService::new(&state.db)
        .update(id, fields, file)
        .await?;
    Ok(Json(ChangesResponse { changes }))
}

#[utoipa::path(
    delete,
    path = "/literatures/{id}",
    tag = "Literature",
    operation_id = "deleteLiterature",
    summary = "Delete a literature item",
    description = "Removes the record only; the stored document stays available. \
        `changes` is 0 when the id does not exist.",
    params(("id" = i32, Path, description = "Literature ID")),
    responses(
        (status = 200, description = "Rows changed", body = ChangesResponse),
        (status = 500, description = "Database error (DATABASE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_literature(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ChangesResponse>, AppError> {
    let changes = CatalogService::new(&state.db).delete(id).await?;
    Ok(Json(ChangesResponse { changes }))
}
