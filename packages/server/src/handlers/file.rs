use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use common::storage::BlobName;
use common::{Preview, preview};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::utils::disposition::{Disposition, content_disposition_value};

fn parse_handle(filename: &str) -> Result<BlobName, AppError> {
    BlobName::parse(filename).map_err(|_| AppError::NotFound("File not found".into()))
}

#[utoipa::path(
    get,
    path = "/preview/{filename}",
    tag = "Files",
    operation_id = "previewFile",
    summary = "Display a stored document",
    description = "Word documents (`.docx`) are converted to a standalone HTML page; every other \
        file is returned unchanged with a content type guessed from its extension.",
    params(("filename" = String, Path, description = "Blob handle")),
    responses(
        (status = 200, description = "Document bytes or HTML page"),
        (status = 404, description = "No such file (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Conversion failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn preview_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let name = parse_handle(&filename)?;

    let response = match preview::render(&*state.blob_store, &name).await? {
        Preview::PassThrough { bytes, media_type } => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, media_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    content_disposition_value(Disposition::Inline, name.as_str()),
                ),
            ],
            bytes,
        )
            .into_response(),
        Preview::Markup(html) => Html(html).into_response(),
    };
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/files/{filename}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download a stored file",
    params(("filename" = String, Path, description = "Blob handle")),
    responses(
        (status = 200, description = "Raw file bytes as an attachment"),
        (status = 404, description = "No such file (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let name = parse_handle(&filename)?;

    let size = state.blob_store.size(&name).await?;
    let reader = state.blob_store.get_stream(&name).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                common::render::media_type(name.as_str()).to_string(),
            ),
            (header::CONTENT_LENGTH, size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition_value(Disposition::Attachment, name.as_str()),
            ),
        ],
        body,
    )
        .into_response())
}
