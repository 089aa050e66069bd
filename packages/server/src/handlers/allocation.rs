use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use common::render;
use common::storage::{BlobName, BlobStore};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::caller::CallerIdentity;
use crate::extractors::json::AppJson;
use crate::models::allocation::{AllocateRequest, AllocationView, parse_meeting_time};
use crate::models::shared::MessageResponse;
use crate::services::ledger::{AttachmentUpdate, LedgerService};
use crate::state::AppState;
use crate::utils::upload::{read_text_field, stream_field_to_store};

#[utoipa::path(
    post,
    path = "/allocate-literature",
    tag = "Allocations",
    operation_id = "allocateLiterature",
    summary = "Assign a literature item to a user for a meeting",
    description = "Unknown user or literature ids fail with a generic server error.",
    request_body = AllocateRequest,
    responses(
        (status = 200, description = "Allocation created", body = MessageResponse),
        (status = 400, description = "Bad meetingTime or body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Allocation failed (SERVER_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(
    skip(state, payload),
    fields(user_id = payload.user_id, literature_id = payload.literature_id)
)]
pub async fn allocate_literature(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AllocateRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let meeting_time = parse_meeting_time(&payload.meeting_time)?;

    let created = LedgerService::new(&state.db)
        .allocate(payload.user_id, payload.literature_id, meeting_time)
        .await?;
    tracing::debug!(allocation_id = created.id, "Allocated literature");

    Ok(Json(MessageResponse::ok("Literature allocated successfully")))
}

#[utoipa::path(
    get,
    path = "/allocations",
    tag = "Allocations",
    operation_id = "listAllocations",
    summary = "List allocations with user and literature details",
    responses(
        (status = 200, description = "Allocations ordered by id", body = Vec<AllocationView>),
        (status = 500, description = "Database error (DATABASE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_allocations(
    State(state): State<AppState>,
) -> Result<Json<Vec<AllocationView>>, AppError> {
    Ok(Json(LedgerService::new(&state.db).list_joined().await?))
}

#[utoipa::path(
    get,
    path = "/get-allocations",
    tag = "Allocations",
    operation_id = "getAllocations",
    summary = "List allocations (alias of /allocations)",
    responses(
        (status = 200, description = "Allocations ordered by id", body = Vec<AllocationView>),
        (status = 500, description = "Database error (DATABASE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_allocations(
    State(state): State<AppState>,
) -> Result<Json<Vec<AllocationView>>, AppError> {
    Ok(Json(LedgerService::new(&state.db).list_joined().await?))
}

#[utoipa::path(
    put,
    path = "/allocations/{id}",
    tag = "Allocations",
    operation_id = "updateAllocation",
    summary = "Attach notes and slides to your allocation",
    description = "Multipart form with optional `notes` and `slidesFile` parts. A `notes` part \
        sent as a file is converted to text and the file itself is discarded; a plain text \
        `notes` part is stored as-is. Only the user named in `X-User-Id` who owns the \
        allocation may update it. Omitted parts keep their current value.",
    params(
        ("id" = i32, Path, description = "Allocation ID"),
        ("X-User-Id" = i32, Header, description = "Id of the calling user"),
    ),
    request_body(content_type = "multipart/form-data", description = "Notes and slides"),
    responses(
        (status = 200, description = "Allocation updated", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not found or not yours (PERMISSION_DENIED)", body = ErrorBody),
        (status = 413, description = "Upload too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, caller, multipart), fields(id, caller_id = caller.user_id))]
pub async fn update_allocation(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let ledger = LedgerService::new(&state.db);

    // Nothing may reach the blob store on behalf of a non-owner.
    if ledger.find_owned(id, caller.user_id).await?.is_none() {
        return Err(AppError::PermissionDenied);
    }

    let mut multipart =
        multipart.map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
    let max_size = state.config.storage.max_blob_size;
    let mut update = AttachmentUpdate::default();
    let mut read_any = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // A form with zero parts does not parse; it is an empty update.
            Err(e) if !read_any => {
                tracing::debug!("Treating unreadable multipart body as empty: {e}");
                break;
            }
            Err(e) => return Err(AppError::Validation(format!("Multipart error: {e}"))),
        };
        read_any = true;

        match field.name() {
            Some("notes") => {
                let notes = match field.file_name().map(str::to_string) {
                    Some(original_name) => {
                        let transient = stream_field_to_store(
                            field,
                            &original_name,
                            &*state.blob_store,
                            max_size,
                        )
                        .await?;
                        take_text(&*state.blob_store, transient).await?
                    }
                    None => read_text_field(field).await?,
                };
                update.notes = Some(notes);
            }
            Some("slidesFile") => {
                let original_name = field.file_name().map(str::to_string).ok_or_else(|| {
                    AppError::Validation("Slides field must have a filename".into())
                })?;
                update.slides = Some(
                    stream_field_to_store(field, &original_name, &*state.blob_store, max_size)
                        .await?,
                );
            }
            _ => {} // Ignore unknown fields.
        }
    }

    ledger.update_attachments(id, caller.user_id, update).await?;

    Ok(Json(MessageResponse::ok("Allocation updated successfully")))
}

/// Extract the text of a transient blob, then remove the blob whatever the outcome.
async fn take_text(store: &dyn BlobStore, name: BlobName) -> Result<String, AppError> {
    let extracted = extract_stored_text(store, &name).await;

    if let Err(e) = store.delete(&name).await {
        tracing::warn!(blob = %name, "Failed to remove transient notes file: {e}");
    }

    extracted
}

async fn extract_stored_text(store: &dyn BlobStore, name: &BlobName) -> Result<String, AppError> {
    let bytes = store.get(name).await?;
    let filename = name.as_str().to_string();

    tokio::task::spawn_blocking(move || render::extract_text(&filename, &bytes))
        .await
        .map_err(|e| AppError::Internal(format!("Text extraction task failed: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read notes document: {e}")))
}
