use axum::extract::multipart::Field;
use common::storage::{BlobName, BlobStore, BoxReader};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AppError;

/// Read a text part of a multipart request.
pub async fn read_text_field(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

/// Spool a file part to disk, enforcing `max_size`, then hand it to the blob store.
///
/// The part is fully received before the store assigns a name, so a client
/// that aborts mid-upload leaves nothing behind.
pub async fn stream_field_to_store(
    mut field: Field<'_>,
    original_name: &str,
    blob_store: &dyn BlobStore,
    max_size: u64,
) -> Result<BlobName, AppError> {
    let temp_path = std::env::temp_dir().join(format!("litreview-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Storage(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Storage(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        Ok(blob_store.put_stream(original_name, reader).await?)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
