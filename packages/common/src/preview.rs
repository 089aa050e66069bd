use thiserror::Error;

use crate::render::{self, RenderError, RenderStrategy};
use crate::storage::{BlobName, BlobStore, StorageError};

/// A stored file prepared for display.
#[derive(Debug)]
pub enum Preview {
    /// Stored bytes, served as-is.
    PassThrough {
        bytes: Vec<u8>,
        media_type: mime_guess::Mime,
    },
    /// Complete HTML page produced by document conversion.
    Markup(String),
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Error converting file to HTML: {0}")]
    Conversion(#[from] RenderError),

    #[error("Conversion task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Load a blob and render it according to its format.
///
/// The blob is fetched before any conversion is attempted, so a missing blob
/// always surfaces as `StorageError::NotFound`. Converted output is not cached.
pub async fn render(store: &dyn BlobStore, name: &BlobName) -> Result<Preview, PreviewError> {
    let bytes = store.get(name).await?;

    match render::classify(name.as_str()) {
        RenderStrategy::PassThrough => Ok(Preview::PassThrough {
            bytes,
            media_type: render::media_type(name.as_str()),
        }),
        RenderStrategy::DocumentToMarkup => {
            let fragment =
                tokio::task::spawn_blocking(move || render::docx_to_html(&bytes)).await??;
            Ok(Preview::Markup(render::envelope(&fragment)))
        }
    }
}
