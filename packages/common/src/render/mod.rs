//! Format classification and document conversion.

mod error;
mod html;
mod text;

pub mod docx;
pub mod format;

pub use error::RenderError;
pub use format::{RenderStrategy, classify, media_type};
pub use html::envelope;

/// Convert a `.docx` package to an HTML fragment.
pub fn docx_to_html(bytes: &[u8]) -> Result<String, RenderError> {
    Ok(html::render(&docx::parse(bytes)?))
}

/// Extract the readable text of an uploaded file.
///
/// Convertible documents are parsed; anything else is decoded as UTF-8,
/// replacing invalid sequences.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, RenderError> {
    match classify(filename) {
        RenderStrategy::DocumentToMarkup => Ok(text::render(&docx::parse(bytes)?)),
        RenderStrategy::PassThrough => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}
