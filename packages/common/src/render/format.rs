use std::path::Path;

use mime_guess::Mime;

/// How a stored file is presented when previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Serve the stored bytes unchanged.
    PassThrough,
    /// Convert the document to HTML markup.
    DocumentToMarkup,
}

/// Extensions (lowercase, no dot) that are converted rather than passed through.
const CONVERTIBLE: &[(&str, RenderStrategy)] = &[("docx", RenderStrategy::DocumentToMarkup)];

/// Lowercased extension of a file name, without the dot.
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Pick the rendering strategy for a file purely from its extension.
pub fn classify(filename: &str) -> RenderStrategy {
    let Some(ext) = extension(filename) else {
        return RenderStrategy::PassThrough;
    };
    CONVERTIBLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, strategy)| *strategy)
        .unwrap_or(RenderStrategy::PassThrough)
}

/// Content type to send for pass-through responses.
pub fn media_type(filename: &str) -> Mime {
    mime_guess::from_path(filename).first_or_octet_stream()
}
