use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Not a valid document archive: {0}")]
    InvalidArchive(String),

    #[error("Document part missing: {0}")]
    MissingPart(&'static str),

    #[error("Document part '{part}' exceeds {limit} bytes")]
    PartTooLarge { part: &'static str, limit: u64 },

    #[error("Malformed document XML: {0}")]
    Xml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for RenderError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for RenderError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for RenderError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::InvalidArchive(err.to_string())
    }
}
