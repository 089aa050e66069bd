use std::fmt;

/// Failure of a blob store call. The HTTP layer maps `NotFound` and
/// `InvalidName` to 404 and `SizeLimitExceeded` to 413.
#[derive(Debug)]
pub enum StorageError {
    /// Nothing is stored under this handle.
    NotFound(String),
    Io(std::io::Error),
    /// A handle from a URL that is not a flat file name (separators, `..`, hidden).
    InvalidName(String),
    /// Upload cut off once it passed `max_blob_size`.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "no stored file named {name}"),
            Self::Io(err) => write!(f, "blob store I/O failed: {err}"),
            Self::InvalidName(msg) => write!(f, "not a valid file handle: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "upload of {actual} bytes exceeds the {limit} byte limit")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
