use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StorageError;

const MAX_NAME_LEN: usize = 255;

/// Name of a stored blob within the store's flat namespace.
///
/// Generated names are `<uuid-v7 hex><.ext>`: the UUIDv7 carries the upload
/// timestamp in its high bits and random bits below, so two uploads landing in
/// the same millisecond still get distinct names. The extension is copied from
/// the original upload so format classification keeps working on the handle.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlobName(String);

impl BlobName {
    /// Generate a fresh name for an upload with the given original file name.
    pub fn generate(original_name: &str) -> Self {
        let id = Uuid::now_v7().simple().to_string();
        match extension_of(original_name) {
            Some(ext) => Self(format!("{id}.{ext}")),
            None => Self(id),
        }
    }

    /// Parse and validate a name received from outside (URL path, stored row).
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if s.is_empty() {
            return Err(StorageError::InvalidName("name cannot be empty".into()));
        }
        if s.len() > MAX_NAME_LEN {
            return Err(StorageError::InvalidName(format!(
                "name exceeds {MAX_NAME_LEN} bytes"
            )));
        }
        // Control characters include NUL; reject them before they reach a path
        // or a response header.
        if s.chars().any(|c| c.is_control()) {
            return Err(StorageError::InvalidName(
                "control characters are not allowed".into(),
            ));
        }
        if s.contains('/') || s.contains('\\') {
            return Err(StorageError::InvalidName(
                "path separators are not allowed".into(),
            ));
        }
        if s.starts_with('.') {
            return Err(StorageError::InvalidName(
                "names starting with '.' are not allowed".into(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.0).map(|e| e.to_ascii_lowercase())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Extension of `name` as uploaded, restricted to something safe to embed in
/// a generated file name.
fn extension_of(name: &str) -> Option<&str> {
    let file_name = Path::new(name).file_name()?.to_str()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 16 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

impl fmt::Debug for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobName({})", self.0)
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for BlobName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BlobName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
