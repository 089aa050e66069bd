use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::name::BlobName;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Flat, name-addressed blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a freshly generated name derived from `original_name`.
    async fn put(&self, original_name: &str, data: &[u8]) -> Result<BlobName, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(original_name, reader).await
    }

    /// Store data from an async reader under a freshly generated name.
    async fn put_stream(
        &self,
        original_name: &str,
        reader: BoxReader,
    ) -> Result<BlobName, StorageError>;

    /// Retrieve all bytes of a blob.
    async fn get(&self, name: &BlobName) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(name).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve a blob as a streaming async reader.
    async fn get_stream(&self, name: &BlobName) -> Result<BoxReader, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, name: &BlobName) -> Result<bool, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, name: &BlobName) -> Result<bool, StorageError>;

    /// Get the size of a blob in bytes.
    async fn size(&self, name: &BlobName) -> Result<u64, StorageError>;
}
