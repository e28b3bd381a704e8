//! Byte storage for world documents.
//!
//! Handlers only see the [`BlobStore`] trait; [`LocalBlobStore`] keeps blobs
//! under a directory on disk. Keys are the relative paths produced by
//! `chronicis_core::documents::blob_path`.

mod local;

use async_trait::async_trait;

pub use local::LocalBlobStore;

/// Failure reported by a blob backend.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage backend for document bytes.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Write (or overwrite) the blob at `key`.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError>;

    /// Read the whole blob.
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    /// Size in bytes, or `None` when nothing is stored at `key`.
    async fn size(&self, key: &str) -> Result<Option<u64>, BlobError>;

    /// Remove the blob. Deleting a missing blob is not an error.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

impl From<BlobError> for crate::error::AppError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(key) => chronicis_core::error::CoreError::NotFoundByKey {
                entity: "Document file",
                key,
            }
            .into(),
            other => crate::error::AppError::InternalError(other.to_string()),
        }
    }
}
