//! Storage for uploaded resumes and rendered artifacts.
//!
//! Rendered PDF/DOCX files go through `ArtifactStore` so the same pipeline can
//! write to the local disk or to an S3-compatible bucket. Uploads are always
//! staged on local disk because the text extractors read from a path.

use async_trait::async_trait;
use thiserror::Error;

pub mod local;
pub mod s3;
pub mod uploads;

pub use local::LocalArtifactStore;
pub use s3::S3ArtifactStore;
pub use uploads::UploadStaging;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("S3 error: {0}")]
    S3(String),
}

/// Keyed blob storage for generated documents.
///
/// `put` returns the location that should be persisted on the session; the
/// same location is later handed back to `get` and `delete`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, name: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, StorageError>;

    /// `Ok(None)` when nothing exists at `location`.
    async fn get(&self, location: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Deleting a missing artifact is not an error.
    async fn delete(&self, location: &str) -> Result<(), StorageError>;
}
