use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::storage::{ArtifactStore, StorageError};

/// Artifacts as plain files under one directory. Locations are file paths.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn io_error(location: impl Into<String>) -> impl FnOnce(std::io::Error) -> StorageError {
    let location = location.into();
    move |source| StorageError::Io { location, source }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn put(
        &self,
        name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(io_error(self.root.display().to_string()))?;

        let path = self.root.join(name);
        let location = path.display().to_string();
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(io_error(location.clone()))?;

        debug!("Wrote {} bytes to {location}", bytes.len());
        Ok(location)
    }

    async fn get(&self, location: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(location).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(location)(e)),
        }
    }

    async fn delete(&self, location: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(location).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(location)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path().join("out"));

        let location = store
            .put("optimized_resume_x.pdf", b"%PDF-1.3".to_vec(), "application/pdf")
            .await
            .unwrap();
        assert!(location.ends_with("optimized_resume_x.pdf"));
        assert_eq!(store.get(&location).await.unwrap().unwrap(), b"%PDF-1.3");

        store.delete(&location).await.unwrap();
        assert!(store.get(&location).await.unwrap().is_none());
        // second delete is a no-op
        store.delete(&location).await.unwrap();
    }

    #[tokio::test]
    async fn test_unwritable_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let store = LocalArtifactStore::new(&blocker);
        let err = store
            .put("a.pdf", vec![1, 2, 3], "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
