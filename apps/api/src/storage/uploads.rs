use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::storage::StorageError;

/// Local staging area for uploaded resumes awaiting processing.
#[derive(Debug, Clone)]
pub struct UploadStaging {
    dir: PathBuf,
}

impl UploadStaging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes the upload as `<session_id>_<basename>` and returns its path.
    /// Only the final path component of the client filename is used.
    pub async fn stage(
        &self,
        session_id: Uuid,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::Io {
                location: self.dir.display().to_string(),
                source,
            })?;

        let path = self
            .dir
            .join(format!("{session_id}_{}", safe_basename(original_filename)));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Io {
                location: path.display().to_string(),
                source,
            })?;
        Ok(path)
    }

    /// Best-effort removal once a session no longer needs its upload.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove staged upload {}: {e}", path.display());
            }
        }
    }
}

fn safe_basename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base.to_string()
    }
}
