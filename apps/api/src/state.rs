use std::sync::Arc;

use crate::db::SessionStore;
use crate::optimization::JobQueue;
use crate::storage::{ArtifactStore, UploadStaging};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Session records. Postgres in production, in-memory in tests.
    pub store: Arc<dyn SessionStore>,
    /// Rendered PDF/DOCX files. Local disk or S3, chosen by `ARTIFACT_BACKEND`.
    pub artifacts: Arc<dyn ArtifactStore>,
    pub staging: UploadStaging,
    pub queue: JobQueue,
}
