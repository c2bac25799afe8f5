//! Per-session orchestration.
//!
//! Flow: analyzing → extract text → analyze → optimize → optimized →
//!       render PDF + DOCX → store artifacts → completed.
//!
//! Any stage error moves the session to `failed` with the error's message.
//! Nothing is returned to a caller; the record is the only output.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::db::{SessionStore, StoreError};
use crate::llm_client::ChatModel;
use crate::models::resume::OptimizedResume;
use crate::models::session::{DocumentFormat, FilePaths, SessionUpdate};
use crate::optimization::analyzer::{analyze, AnalysisError};
use crate::optimization::extractor::{extract_text, ExtractionError};
use crate::optimization::optimizer::{optimize, OptimizationError};
use crate::optimization::outcome::prefix_chars;
use crate::optimization::queue::OptimizationJob;
use crate::render::{render, RenderError};
use crate::storage::{ArtifactStore, StorageError, UploadStaging};

/// Characters of extracted text kept on the session record.
const PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Resume processing failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Resume processing failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Resume processing failed: {0}")]
    Optimization(#[from] OptimizationError),

    #[error("Document generation failed: {0}")]
    Render(#[from] RenderError),

    #[error("Document generation failed: {0}")]
    Artifact(#[from] StorageError),

    #[error("Document generation failed: render task aborted: {0}")]
    RenderAborted(String),

    #[error("{0}")]
    Store(#[from] StoreError),
}

pub struct Pipeline {
    store: Arc<dyn SessionStore>,
    llm: Arc<dyn ChatModel>,
    artifacts: Arc<dyn ArtifactStore>,
    staging: UploadStaging,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn SessionStore>,
        llm: Arc<dyn ChatModel>,
        artifacts: Arc<dyn ArtifactStore>,
        staging: UploadStaging,
    ) -> Self {
        Self {
            store,
            llm,
            artifacts,
            staging,
        }
    }

    /// Drives one session to `completed` or `failed`. Logs from the stages
    /// run inside a span carrying the session id.
    pub async fn run(&self, job: OptimizationJob) {
        let session_id = job.session_id;
        let span = info_span!("optimization", %session_id);
        self.run_inner(job).instrument(span).await
    }

    async fn run_inner(&self, job: OptimizationJob) {
        let session_id = job.session_id;
        info!(%session_id, "Optimization started");

        match self.process(&job).await {
            Ok(()) => {
                self.staging.discard(&job.upload_path).await;
                info!(%session_id, "Optimization completed");
            }
            Err(e) => {
                error!(%session_id, "Optimization failed: {e}");
                let update = SessionUpdate::Failed {
                    error_message: e.to_string(),
                };
                if let Err(store_err) = self.store.apply(session_id, update).await {
                    error!(%session_id, "Could not record failure: {store_err}");
                }
            }
        }
    }

    async fn process(&self, job: &OptimizationJob) -> Result<(), PipelineError> {
        let session_id = job.session_id;
        self.store.apply(session_id, SessionUpdate::Analyzing).await?;

        let resume_text = extract_text(&job.upload_path, job.file_kind).await?;
        info!(%session_id, chars = resume_text.chars().count(), "Resume text extracted");

        let analysis = analyze(self.llm.as_ref(), &resume_text, &job.job_description).await?;

        let optimized = optimize(
            self.llm.as_ref(),
            &resume_text,
            &job.job_description,
            analysis.value(),
        )
        .await?;

        info!(
            %session_id,
            degraded = analysis.is_degraded() || optimized.is_degraded(),
            "Model stages finished"
        );
        for (stage, reason) in [
            ("analysis", analysis.fallback_reason()),
            ("optimization", optimized.fallback_reason()),
        ] {
            if let Some(reason) = reason {
                warn!(%session_id, stage, reason, "Model reply unusable, fallback content used");
            }
        }

        let (analysis, analysis_source) = analysis.into_parts();
        let (optimized_content, optimization_source) = optimized.into_parts();

        self.store
            .apply(
                session_id,
                SessionUpdate::Optimized {
                    extracted_text: preview_text(&resume_text),
                    analysis,
                    analysis_source,
                    optimized_content: optimized_content.clone(),
                    optimization_source,
                },
            )
            .await?;

        let file_paths = self.write_artifacts(session_id, optimized_content).await?;
        let completed = SessionUpdate::Completed {
            file_paths: file_paths.clone(),
        };
        if let Err(e) = self.store.apply(session_id, completed).await {
            // Nothing references the files once the record is gone or stuck.
            self.discard_artifacts(session_id, file_paths.values()).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn discard_artifacts<'a>(
        &self,
        session_id: Uuid,
        locations: impl IntoIterator<Item = &'a String>,
    ) {
        for location in locations {
            if let Err(e) = self.artifacts.delete(location).await {
                warn!(%session_id, "Could not remove orphaned artifact {location}: {e}");
            }
        }
    }

    async fn write_artifacts(
        &self,
        session_id: Uuid,
        resume: OptimizedResume,
    ) -> Result<FilePaths, PipelineError> {
        let rendered = tokio::task::spawn_blocking(move || {
            DocumentFormat::ALL
                .iter()
                .map(|format| render(&resume, *format).map(|bytes| (*format, bytes)))
                .collect::<Result<Vec<_>, RenderError>>()
        })
        .await
        .map_err(|e| PipelineError::RenderAborted(e.to_string()))??;

        let mut file_paths = FilePaths::new();
        for (format, bytes) in rendered {
            let size = bytes.len();
            let location = match self
                .artifacts
                .put(&format.file_name(session_id), bytes, format.content_type())
                .await
            {
                Ok(location) => location,
                Err(e) => {
                    self.discard_artifacts(session_id, file_paths.values()).await;
                    return Err(e.into());
                }
            };
            info!(%session_id, format = format.extension(), size, "Artifact stored");
            file_paths.insert(format, location);
        }
        Ok(file_paths)
    }
}

/// First 1000 characters, with `...` appended when the text was longer.
pub fn preview_text(text: &str) -> String {
    let prefix = prefix_chars(text, PREVIEW_CHARS);
    if prefix.len() < text.len() {
        format!("{prefix}...")
    } else {
        prefix.to_string()
    }
}
