//! Axum route handlers for `/api/optimize/*`.
//!
//! Handlers only translate between HTTP and the session store; all
//! processing happens in the pipeline behind the job queue.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::models::resume::OptimizedResume;
use crate::models::session::{
    ContentSource, DocumentFormat, OptimizationSession, SessionStatus, SessionUpdate,
};
use crate::optimization::extractor::FileKind;
use crate::optimization::queue::OptimizationJob;
use crate::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;
const DEFAULT_LIST_LIMIT: i64 = 10;
const MAX_LIST_LIMIT: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub original_filename: String,
    pub extracted_text: String,
    pub status: SessionStatus,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub progress: u8,
    pub message: String,
}

/// True where the stored object is fallback content rather than model output.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Degraded {
    pub analysis: bool,
    pub optimized_content: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub session_id: Uuid,
    pub analysis: Option<AnalysisResult>,
    pub optimized_content: Option<OptimizedResume>,
    pub status: SessionStatus,
    pub degraded: Degraded,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub sessions: Vec<OptimizationSession>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Upload validation
// ────────────────────────────────────────────────────────────────────────────

/// A multipart upload that passed every check.
#[derive(Debug)]
pub struct ValidUpload {
    pub filename: String,
    pub kind: FileKind,
    pub bytes: Bytes,
    pub job_description: String,
}

/// Checks, in order: file present with a name, extension, size, job
/// description length (after trimming).
pub fn validate_upload(
    filename: Option<String>,
    bytes: Option<Bytes>,
    job_description: Option<String>,
) -> Result<ValidUpload, AppError> {
    let (filename, bytes) = match (filename.filter(|f| !f.trim().is_empty()), bytes) {
        (Some(filename), Some(bytes)) => (filename, bytes),
        _ => return Err(AppError::Validation("No file uploaded".to_string())),
    };

    let kind = FileKind::from_filename(&filename).ok_or_else(|| {
        AppError::Validation(
            "Invalid file format. Please upload PDF or DOCX files only.".to_string(),
        )
    })?;

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File size too large. Maximum 10MB allowed.".to_string(),
        ));
    }

    let job_description = job_description.unwrap_or_default();
    if job_description.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(
            "Job description is required and must be at least 50 characters long.".to_string(),
        ));
    }

    Ok(ValidUpload {
        filename,
        kind,
        bytes,
        job_description,
    })
}

/// Unknown or malformed ids are reported the same as missing sessions.
fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| session_not_found())
}

fn session_not_found() -> AppError {
    AppError::NotFound("Session not found".to_string())
}

async fn load_session(state: &AppState, raw_id: &str) -> Result<OptimizationSession, AppError> {
    let id = parse_session_id(raw_id)?;
    state.store.get(id).await?.ok_or_else(session_not_found)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/optimize/upload
///
/// Multipart fields `file` and `job_description`. Stores the upload, creates
/// the session in `uploaded` and queues it; returns before any processing.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut filename = None;
    let mut bytes = None;
    let mut job_description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Invalid file field: {e}")))?,
                );
            }
            Some("job_description") => {
                job_description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Invalid job_description field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let upload = validate_upload(filename, bytes, job_description)?;
    let session_id = Uuid::new_v4();

    let upload_path = state
        .staging
        .stage(session_id, &upload.filename, &upload.bytes)
        .await?;

    let session = OptimizationSession::new(
        session_id,
        upload.filename.clone(),
        upload.job_description.clone(),
    );
    if let Err(e) = state.store.insert(&session).await {
        state.staging.discard(&upload_path).await;
        return Err(e.into());
    }

    let job = OptimizationJob {
        session_id,
        upload_path,
        file_kind: upload.kind,
        job_description: upload.job_description,
    };
    if let Err(e) = state.queue.enqueue(job) {
        error!(%session_id, "Could not queue session: {e}");
        let update = SessionUpdate::Failed {
            error_message: e.to_string(),
        };
        if let Err(store_err) = state.store.apply(session_id, update).await {
            error!(%session_id, "Could not record queue failure: {store_err}");
        }
        return Err(AppError::Internal(anyhow::anyhow!("Upload failed: {e}")));
    }

    info!(
        %session_id,
        filename = %upload.filename,
        size = upload.bytes.len(),
        "Upload accepted"
    );

    Ok(Json(UploadResponse {
        session_id,
        original_filename: upload.filename,
        extracted_text: "Processing...".to_string(),
        status: SessionStatus::Uploaded,
        message: "File uploaded successfully. Processing will begin shortly.".to_string(),
    }))
}

/// GET /api/optimize/status/:session_id
pub async fn handle_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let session = load_session(&state, &session_id).await?;
    Ok(Json(StatusResponse {
        session_id: session.id,
        status: session.status,
        progress: session.status.progress(),
        message: session.status_message(),
    }))
}

/// GET /api/optimize/results/:session_id
///
/// Only once the session is `optimized` or `completed`.
pub async fn handle_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ResultsResponse>, AppError> {
    let session = load_session(&state, &session_id).await?;
    if !session.status.results_ready() {
        return Err(AppError::Validation(format!(
            "Results not ready. Current status: {}",
            session.status
        )));
    }

    Ok(Json(ResultsResponse {
        session_id: session.id,
        degraded: Degraded {
            analysis: session.analysis_source == Some(ContentSource::Fallback),
            optimized_content: session.optimization_source == Some(ContentSource::Fallback),
        },
        analysis: session.analysis,
        optimized_content: session.optimized_content,
        status: session.status,
        message: "Optimization results retrieved successfully".to_string(),
    }))
}

/// GET /api/optimize/download/:session_id?format=pdf|docx
///
/// The format is checked before the session is looked up.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, AppError> {
    let format: DocumentFormat = params
        .format
        .as_deref()
        .unwrap_or("pdf")
        .parse()
        .map_err(AppError::Validation)?;

    let session = load_session(&state, &session_id).await?;
    if session.status != SessionStatus::Completed {
        return Err(AppError::Validation(format!(
            "Download not ready. Current status: {}",
            session.status
        )));
    }

    let artifact_missing =
        || AppError::NotFound(format!("Optimized {} file not found", format.extension().to_uppercase()));

    let location = session
        .file_paths
        .as_ref()
        .and_then(|paths| paths.get(&format))
        .ok_or_else(artifact_missing)?;
    let bytes = state
        .artifacts
        .get(location)
        .await?
        .ok_or_else(artifact_missing)?;

    let disposition = format!("attachment; filename=\"{}\"", format.file_name(session.id));
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /api/optimize/session/:session_id
///
/// Artifact removal is best effort; the record is always deleted.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let session = load_session(&state, &session_id).await?;

    for location in session.file_paths.iter().flat_map(|paths| paths.values()) {
        if let Err(e) = state.artifacts.delete(location).await {
            warn!(session_id = %session.id, "Failed to delete artifact {location}: {e}");
        }
    }

    if !state.store.delete(session.id).await? {
        return Err(session_not_found());
    }
    info!(session_id = %session.id, "Session deleted");

    Ok(Json(MessageResponse {
        message: "Session deleted successfully".to_string(),
    }))
}

/// GET /api/optimize/sessions?limit=10&skip=0
///
/// Newest first. `limit` is capped at 100.
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(0, MAX_LIST_LIMIT);
    let skip = params.skip.unwrap_or(0).max(0);

    let sessions = state.store.list(limit, skip).await?;
    Ok(Json(ListResponse {
        count: sessions.len(),
        sessions,
    }))
}
