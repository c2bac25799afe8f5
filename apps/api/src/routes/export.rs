use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::editor::EditorResume;
use crate::models::resume::OptimizedResume;
use crate::render::render_pdf;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub resume_data: EditorResume,
    pub template_id: String,
}

/// POST /api/export/pdf
///
/// Renders a resume from the editor straight to PDF. Nothing is stored.
pub async fn handle_export_pdf(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    let template_id = request.template_id;
    let resume = OptimizedResume::from(request.resume_data);

    let bytes = tokio::task::spawn_blocking(move || render_pdf(&resume))
        .await
        .map_err(|e| AppError::Render(format!("PDF export failed: {e}")))?
        .map_err(|e| AppError::Render(format!("PDF export failed: {e}")))?;

    info!(template_id = %template_id, size = bytes.len(), "PDF exported");

    let disposition = format!(
        "attachment; filename=\"resume_{}.pdf\"",
        filename_safe(&template_id)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Keeps ASCII letters, digits, `-` and `_`.
fn filename_safe(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned
    }
}
