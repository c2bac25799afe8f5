use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::models::resume::OptimizedResume;

/// Lifecycle of a single upload.
///
/// ```text
/// uploaded -> analyzing -> optimized -> completed
///     \___________\____________\______-> failed
/// ```
/// `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Uploaded,
    Analyzing,
    Optimized,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Uploaded => "uploaded",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Optimized => "optimized",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    /// Statuses a record must currently be in for a move to `self` to be legal.
    pub fn predecessors(&self) -> &'static [SessionStatus] {
        match self {
            SessionStatus::Uploaded => &[],
            SessionStatus::Analyzing => &[SessionStatus::Uploaded],
            SessionStatus::Optimized => &[SessionStatus::Analyzing],
            SessionStatus::Completed => &[SessionStatus::Optimized],
            SessionStatus::Failed => &[
                SessionStatus::Uploaded,
                SessionStatus::Analyzing,
                SessionStatus::Optimized,
            ],
        }
    }

    /// Postgres enforces the same rule in SQL through `predecessors`.
    #[cfg(test)]
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        next.predecessors().contains(self)
    }

    /// Coarse progress shown to polling clients.
    pub fn progress(&self) -> u8 {
        match self {
            SessionStatus::Uploaded => 10,
            SessionStatus::Analyzing => 30,
            SessionStatus::Optimized => 80,
            SessionStatus::Completed => 100,
            SessionStatus::Failed => 0,
        }
    }

    pub fn results_ready(&self) -> bool {
        matches!(self, SessionStatus::Optimized | SessionStatus::Completed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(SessionStatus::Uploaded),
            "analyzing" => Ok(SessionStatus::Analyzing),
            "optimized" => Ok(SessionStatus::Optimized),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(format!("unknown session status '{other}'")),
        }
    }
}

/// Output formats a completed session can be downloaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Pdf, DocumentFormat::Docx];

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Artifact name for a session, e.g. `optimized_resume_<id>.pdf`.
    pub fn file_name(&self, session_id: Uuid) -> String {
        format!("optimized_resume_{session_id}.{}", self.extension())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err("Invalid format. Use 'pdf' or 'docx'".to_string()),
        }
    }
}

/// Whether a structured object came from the model or from fixed fallback content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Model,
    Fallback,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSource::Model => "model",
            ContentSource::Fallback => "fallback",
        }
    }
}

impl FromStr for ContentSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(ContentSource::Model),
            "fallback" => Ok(ContentSource::Fallback),
            other => Err(format!("unknown content source '{other}'")),
        }
    }
}

/// Locations of rendered artifacts, keyed by format.
pub type FilePaths = BTreeMap<DocumentFormat, String>;

/// One upload-to-completion unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationSession {
    pub id: Uuid,
    pub original_filename: String,
    pub extracted_text: String,
    pub job_description: String,
    pub analysis: Option<AnalysisResult>,
    pub optimized_content: Option<OptimizedResume>,
    pub analysis_source: Option<ContentSource>,
    pub optimization_source: Option<ContentSource>,
    pub status: SessionStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub file_paths: Option<FilePaths>,
}

impl OptimizationSession {
    /// A fresh record in `uploaded`. Extracted text is filled in by the pipeline.
    pub fn new(id: Uuid, original_filename: String, job_description: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            original_filename,
            extracted_text: String::new(),
            job_description,
            analysis: None,
            optimized_content: None,
            analysis_source: None,
            optimization_source: None,
            status: SessionStatus::Uploaded,
            error_message: None,
            created_at: now,
            updated_at: now,
            file_paths: None,
        }
    }

    pub fn status_message(&self) -> String {
        match self.status {
            SessionStatus::Uploaded => "File uploaded, starting analysis...".to_string(),
            SessionStatus::Analyzing => "Analyzing resume and optimizing content...".to_string(),
            SessionStatus::Optimized => "Content optimized, generating documents...".to_string(),
            SessionStatus::Completed => "Optimization completed successfully!".to_string(),
            SessionStatus::Failed => format!(
                "Optimization failed: {}",
                self.error_message.as_deref().unwrap_or("Unknown error")
            ),
        }
    }
}

/// A single state change applied by the pipeline.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Analyzing,
    Optimized {
        extracted_text: String,
        analysis: AnalysisResult,
        analysis_source: ContentSource,
        optimized_content: OptimizedResume,
        optimization_source: ContentSource,
    },
    Completed {
        file_paths: FilePaths,
    },
    Failed {
        error_message: String,
    },
}

impl SessionUpdate {
    pub fn target_status(&self) -> SessionStatus {
        match self {
            SessionUpdate::Analyzing => SessionStatus::Analyzing,
            SessionUpdate::Optimized { .. } => SessionStatus::Optimized,
            SessionUpdate::Completed { .. } => SessionStatus::Completed,
            SessionUpdate::Failed { .. } => SessionStatus::Failed,
        }
    }

    /// Applies the update to an in-memory copy of the record.
    #[cfg(test)]
    pub fn apply_to(self, session: &mut OptimizationSession) {
        session.status = self.target_status();
        session.updated_at = Utc::now();
        match self {
            SessionUpdate::Analyzing => {}
            SessionUpdate::Optimized {
                extracted_text,
                analysis,
                analysis_source,
                optimized_content,
                optimization_source,
            } => {
                session.extracted_text = extracted_text;
                session.analysis = Some(analysis);
                session.analysis_source = Some(analysis_source);
                session.optimized_content = Some(optimized_content);
                session.optimization_source = Some(optimization_source);
            }
            SessionUpdate::Completed { file_paths } => {
                session.file_paths = Some(file_paths);
            }
            SessionUpdate::Failed { error_message } => {
                session.error_message = Some(error_message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionStatus; 5] = [
        SessionStatus::Uploaded,
        SessionStatus::Analyzing,
        SessionStatus::Optimized,
        SessionStatus::Completed,
        SessionStatus::Failed,
    ];

    #[test]
    fn test_forward_path_is_legal() {
        assert!(SessionStatus::Uploaded.can_transition_to(SessionStatus::Analyzing));
        assert!(SessionStatus::Analyzing.can_transition_to(SessionStatus::Optimized));
        assert!(SessionStatus::Optimized.can_transition_to(SessionStatus::Completed));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!SessionStatus::Uploaded.can_transition_to(SessionStatus::Optimized));
        assert!(!SessionStatus::Uploaded.can_transition_to(SessionStatus::Completed));
        assert!(!SessionStatus::Optimized.can_transition_to(SessionStatus::Analyzing));
        assert!(!SessionStatus::Analyzing.can_transition_to(SessionStatus::Uploaded));
    }

    #[test]
    fn test_failed_reachable_from_every_non_terminal_state() {
        for status in ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(
                status.can_transition_to(SessionStatus::Failed),
                "{status} should be able to fail"
            );
        }
    }

    #[test]
    fn test_terminal_states_never_change() {
        for terminal in [SessionStatus::Completed, SessionStatus::Failed] {
            for next in ALL {
                assert!(
                    !terminal.can_transition_to(next),
                    "{terminal} -> {next} must be rejected"
                );
            }
        }
    }

    #[test]
    fn test_progress_values() {
        assert_eq!(SessionStatus::Uploaded.progress(), 10);
        assert_eq!(SessionStatus::Analyzing.progress(), 30);
        assert_eq!(SessionStatus::Optimized.progress(), 80);
        assert_eq!(SessionStatus::Completed.progress(), 100);
        assert_eq!(SessionStatus::Failed.progress(), 0);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<SessionStatus>(), Ok(status));
        }
        assert!("archived".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn test_document_format_parsing() {
        assert_eq!("pdf".parse::<DocumentFormat>(), Ok(DocumentFormat::Pdf));
        assert_eq!("docx".parse::<DocumentFormat>(), Ok(DocumentFormat::Docx));
        assert!("doc".parse::<DocumentFormat>().is_err());
        assert!("PDF".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn test_file_paths_serialize_with_format_keys() {
        let mut paths = FilePaths::new();
        paths.insert(DocumentFormat::Pdf, "/out/a.pdf".to_string());
        paths.insert(DocumentFormat::Docx, "/out/a.docx".to_string());
        let json = serde_json::to_value(&paths).unwrap();
        assert_eq!(json["pdf"], "/out/a.pdf");
        assert_eq!(json["docx"], "/out/a.docx");
    }

    #[test]
    fn test_failed_status_message_includes_error() {
        let mut session = OptimizationSession::new(
            Uuid::new_v4(),
            "cv.pdf".to_string(),
            "x".repeat(60),
        );
        SessionUpdate::Failed {
            error_message: "Error parsing PDF: bad xref".to_string(),
        }
        .apply_to(&mut session);
        assert_eq!(session.status, SessionStatus::Failed);
        assert_eq!(
            session.status_message(),
            "Optimization failed: Error parsing PDF: bad xref"
        );
    }
}
