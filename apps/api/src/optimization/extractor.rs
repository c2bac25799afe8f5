//! Plain-text extraction from uploaded resumes.
//!
//! Parsing is CPU-bound and the PDF library may panic on hostile input, so it
//! runs inside `tokio::task::spawn_blocking`; a panic surfaces as an error.

use std::path::Path;

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;

/// Upload formats accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    /// Legacy `.doc`. Accepted at upload and handed to the DOCX parser,
    /// which rejects real binary Word files.
    Doc,
}

impl FileKind {
    /// Classifies by the extension after the last dot, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            "doc" => Some(FileKind::Doc),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Error parsing PDF: {0}")]
    Pdf(String),

    #[error("Error parsing DOCX: {0}")]
    Docx(String),

    #[error("Error reading upload {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Text extraction aborted: {0}")]
    Aborted(String),
}

/// Reads the staged upload and returns its plain text, trimmed.
pub async fn extract_text(path: &Path, kind: FileKind) -> Result<String, ExtractionError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ExtractionError::Io {
            path: path.display().to_string(),
            source,
        })?;

    tokio::task::spawn_blocking(move || extract_from_bytes(&bytes, kind))
        .await
        .map_err(|e| ExtractionError::Aborted(e.to_string()))?
}

pub fn extract_from_bytes(bytes: &[u8], kind: FileKind) -> Result<String, ExtractionError> {
    match kind {
        FileKind::Pdf => extract_pdf(bytes),
        FileKind::Docx | FileKind::Doc => extract_docx(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map(|text| text.trim().to_string())
        .map_err(|e| ExtractionError::Pdf(e.to_string()))
}

/// One line per body paragraph. Tables, headers and footers are skipped.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for p_child in &paragraph.children {
                if let ParagraphChild::Run(run) = p_child {
                    for r_child in &run.children {
                        match r_child {
                            RunChild::Text(t) => text.push_str(&t.text),
                            RunChild::Tab(_) => text.push('\t'),
                            _ => {}
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text.trim().to_string())
}
