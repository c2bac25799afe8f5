//! Document rendering for optimized resumes.
//!
//! `build_blocks` fixes the content and order once; `pdf` and `docx` only
//! decide how each block looks. Rendering is CPU-bound; async callers go
//! through `tokio::task::spawn_blocking`.

pub mod blocks;
pub mod docx;
pub mod metrics;
pub mod pdf;

use thiserror::Error;

use crate::models::resume::OptimizedResume;
use crate::models::session::DocumentFormat;

pub use blocks::{build_blocks, Block};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Error generating PDF: {0}")]
    Pdf(String),

    #[error("Error generating DOCX: {0}")]
    Docx(String),
}

pub fn render_pdf(resume: &OptimizedResume) -> Result<Vec<u8>, RenderError> {
    let blocks = build_blocks(resume);
    let title = match blocks.first() {
        Some(Block::Title(name)) => name.clone(),
        _ => blocks::NAME_PLACEHOLDER.to_string(),
    };
    pdf::write_pdf(&title, &blocks)
}

pub fn render_docx(resume: &OptimizedResume) -> Result<Vec<u8>, RenderError> {
    docx::write_docx(&build_blocks(resume))
}

pub fn render(resume: &OptimizedResume, format: DocumentFormat) -> Result<Vec<u8>, RenderError> {
    match format {
        DocumentFormat::Pdf => render_pdf(resume),
        DocumentFormat::Docx => render_docx(resume),
    }
}
