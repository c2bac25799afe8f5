//! DOCX writer. Mirrors the PDF block order with Word's default styles.

use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, Paragraph, Run};

use crate::render::blocks::Block;
use crate::render::RenderError;

/// Half-points, so 36 is 18 pt.
const TITLE_SIZE_HALF_PT: usize = 36;

pub fn write_docx(blocks: &[Block]) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new();

    for block in blocks {
        let paragraph = match block {
            Block::Title(text) => Paragraph::new()
                .add_run(Run::new().add_text(text).bold().size(TITLE_SIZE_HALF_PT))
                .align(AlignmentType::Center),
            Block::Contact(text) => Paragraph::new()
                .add_run(Run::new().add_text(text))
                .align(AlignmentType::Center),
            Block::Heading(text) => Paragraph::new().add_run(Run::new().add_text(text).bold()),
            Block::Paragraph(spans) => spans.iter().fold(Paragraph::new(), |p, span| {
                let run = Run::new().add_text(&span.text);
                p.add_run(if span.bold { run.bold() } else { run })
            }),
            Block::Spacer(_) => Paragraph::new(),
        };
        docx = docx.add_paragraph(paragraph);
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| RenderError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::extractor::{extract_from_bytes, FileKind};
    use crate::render::blocks::Span;

    fn sample() -> Vec<Block> {
        vec![
            Block::Title("Jane Smith".to_string()),
            Block::Contact("jane@example.com | Austin, TX".to_string()),
            Block::Spacer(12.0),
            Block::Heading("SKILLS".to_string()),
            Block::Paragraph(vec![Span::bold("Technical:"), Span::regular(" Rust, Go")]),
        ]
    }

    #[test]
    fn test_docx_is_a_zip_archive() {
        let bytes = write_docx(&sample()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_docx_text_reads_back() {
        let bytes = write_docx(&sample()).unwrap();
        let text = extract_from_bytes(&bytes, FileKind::Docx).unwrap();
        assert!(text.starts_with("Jane Smith"));
        assert!(text.contains("jane@example.com | Austin, TX"));
        assert!(text.contains("SKILLS"));
        assert!(text.contains("Technical:"));
        assert!(text.contains("Rust, Go"));
    }

    #[test]
    fn test_same_blocks_give_same_text() {
        let first = extract_from_bytes(&write_docx(&sample()).unwrap(), FileKind::Docx).unwrap();
        let second = extract_from_bytes(&write_docx(&sample()).unwrap(), FileKind::Docx).unwrap();
        assert_eq!(first, second);
    }
}
