//! Format-neutral document model shared by the PDF and DOCX writers.

use crate::models::resume::{non_blank, OptimizedResume};

pub const NAME_PLACEHOLDER: &str = "Name";

/// A run of text with uniform weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Candidate name, centered.
    Title(String),
    /// `email | phone | location`, centered.
    Contact(String),
    /// Section heading such as `EXPERIENCE`.
    Heading(String),
    Paragraph(Vec<Span>),
    /// Vertical gap in points. DOCX writes an empty paragraph instead.
    Spacer(f32),
}

impl Block {
    fn text(text: impl Into<String>) -> Self {
        Block::Paragraph(vec![Span::regular(text)])
    }
}

const SECTION_GAP: f32 = 12.0;
const ENTRY_GAP: f32 = 6.0;

/// Lays out a resume in reading order. Empty sections are omitted; the
/// title is always present. Certifications are not rendered.
pub fn build_blocks(resume: &OptimizedResume) -> Vec<Block> {
    let mut blocks = Vec::new();
    let personal = &resume.personal_info;

    blocks.push(Block::Title(
        non_blank(&personal.name)
            .unwrap_or(NAME_PLACEHOLDER)
            .to_string(),
    ));

    let contact: Vec<&str> = [&personal.email, &personal.phone, &personal.location]
        .into_iter()
        .filter_map(non_blank)
        .collect();
    if !contact.is_empty() {
        blocks.push(Block::Contact(contact.join(" | ")));
    }
    blocks.push(Block::Spacer(SECTION_GAP));

    if let Some(summary) = non_blank(&resume.summary) {
        blocks.push(Block::Heading("PROFESSIONAL SUMMARY".to_string()));
        blocks.push(Block::text(summary));
        blocks.push(Block::Spacer(SECTION_GAP));
    }

    if !resume.experience.is_empty() {
        blocks.push(Block::Heading("EXPERIENCE".to_string()));
        for exp in &resume.experience {
            blocks.push(Block::Paragraph(vec![
                Span::bold(non_blank(&exp.position).unwrap_or_default()),
                Span::regular(format!(" - {}", non_blank(&exp.company).unwrap_or_default())),
            ]));

            let mut date_loc = Vec::new();
            if let (Some(start), Some(end)) = (non_blank(&exp.start_date), non_blank(&exp.end_date)) {
                date_loc.push(format!("{start} - {end}"));
            }
            if let Some(location) = non_blank(&exp.location) {
                date_loc.push(location.to_string());
            }
            if !date_loc.is_empty() {
                blocks.push(Block::text(date_loc.join(" | ")));
            }

            for achievement in &exp.achievements {
                let achievement = achievement.trim();
                if !achievement.is_empty() {
                    blocks.push(Block::text(achievement));
                }
            }
            blocks.push(Block::Spacer(ENTRY_GAP));
        }
    }

    if !resume.education.is_empty() {
        blocks.push(Block::Heading("EDUCATION".to_string()));
        for edu in &resume.education {
            blocks.push(Block::Paragraph(vec![
                Span::bold(non_blank(&edu.degree).unwrap_or_default()),
                Span::regular(format!(" - {}", non_blank(&edu.institution).unwrap_or_default())),
            ]));
            if let Some(graduation) = non_blank(&edu.graduation) {
                blocks.push(Block::text(format!("Graduated: {graduation}")));
            }
            blocks.push(Block::Spacer(ENTRY_GAP));
        }
    }

    let skills = &resume.skills;
    if !skills.technical.is_empty() || !skills.soft.is_empty() {
        blocks.push(Block::Heading("SKILLS".to_string()));
        if !skills.technical.is_empty() {
            blocks.push(Block::Paragraph(vec![
                Span::bold("Technical:"),
                Span::regular(format!(" {}", skills.technical.join(", "))),
            ]));
        }
        if !skills.soft.is_empty() {
            blocks.push(Block::Paragraph(vec![
                Span::bold("Soft Skills:"),
                Span::regular(format!(" {}", skills.soft.join(", "))),
            ]));
        }
    }

    blocks
}

/// Plain text of a block, spans concatenated.
#[cfg(test)]
pub fn block_text(block: &Block) -> String {
    match block {
        Block::Title(text) | Block::Contact(text) | Block::Heading(text) => text.clone(),
        Block::Paragraph(spans) => spans.iter().map(|s| s.text.as_str()).collect(),
        Block::Spacer(_) => String::new(),
    }
}
