//! PDF writer.
//!
//! Two passes: `plan_pages` turns blocks into positioned text (pure, so
//! pagination and wrapping are testable without parsing a PDF), then
//! `write_pdf` paints the plan with `printpdf` using the base-14 Helvetica
//! faces. Coordinates are PDF points with the origin at the bottom left.
//!
//! The base-14 faces only cover WinAnsiEncoding. Other characters (CJK,
//! most symbols) are missing from the PDF; the DOCX keeps them.

use std::collections::BTreeSet;

use printpdf::{Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt, Rgb};
use tracing::warn;

use crate::render::blocks::{Block, Span};
use crate::render::metrics::{get_metrics, wrap_words, FontFace, StyledWord};
use crate::render::RenderError;

/// US Letter.
pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;
pub const MARGIN_LEFT_PT: f32 = 72.0;
pub const MARGIN_RIGHT_PT: f32 = 72.0;
pub const MARGIN_TOP_PT: f32 = 72.0;
pub const MARGIN_BOTTOM_PT: f32 = 18.0;

const TITLE_SIZE: f32 = 20.0;
const TITLE_SPACE_AFTER: f32 = 30.0;
const HEADING_SIZE: f32 = 14.0;
const HEADING_SPACE_BEFORE: f32 = 10.0;
const HEADING_SPACE_AFTER: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
/// Leading as a multiple of font size.
const LINE_SPACING: f32 = 1.2;

const BLACK: TextColor = TextColor(0.0, 0.0, 0.0);
/// Section headings.
const DARK_BLUE: TextColor = TextColor(0.0, 0.0, 0.545);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextColor(pub f32, pub f32, pub f32);

/// One run of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub face: FontFace,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub color: TextColor,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub items: Vec<PlacedText>,
}

fn content_width() -> f32 {
    PAGE_WIDTH_PT - MARGIN_LEFT_PT - MARGIN_RIGHT_PT
}

struct Cursor {
    pages: Vec<PageLayout>,
    /// Top of the free area on the current page.
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            y: PAGE_HEIGHT_PT - MARGIN_TOP_PT,
        }
    }

    /// Reserves one line of the given leading, breaking the page when it
    /// would cross the bottom margin. Returns the baseline.
    fn next_line(&mut self, leading: f32, size: f32) -> f32 {
        if self.y - leading < MARGIN_BOTTOM_PT {
            self.pages.push(PageLayout::default());
            self.y = PAGE_HEIGHT_PT - MARGIN_TOP_PT;
        }
        self.y -= leading;
        // Baseline sits a little above the bottom of the line box.
        self.y + (leading - size)
    }

    /// Vertical gap. Gaps never start a new page on their own; a gap that
    /// reaches the bottom margin just leaves the cursor there.
    fn skip(&mut self, points: f32) {
        self.y = (self.y - points).max(MARGIN_BOTTOM_PT);
    }

    fn place(&mut self, item: PlacedText) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    /// Wraps `words` and places each line, merging same-face neighbours into
    /// one run. `centered` centres each line within the content width.
    fn place_wrapped(&mut self, words: &[StyledWord], size: f32, color: TextColor, centered: bool) {
        let leading = size * LINE_SPACING;
        for line in wrap_words(words, size, content_width()) {
            let runs = merge_runs(&line);
            let line_width = runs_width(&runs, size);
            let baseline = self.next_line(leading, size);
            let mut x = if centered {
                MARGIN_LEFT_PT + ((content_width() - line_width) / 2.0).max(0.0)
            } else {
                MARGIN_LEFT_PT
            };
            for (i, (face, text)) in runs.into_iter().enumerate() {
                if i > 0 {
                    x += get_metrics(face).space_width * size;
                }
                let width = get_metrics(face).width_pt(&text, size);
                self.place(PlacedText {
                    text,
                    face,
                    size,
                    x,
                    y: baseline,
                    color,
                });
                x += width;
            }
        }
    }
}

fn merge_runs(line: &[StyledWord]) -> Vec<(FontFace, String)> {
    let mut runs: Vec<(FontFace, String)> = Vec::new();
    for word in line {
        match runs.last_mut() {
            Some((face, text)) if *face == word.face => {
                text.push(' ');
                text.push_str(&word.text);
            }
            _ => runs.push((word.face, word.text.clone())),
        }
    }
    runs
}

fn runs_width(runs: &[(FontFace, String)], size: f32) -> f32 {
    runs.iter()
        .enumerate()
        .map(|(i, (face, text))| {
            let metrics = get_metrics(*face);
            let gap = if i > 0 { metrics.space_width * size } else { 0.0 };
            gap + metrics.width_pt(text, size)
        })
        .sum()
}

fn words_of(spans: &[Span]) -> Vec<StyledWord> {
    spans
        .iter()
        .flat_map(|span| {
            let face = if span.bold { FontFace::Bold } else { FontFace::Regular };
            span.text.split_whitespace().map(move |w| StyledWord {
                text: w.to_string(),
                face,
            })
        })
        .collect()
}

fn plain_words(text: &str, face: FontFace) -> Vec<StyledWord> {
    words_of(&[Span {
        text: text.to_string(),
        bold: face == FontFace::Bold,
    }])
}

/// Positions every block. Always returns at least one page.
pub fn plan_pages(blocks: &[Block]) -> Vec<PageLayout> {
    let mut cursor = Cursor::new();

    for block in blocks {
        match block {
            Block::Title(text) => {
                cursor.place_wrapped(&plain_words(text, FontFace::Bold), TITLE_SIZE, BLACK, true);
                cursor.skip(TITLE_SPACE_AFTER);
            }
            Block::Contact(text) => {
                cursor.place_wrapped(&plain_words(text, FontFace::Regular), BODY_SIZE, BLACK, true);
            }
            Block::Heading(text) => {
                cursor.skip(HEADING_SPACE_BEFORE);
                cursor.place_wrapped(
                    &plain_words(text, FontFace::Bold),
                    HEADING_SIZE,
                    DARK_BLUE,
                    false,
                );
                cursor.skip(HEADING_SPACE_AFTER);
            }
            Block::Paragraph(spans) => {
                cursor.place_wrapped(&words_of(spans), BODY_SIZE, BLACK, false);
            }
            Block::Spacer(points) => cursor.skip(*points),
        }
    }

    cursor.pages
}

/// WinAnsi code points 0x80-0x9F that are not Latin-1.
const WIN_ANSI_EXTRAS: [char; 27] = [
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•',
    '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WIN_ANSI_EXTRAS.contains(&c)
}

/// Distinct characters in the plan that the builtin fonts cannot draw.
pub fn unsupported_chars(pages: &[PageLayout]) -> BTreeSet<char> {
    pages
        .iter()
        .flat_map(|page| &page.items)
        .flat_map(|item| item.text.chars())
        .filter(|c| !is_win_ansi(*c))
        .collect()
}

/// Renders blocks to PDF bytes.
pub fn write_pdf(title: &str, blocks: &[Block]) -> Result<Vec<u8>, RenderError> {
    let pages = plan_pages(blocks);
    let dropped = unsupported_chars(&pages);
    if !dropped.is_empty() {
        warn!(
            chars = %dropped.iter().collect::<String>(),
            "Characters outside WinAnsi will be missing from the PDF"
        );
    }
    let width = Mm::from(Pt(PAGE_WIDTH_PT));
    let height = Mm::from(Pt(PAGE_HEIGHT_PT));

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
    let regular = doc
        .add_builtin_font(FontFace::Regular.builtin())
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(FontFace::Bold.builtin())
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_ref, layer_ref) = doc.add_page(width, height, "Layer 1");
            doc.get_page(page_ref).get_layer(layer_ref)
        };
        paint_page(&layer, page, &regular, &bold);
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn paint_page(
    layer: &PdfLayerReference,
    page: &PageLayout,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let mut current: Option<TextColor> = None;
    for item in &page.items {
        if current != Some(item.color) {
            let TextColor(r, g, b) = item.color;
            layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
            current = Some(item.color);
        }
        let font = match item.face {
            FontFace::Regular => regular,
            FontFace::Bold => bold,
        };
        layer.use_text(
            item.text.as_str(),
            item.size,
            Mm::from(Pt(item.x)),
            Mm::from(Pt(item.y)),
            font,
        );
    }
}
