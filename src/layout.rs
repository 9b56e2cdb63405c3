//! Word and line grouping for region glyphs.
//!
//! Page segmentation proper happens upstream; this module only turns the
//! glyphs of one region into a [`TextBlock`] so block-level features can be
//! computed during dataset building. The word extractor is pluggable.

use std::cmp::Ordering;

use crate::model::{Glyph, TextBlock, TextLine, Word};

/// Groups glyphs into words.
pub trait WordExtractor: Send + Sync {
    /// Split `glyphs` into words in reading order.
    fn words(&self, glyphs: &[&Glyph]) -> Vec<Word>;
}

/// Splits words on whitespace glyphs and horizontal gaps.
#[derive(Debug, Clone, Copy)]
pub struct WhitespaceWordExtractor {
    /// Max bottom offset between glyphs of one row, as a fraction of glyph height
    pub row_tolerance: f64,
    /// Min horizontal gap that starts a new word, as a fraction of glyph height
    pub gap_ratio: f64,
}

impl Default for WhitespaceWordExtractor {
    fn default() -> Self {
        Self {
            row_tolerance: 0.3,
            gap_ratio: 0.25,
        }
    }
}

impl WhitespaceWordExtractor {
    /// Create an extractor with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f64) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Set the word gap ratio.
    pub fn with_gap_ratio(mut self, ratio: f64) -> Self {
        self.gap_ratio = ratio;
        self
    }

    fn rows<'a>(&self, glyphs: &[&'a Glyph]) -> Vec<Vec<&'a Glyph>> {
        let mut sorted: Vec<&Glyph> = glyphs.to_vec();
        sorted.sort_by(|a, b| {
            top_down_left_right(a.rect.bottom, a.rect.left, b.rect.bottom, b.rect.left)
        });

        let mut rows: Vec<Vec<&Glyph>> = Vec::new();
        let mut current: Vec<&Glyph> = Vec::new();
        let mut current_bottom: Option<f64> = None;

        for glyph in sorted {
            let tolerance = glyph.height() * self.row_tolerance;
            match current_bottom {
                Some(bottom) if (glyph.rect.bottom - bottom).abs() <= tolerance => {
                    current.push(glyph);
                }
                _ => {
                    if !current.is_empty() {
                        rows.push(std::mem::take(&mut current));
                    }
                    current_bottom = Some(glyph.rect.bottom);
                    current.push(glyph);
                }
            }
        }
        if !current.is_empty() {
            rows.push(current);
        }

        for row in &mut rows {
            row.sort_by(|a, b| a.rect.left.partial_cmp(&b.rect.left).unwrap_or(Ordering::Equal));
        }
        rows
    }
}

impl WordExtractor for WhitespaceWordExtractor {
    fn words(&self, glyphs: &[&Glyph]) -> Vec<Word> {
        let mut words = Vec::new();

        for row in self.rows(glyphs) {
            let mut letters: Vec<Glyph> = Vec::new();
            for glyph in row {
                if glyph.value.chars().all(char::is_whitespace) {
                    if !letters.is_empty() {
                        words.push(Word::new(std::mem::take(&mut letters)));
                    }
                    continue;
                }
                if let Some(prev) = letters.last() {
                    let gap = glyph.rect.left - prev.rect.right;
                    let scale = glyph.height().max(prev.height());
                    if gap > scale * self.gap_ratio {
                        words.push(Word::new(std::mem::take(&mut letters)));
                    }
                }
                letters.push(glyph.clone());
            }
            if !letters.is_empty() {
                words.push(Word::new(letters));
            }
        }

        words
    }
}

/// Group words into lines by their bottom edge, top to bottom.
///
/// Words in a line are ordered left to right.
pub fn group_lines(words: Vec<Word>, tolerance: f64) -> Vec<TextLine> {
    let mut boxed: Vec<_> = words
        .into_iter()
        .filter_map(|w| w.bounding_box().map(|b| (b, w)))
        .collect();
    boxed.sort_by(|(a, _), (b, _)| top_down_left_right(a.bottom, a.left, b.bottom, b.left));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut current_bottom: Option<f64> = None;

    for (bbox, word) in boxed {
        let limit = bbox.height() * tolerance;
        match current_bottom {
            Some(bottom) if (bbox.bottom - bottom).abs() <= limit => current.push(word),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::new(std::mem::take(&mut current)));
                }
                current_bottom = Some(bbox.bottom);
                current.push(word);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::new(current));
    }

    lines
}

/// Build a single block from the glyphs of a region.
pub fn build_block(extractor: &dyn WordExtractor, glyphs: &[&Glyph]) -> TextBlock {
    let words = extractor.words(glyphs);
    TextBlock::new(group_lines(words, 0.3))
}

// Y descending (PDF space is bottom-up), then X ascending.
fn top_down_left_right(ay: f64, ax: f64, by: f64, bx: f64) -> Ordering {
    match by.partial_cmp(&ay).unwrap_or(Ordering::Equal) {
        Ordering::Equal => ax.partial_cmp(&bx).unwrap_or(Ordering::Equal),
        other => other,
    }
}
