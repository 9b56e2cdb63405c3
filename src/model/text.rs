//! Text structure produced by word/line/block segmentation.

use super::{Glyph, Rect};
use serde::{Deserialize, Serialize};

/// An ordered run of glyphs forming one word.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Word {
    /// Glyphs in reading order
    pub letters: Vec<Glyph>,
}

impl Word {
    /// Create a word from glyphs.
    pub fn new(letters: Vec<Glyph>) -> Self {
        Self { letters }
    }

    /// Concatenated glyph values.
    pub fn text(&self) -> String {
        self.letters.iter().map(|g| g.value.as_str()).collect()
    }

    /// Union of the glyph rectangles.
    pub fn bounding_box(&self) -> Option<Rect> {
        Rect::union_all(self.letters.iter().map(|g| &g.rect))
    }
}

/// Words sharing a baseline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextLine {
    /// Words in reading order
    pub words: Vec<Word>,
}

impl TextLine {
    /// Create a line from words.
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Words joined by a single space.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(Word::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Union of the word boxes.
    pub fn bounding_box(&self) -> Option<Rect> {
        let boxes: Vec<Rect> = self.words.iter().filter_map(Word::bounding_box).collect();
        Rect::union_all(&boxes)
    }
}

/// A block of text lines: the unit that gets classified.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    /// Lines from top to bottom
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Create a block from lines.
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }

    /// Whether the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Union of the line boxes.
    pub fn bounding_box(&self) -> Option<Rect> {
        let boxes: Vec<Rect> = self
            .lines
            .iter()
            .filter_map(TextLine::bounding_box)
            .collect();
        Rect::union_all(&boxes)
    }

    /// All words of the block, in order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.lines.iter().flat_map(|l| l.words.iter())
    }

    /// All glyphs of the block, in order.
    pub fn letters(&self) -> impl Iterator<Item = &Glyph> {
        self.words().flat_map(|w| w.letters.iter())
    }

    /// Number of words.
    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
