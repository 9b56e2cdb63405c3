//! Block shape and outline similarity.

use unicode_normalization::UnicodeNormalization;

use crate::model::{BookmarkNode, TextBlock};

use super::round5;

/// Geometry of a text block plus its similarity to the page outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextGeometry {
    /// Width over height of the block box, NaN when undefined
    pub aspect_ratio: f32,
    /// Number of words
    pub words_count: f32,
    /// Number of lines
    pub lines_count: f32,
    /// Smallest normalized edit distance to a bookmark title on the page,
    /// NaN when the page has no bookmarks
    pub best_norm_edit_distance: f32,
}

impl TextGeometry {
    /// Compute text geometry for `block` against the page's bookmarks.
    ///
    /// An empty block has no defined aspect ratio or outline similarity.
    pub fn compute(block: &TextBlock, bookmarks: &[&BookmarkNode]) -> Self {
        let aspect_ratio = match block.bounding_box() {
            Some(bbox) if bbox.height() != 0.0 => round5(bbox.width() / bbox.height()),
            _ => f32::NAN,
        };

        let best_norm_edit_distance = if block.is_empty() || bookmarks.is_empty() {
            f32::NAN
        } else {
            let text = block.text();
            let best = bookmarks
                .iter()
                .map(|b| normalized_edit_distance(&text, &b.title))
                .fold(f64::INFINITY, f64::min);
            round5(best)
        };

        Self {
            aspect_ratio,
            words_count: block.word_count() as f32,
            lines_count: block.line_count() as f32,
            best_norm_edit_distance,
        }
    }
}

/// Case-fold and apply compatibility composition (NFKC).
pub fn normalize_text(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

/// Levenshtein distance of the normalized strings over the longer length.
///
/// Two empty strings are identical (0).
pub fn normalized_edit_distance(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    strsim::levenshtein(&a, &b) as f64 / longest as f64
}
