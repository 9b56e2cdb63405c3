//! Text composition statistics of a region.

use crate::model::Glyph;

use super::round5;

/// Glyphs counted as list bullets.
pub const BULLETS: [char; 22] = [
    '•', 'o', '▪', '❖', '➢', '►', '✓', '➔', '⇨', '➪', '➨', '➫', '➬', '➭', '➮', '➯', '➱', '➲',
    '\u{2023}', '\u{2043}', '\u{204C}', '\u{204D}',
];

/// Character composition of the glyphs in a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharStats {
    /// Number of characters across all glyph values
    pub chars_count: f32,
    /// Share of numeric characters
    pub pct_numeric: f32,
    /// Share of alphabetic characters
    pub pct_alphabetical: f32,
    /// Share of characters that are neither alphabetic nor numeric
    pub pct_symbolic: f32,
    /// Share of bullet characters
    pub pct_bullet: f32,
    /// Mean glyph height relative to the page mean
    pub delta_to_height: f32,
}

impl CharStats {
    /// Compute statistics over `glyphs`.
    ///
    /// `page_avg_height` is the mean glyph height of the whole page.
    /// `sentinel` replaces `delta_to_height` when there are no characters or
    /// the page mean is zero.
    pub fn compute<'a, I>(glyphs: I, page_avg_height: f64, sentinel: f32) -> Self
    where
        I: IntoIterator<Item = &'a Glyph>,
    {
        let glyphs: Vec<&Glyph> = glyphs.into_iter().collect();
        let chars: Vec<char> = glyphs.iter().flat_map(|g| g.value.chars()).collect();

        if chars.is_empty() {
            return Self {
                chars_count: 0.0,
                pct_numeric: 0.0,
                pct_alphabetical: 0.0,
                pct_symbolic: 0.0,
                pct_bullet: 0.0,
                delta_to_height: sentinel,
            };
        }

        let n = chars.len() as f64;
        let mut numeric = 0usize;
        let mut alphabetical = 0usize;
        let mut symbolic = 0usize;
        let mut bullets = 0usize;

        // The three classes partition the character set: a character that
        // is both alphabetic and numeric (e.g. Roman numeral glyphs) counts
        // as numeric.
        for &c in &chars {
            if c.is_numeric() {
                numeric += 1;
            } else if c.is_alphabetic() {
                alphabetical += 1;
            } else {
                symbolic += 1;
            }
            if BULLETS.contains(&c) {
                bullets += 1;
            }
        }

        let delta_to_height = if page_avg_height != 0.0 {
            let avg = glyphs.iter().map(|g| g.height()).sum::<f64>() / glyphs.len() as f64;
            round5(avg / page_avg_height)
        } else {
            sentinel
        };

        Self {
            chars_count: chars.len() as f32,
            pct_numeric: round5(numeric as f64 / n),
            pct_alphabetical: round5(alphabetical as f64 / n),
            pct_symbolic: round5(symbolic as f64 / n),
            pct_bullet: round5(bullets as f64 / n),
            delta_to_height,
        }
    }
}
