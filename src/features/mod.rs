//! Block feature extraction.
//!
//! Each extractor is a pure function over the content of one region:
//!
//! - [`filter`] restricts page glyphs, paths and images to a region
//! - [`CharStats`] describes the text composition
//! - [`PathStats`] describes the vector drawing commands
//! - [`ImageStats`] describes raster image coverage
//! - [`TextGeometry`] describes the block shape and its outline similarity (v2)
//!
//! [`FeatureExtractor`] runs them and orders the results into a
//! [`FeatureVector`] for the active [`FeatureSchema`].

mod assembler;
mod chars;
pub mod filter;
mod images;
mod paths;
mod schema;
mod text;

pub use assembler::{FeatureExtractor, PageContext, RegionFeatures};
pub use chars::{CharStats, BULLETS};
pub use images::ImageStats;
pub use paths::PathStats;
pub use schema::{
    FeatureSchema, FeatureVector, GlyphSelection, LabeledSample, LABEL_COLUMN, V1_COLUMNS,
    V2_COLUMNS,
};
pub use text::{normalize_text, normalized_edit_distance, TextGeometry};

/// Round to 5 decimals, ties to even.
pub(crate) fn round5(value: f64) -> f32 {
    ((value * 1e5).round_ties_even() / 1e5) as f32
}
