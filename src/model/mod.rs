//! Document model types.
//!
//! This module defines what the document parser hands to the feature
//! extractors: glyphs, vector paths and raster images with their geometry,
//! the outline, and the text structure built on top of the glyphs.

mod category;
mod document;
mod geometry;
mod page;
mod region;
mod text;

pub use category::{BlockCategory, CATEGORY_COUNT};
pub use document::{BookmarkNode, Document};
pub use geometry::{Point, Rect};
pub use page::{Glyph, Page, Path, PathCommand, RasterImage};
pub use region::Region;
pub use text::{TextBlock, TextLine, Word};
