//! Ordering extractor outputs into schema vectors.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::layout::{build_block, WhitespaceWordExtractor, WordExtractor};
use crate::model::{BookmarkNode, Document, Page, Rect, Region, TextBlock};

use super::filter::{glyphs_inside, images_inside, paths_inside};
use super::{
    CharStats, FeatureSchema, FeatureVector, ImageStats, LabeledSample, PathStats, TextGeometry,
};

/// Per-page inputs shared by every region of the page.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    /// The page being processed
    pub page: &'a Page,
    /// Outline entries anchored to this page
    pub bookmarks: Vec<&'a BookmarkNode>,
    average_glyph_height: f64,
}

impl<'a> PageContext<'a> {
    /// Context for `page` with an explicit bookmark list.
    pub fn new(page: &'a Page, bookmarks: Vec<&'a BookmarkNode>) -> Self {
        Self {
            page,
            bookmarks,
            average_glyph_height: page.average_glyph_height(),
        }
    }

    /// Context for a page of `document`, with bookmarks taken from its outline.
    pub fn for_page(document: &'a Document, page: &'a Page) -> Self {
        Self::new(page, document.bookmarks_on_page(page.number))
    }

    /// Mean glyph height over the whole page.
    pub fn average_glyph_height(&self) -> f64 {
        self.average_glyph_height
    }
}

/// Raw extractor outputs for one region, before ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFeatures {
    /// Character mix and glyph height ratio
    pub chars: CharStats,
    /// Vector path shape ratios
    pub paths: PathStats,
    /// Image count and footprint
    pub images: ImageStats,
    /// Present for schema v2 only
    pub text: Option<TextGeometry>,
}

impl RegionFeatures {
    /// Order the outputs as `schema` prescribes.
    pub fn assemble(&self, schema: FeatureSchema) -> Result<FeatureVector> {
        let c = &self.chars;
        let p = &self.paths;
        let i = &self.images;

        let values = match schema {
            FeatureSchema::V1 => vec![
                c.chars_count,
                c.pct_numeric,
                c.pct_alphabetical,
                c.pct_symbolic,
                c.pct_bullet,
                c.delta_to_height,
                p.paths_count,
                p.pct_bezier,
                p.pct_horizontal,
                p.pct_vertical,
                p.pct_oblique,
                i.images_count,
                i.avg_proportion,
            ],
            FeatureSchema::V2 => {
                let t = self.text.ok_or(Error::FeatureLength {
                    expected: schema.feature_count(),
                    found: FeatureSchema::V1.feature_count(),
                })?;
                vec![
                    t.aspect_ratio,
                    c.chars_count,
                    t.words_count,
                    t.lines_count,
                    c.pct_numeric,
                    c.pct_alphabetical,
                    c.pct_symbolic,
                    c.pct_bullet,
                    c.delta_to_height,
                    p.paths_count,
                    p.pct_bezier,
                    p.pct_horizontal,
                    p.pct_vertical,
                    p.pct_oblique,
                    i.images_count,
                    i.avg_proportion,
                    t.best_norm_edit_distance,
                ]
            }
        };

        FeatureVector::new(schema, values)
    }
}

/// Computes feature vectors for regions and blocks under one schema.
#[derive(Clone)]
pub struct FeatureExtractor {
    schema: FeatureSchema,
    words: Arc<dyn WordExtractor>,
}

impl fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureSchema::default())
    }
}

impl FeatureExtractor {
    /// Extractor for `schema` with the default word grouping.
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            words: Arc::new(WhitespaceWordExtractor::default()),
        }
    }

    /// Replace the word extractor used to build blocks from region glyphs.
    pub fn with_word_extractor(mut self, words: Arc<dyn WordExtractor>) -> Self {
        self.words = words;
        self
    }

    /// Schema of the produced vectors.
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Extractor outputs for an annotated region.
    ///
    /// Under v2 the region's glyphs are first grouped into a block.
    pub fn region_features(&self, ctx: &PageContext<'_>, bound: &Rect) -> RegionFeatures {
        let page = ctx.page;
        let glyphs = glyphs_inside(bound, &page.letters, self.schema.glyph_selection());
        let paths = PathStats::compute(paths_inside(bound, &page.paths));
        let images = ImageStats::compute(bound, images_inside(bound, &page.images));

        match self.schema {
            FeatureSchema::V1 => RegionFeatures {
                chars: CharStats::compute(
                    glyphs,
                    ctx.average_glyph_height(),
                    self.schema.sentinel(),
                ),
                paths,
                images,
                text: None,
            },
            FeatureSchema::V2 => {
                let block = build_block(self.words.as_ref(), &glyphs);
                RegionFeatures {
                    chars: CharStats::compute(
                        block.letters(),
                        ctx.average_glyph_height(),
                        self.schema.sentinel(),
                    ),
                    paths,
                    images,
                    text: Some(TextGeometry::compute(&block, &ctx.bookmarks)),
                }
            }
        }
    }

    /// Extractor outputs for a block produced by a page segmenter.
    ///
    /// Paths and images are taken from the block's bounding box. Under v1
    /// the block is treated as a plain region.
    pub fn block_features(&self, ctx: &PageContext<'_>, block: &TextBlock) -> RegionFeatures {
        let bound = block.bounding_box().unwrap_or_default();
        match self.schema {
            FeatureSchema::V1 => self.region_features(ctx, &bound),
            FeatureSchema::V2 => {
                let page = ctx.page;
                RegionFeatures {
                    chars: CharStats::compute(
                        block.letters(),
                        ctx.average_glyph_height(),
                        self.schema.sentinel(),
                    ),
                    paths: PathStats::compute(paths_inside(&bound, &page.paths)),
                    images: ImageStats::compute(&bound, images_inside(&bound, &page.images)),
                    text: Some(TextGeometry::compute(block, &ctx.bookmarks)),
                }
            }
        }
    }

    /// Feature vector of an annotated region.
    pub fn extract_region(&self, ctx: &PageContext<'_>, bound: &Rect) -> Result<FeatureVector> {
        self.region_features(ctx, bound).assemble(self.schema)
    }

    /// Feature vector of a segmented block.
    pub fn extract_block(&self, ctx: &PageContext<'_>, block: &TextBlock) -> Result<FeatureVector> {
        self.block_features(ctx, block).assemble(self.schema)
    }

    /// Training row for a labeled region.
    pub fn labeled_sample(&self, ctx: &PageContext<'_>, region: &Region) -> Result<LabeledSample> {
        let category = region.category.ok_or_else(|| {
            Error::InvalidLabel("region has no ground-truth category".to_string())
        })?;
        let features = self.extract_region(ctx, &region.bound)?;
        Ok(LabeledSample::new(features, category))
    }
}
