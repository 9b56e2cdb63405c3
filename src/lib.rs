//! # pdfblocks
//!
//! Feature extraction and gradient-boosted classification of PDF page blocks.
//!
//! A block is a rectangular region of a parsed page. This library turns the
//! glyphs, vector paths and raster images inside a block into a fixed-order
//! numeric feature vector, and classifies that vector as body text, title,
//! list item, table or image.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfblocks::{load_document, ModelArtifact};
//!
//! fn main() -> pdfblocks::Result<()> {
//!     let doc = load_document("paper.json")?;
//!     let classifier = ModelArtifact::load("model.json.gz".as_ref())?.into_classifier();
//!
//!     for page in &doc.pages {
//!         let bookmarks = doc.bookmarks_on_page(page.number);
//!         for (block, result) in classifier.classify_page(page, bookmarks)? {
//!             println!("{:?}: {} ({:.3})", block.text(), result.category, result.score);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two feature schemas**: v1 (13 columns) and v2 (17 columns, adds block shape and outline similarity)
//! - **Dataset building**: PAGE-XML ground truth, seeded document sampling, parallel per-document processing
//! - **Training**: one-versus-rest boosted trees, k-fold cross-validation, permutation importance
//! - **Persistence**: CSV feature tables and compressed model artifacts

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod features;
pub mod layout;
pub mod model;
pub mod source;

// Re-export commonly used types
pub use classifier::{
    BlockClassifier, BoosterOptions, ClassificationResult, CrossValidationReport, GbdtLearner,
    GbdtModel, Learner, ModelArtifact, MulticlassMetrics, MulticlassModel, TrainOptions, Trainer,
};
pub use dataset::{BuildOptions, Corpus, DatasetBuilder, DatasetReport, FeatureTable};
pub use error::{Error, Result};
pub use features::{
    FeatureExtractor, FeatureSchema, FeatureVector, LabeledSample, PageContext,
};
pub use layout::{WhitespaceWordExtractor, WordExtractor};
pub use model::{
    BlockCategory, BookmarkNode, Document, Glyph, Page, Path, PathCommand, Point, RasterImage,
    Rect, Region, TextBlock,
};
pub use source::{DocumentSource, JsonDocumentSource};

/// Load a parsed document dump.
///
/// # Example
///
/// ```no_run
/// use pdfblocks::load_document;
///
/// let doc = load_document("paper.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_document<P: AsRef<std::path::Path>>(path: P) -> Result<Document> {
    JsonDocumentSource::new().load(path.as_ref())
}

/// Compute the feature vector of one region of a document page.
///
/// `page_number` is 1-indexed.
///
/// # Example
///
/// ```no_run
/// use pdfblocks::{extract_features, load_document, FeatureSchema, Rect};
///
/// let doc = load_document("paper.json").unwrap();
/// let bound = Rect::new(50.0, 600.0, 300.0, 700.0);
/// let features = extract_features(&doc, 1, &bound, FeatureSchema::V2).unwrap();
/// println!("{:?}", features.values());
/// ```
pub fn extract_features(
    document: &Document,
    page_number: u32,
    bound: &Rect,
    schema: FeatureSchema,
) -> Result<FeatureVector> {
    let page = document
        .get_page(page_number)
        .ok_or(Error::PageOutOfRange(page_number, document.page_count()))?;
    let ctx = PageContext::for_page(document, page);
    FeatureExtractor::new(schema).extract_region(&ctx, bound)
}

/// Build a labeled feature table from a directory of dumps and ground truth.
///
/// # Example
///
/// ```no_run
/// use pdfblocks::{build_dataset, BuildOptions, FeatureSchema};
///
/// let options = BuildOptions::new().with_schema(FeatureSchema::V1).with_sample_size(100);
/// let report = build_dataset("corpus/", options).unwrap();
/// println!("{} rows, {} rejected", report.samples.len(), report.rejected.len());
/// ```
pub fn build_dataset<P: AsRef<std::path::Path>>(
    root: P,
    options: BuildOptions,
) -> Result<DatasetReport> {
    let builder = DatasetBuilder::new(options);
    let corpus = Corpus::discover(root.as_ref(), builder.source())?;
    builder.build(&corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        let mut doc = Document::new("sample");
        let mut page = Page::new(1, 100.0, 100.0);
        page.letters
            .push(Glyph::new("7", Rect::new(10.0, 10.0, 16.0, 20.0)));
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_extract_features_v1() {
        let doc = document();
        let bound = Rect::new(0.0, 0.0, 50.0, 50.0);
        let features = extract_features(&doc, 1, &bound, FeatureSchema::V1).unwrap();
        assert_eq!(features.len(), 13);
        assert_eq!(features.get("charsCount"), Some(1.0));
        assert_eq!(features.get("pctNumericChars"), Some(1.0));
    }

    #[test]
    fn test_extract_features_page_out_of_range() {
        let doc = document();
        let bound = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(matches!(
            extract_features(&doc, 3, &bound, FeatureSchema::V2),
            Err(Error::PageOutOfRange(3, 1))
        ));
    }

    #[test]
    fn test_load_document_missing_file() {
        assert!(matches!(
            load_document("does/not/exist.json"),
            Err(Error::Io(_))
        ));
    }
}
