//! Labeled dataset construction.
//!
//! Every document of a corpus goes through
//! `Discovered -> Parsed -> {Valid, Rejected}` on its own. A rejected document
//! contributes no rows; the reason ends up in the [`DatasetReport`]. Documents
//! are processed on the rayon pool and their outcomes are collected through a
//! channel, so the order of rows across documents is not defined.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use super::corpus::{Corpus, CorpusEntry, GroundTruthFile};
use super::ground_truth::PageAnnotation;
use super::sampling::sample_indices;
use crate::error::{Error, Result};
use crate::features::filter::glyphs_inside;
use crate::features::{FeatureExtractor, FeatureSchema, LabeledSample, PageContext};
use crate::layout::WordExtractor;
use crate::source::{DocumentSource, JsonDocumentSource};

/// Options for building a dataset.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Feature schema of the produced rows
    pub schema: FeatureSchema,

    /// Number of documents to sample (0 = all)
    pub sample_size: usize,

    /// Seed for document sampling
    pub seed: u64,

    /// Process documents on the rayon pool
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            schema: FeatureSchema::default(),
            sample_size: 0,
            seed: 42,
            parallel: true,
        }
    }
}

impl BuildOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feature schema.
    pub fn with_schema(mut self, schema: FeatureSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Only process a random sample of `count` documents.
    pub fn with_sample_size(mut self, count: usize) -> Self {
        self.sample_size = count;
        self
    }

    /// Set the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Process documents one at a time on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Processing state of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Found in the corpus
    Discovered,
    /// Loaded by the document source
    Parsed,
    /// All annotated regions turned into rows
    Valid,
    /// Discarded; see the reject reason
    Rejected,
}

/// Why a document was rejected.
#[derive(Debug)]
pub enum RejectReason {
    /// No ground-truth file exists for the document
    NoGroundTruth,

    /// Ground truth references a page past the end of the document
    PageCountMismatch {
        /// Number of pages the ground truth implies
        annotated: u64,
        /// Number of pages in the document
        pages: u32,
    },

    /// A paragraph region contains no glyphs
    EmptyParagraph {
        /// Page number (1-indexed)
        page: u32,
    },

    /// Loading, parsing or extraction failed
    Error(Error),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoGroundTruth => f.write_str("no ground-truth files found"),
            RejectReason::PageCountMismatch { annotated, pages } => write!(
                f,
                "ground truth covers {} pages but the document has {}",
                annotated, pages
            ),
            RejectReason::EmptyParagraph { page } => {
                write!(f, "empty paragraph region on page {}", page)
            }
            RejectReason::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<Error> for RejectReason {
    fn from(err: Error) -> Self {
        RejectReason::Error(err)
    }
}

/// Result of processing one document.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Document identifier
    pub id: String,
    /// Final state
    pub state: DocumentState,
    /// Rows produced (empty unless valid)
    pub samples: Vec<LabeledSample>,
    /// Set when the document was rejected
    pub reject_reason: Option<RejectReason>,
    /// Rotated pages that were skipped (1-indexed)
    pub skipped_pages: Vec<u32>,
}

impl DocumentOutcome {
    fn discovered(id: &str) -> Self {
        Self {
            id: id.to_string(),
            state: DocumentState::Discovered,
            samples: Vec::new(),
            reject_reason: None,
            skipped_pages: Vec::new(),
        }
    }

    /// Whether the document produced rows.
    pub fn is_valid(&self) -> bool {
        self.state == DocumentState::Valid
    }
}

/// A rejected document and the reason.
#[derive(Debug)]
pub struct RejectedDocument {
    pub id: String,
    pub reason: RejectReason,
}

/// Rows and diagnostics of a dataset build.
#[derive(Debug)]
pub struct DatasetReport {
    /// Schema of every row
    pub schema: FeatureSchema,
    /// Labeled rows of all valid documents
    pub samples: Vec<LabeledSample>,
    /// Rejected documents, ordered by id
    pub rejected: Vec<RejectedDocument>,
    /// Number of documents processed
    pub documents: usize,
    /// Number of rotated pages skipped
    pub skipped_pages: usize,
}

impl DatasetReport {
    /// Number of documents that produced rows.
    pub fn valid_documents(&self) -> usize {
        self.documents - self.rejected.len()
    }

    /// Identifiers of the rejected documents.
    pub fn rejected_ids(&self) -> Vec<&str> {
        self.rejected.iter().map(|r| r.id.as_str()).collect()
    }
}

type ProgressFn = dyn Fn(&DocumentOutcome) + Send + Sync;

/// Builds labeled feature rows from a corpus.
pub struct DatasetBuilder {
    options: BuildOptions,
    source: Arc<dyn DocumentSource>,
    extractor: FeatureExtractor,
    progress: Option<Arc<ProgressFn>>,
}

impl fmt::Debug for DatasetBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetBuilder")
            .field("options", &self.options)
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl DatasetBuilder {
    /// Create a builder reading JSON document dumps.
    pub fn new(options: BuildOptions) -> Self {
        let extractor = FeatureExtractor::new(options.schema);
        Self {
            options,
            source: Arc::new(JsonDocumentSource::new()),
            extractor,
            progress: None,
        }
    }

    /// Use another document source.
    pub fn with_source(mut self, source: Arc<dyn DocumentSource>) -> Self {
        self.source = source;
        self
    }

    /// Use another word extractor for v2 blocks.
    pub fn with_word_extractor(mut self, words: Arc<dyn WordExtractor>) -> Self {
        self.extractor = self.extractor.with_word_extractor(words);
        self
    }

    /// Call `f` after each document, from the worker that processed it.
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(&DocumentOutcome) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(f));
        self
    }

    /// Options in use.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// The document source in use.
    pub fn source(&self) -> &dyn DocumentSource {
        self.source.as_ref()
    }

    /// Indices of the corpus entries to process, in processing order.
    pub fn select(&self, corpus: &Corpus) -> Result<Vec<usize>> {
        let population = corpus.len();
        let count = match self.options.sample_size {
            0 => population,
            k => k.min(population),
        };
        sample_indices(population, count, self.options.seed)
    }

    /// Process the corpus.
    pub fn build(&self, corpus: &Corpus) -> Result<DatasetReport> {
        let selected = self.select(corpus)?;
        log::info!(
            "Building {} dataset from {} of {} documents",
            self.options.schema,
            selected.len(),
            corpus.len()
        );

        let entries = corpus.entries();
        let outcomes: Vec<DocumentOutcome> = if self.options.parallel {
            let (sender, receiver) = crossbeam_channel::unbounded();
            selected.par_iter().for_each_with(sender, |sender, &index| {
                let outcome = self.run(&entries[index]);
                if sender.send(outcome).is_err() {
                    log::error!("Result channel closed early");
                }
            });
            receiver.into_iter().collect()
        } else {
            selected.iter().map(|&index| self.run(&entries[index])).collect()
        };

        let mut report = DatasetReport {
            schema: self.options.schema,
            samples: Vec::new(),
            rejected: Vec::new(),
            documents: outcomes.len(),
            skipped_pages: 0,
        };
        for outcome in outcomes {
            report.skipped_pages += outcome.skipped_pages.len();
            match outcome.reject_reason {
                Some(reason) => report.rejected.push(RejectedDocument {
                    id: outcome.id,
                    reason,
                }),
                None => report.samples.extend(outcome.samples),
            }
        }
        report.rejected.sort_by(|a, b| a.id.cmp(&b.id));

        log::info!(
            "Dataset done: {} rows, {} valid documents, {} rejected",
            report.samples.len(),
            report.valid_documents(),
            report.rejected.len()
        );
        Ok(report)
    }

    fn run(&self, entry: &CorpusEntry) -> DocumentOutcome {
        let outcome = self.process(entry);
        if let Some(progress) = &self.progress {
            progress(&outcome);
        }
        outcome
    }

    /// Process a single document.
    pub fn process(&self, entry: &CorpusEntry) -> DocumentOutcome {
        let mut outcome = DocumentOutcome::discovered(&entry.id);
        match self.label_document(entry, &mut outcome) {
            Ok(samples) => {
                log::debug!("{}: {} rows", entry.id, samples.len());
                outcome.state = DocumentState::Valid;
                outcome.samples = samples;
            }
            Err(reason) => {
                log::warn!("Rejecting '{}': {}", entry.id, reason);
                outcome.state = DocumentState::Rejected;
                outcome.reject_reason = Some(reason);
            }
        }
        outcome
    }

    fn label_document(
        &self,
        entry: &CorpusEntry,
        outcome: &mut DocumentOutcome,
    ) -> std::result::Result<Vec<LabeledSample>, RejectReason> {
        let page_indices = entry
            .ground_truth
            .iter()
            .map(GroundTruthFile::page_index)
            .collect::<Result<Vec<u32>>>()?;
        let Some(&max_index) = page_indices.iter().max() else {
            return Err(RejectReason::NoGroundTruth);
        };

        let document = self.source.load(&entry.path)?;
        outcome.state = DocumentState::Parsed;

        let page_count = document.page_count();
        if max_index >= page_count {
            return Err(RejectReason::PageCountMismatch {
                annotated: u64::from(max_index) + 1,
                pages: page_count,
            });
        }

        let schema = self.options.schema;
        let mut samples = Vec::new();

        for (file, &index) in entry.ground_truth.iter().zip(&page_indices) {
            let number = index + 1;
            let page = document
                .get_page(number)
                .ok_or(Error::PageOutOfRange(number, page_count))?;

            if page.is_rotated() {
                log::warn!(
                    "{}: skipping page {} (rotated {} degrees)",
                    entry.id,
                    number,
                    page.rotation
                );
                outcome.skipped_pages.push(number);
                continue;
            }

            let annotation = PageAnnotation::read(&file.path)?;
            let ctx = PageContext::for_page(&document, page);

            for annotated in &annotation.regions {
                let region = annotated.to_region(page.height)?;
                if annotated.is_paragraph()
                    && glyphs_inside(&region.bound, &page.letters, schema.glyph_selection())
                        .is_empty()
                {
                    return Err(RejectReason::EmptyParagraph { page: number });
                }
                samples.push(self.extractor.labeled_sample(&ctx, &region)?);
            }
        }

        let expected = schema.feature_count();
        if let Some(bad) = samples.iter().find(|s| s.features.len() != expected) {
            return Err(Error::FeatureLength {
                expected,
                found: bad.features.len(),
            }
            .into());
        }

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_options_builder() {
        let options = BuildOptions::new()
            .with_schema(FeatureSchema::V1)
            .with_sample_size(10)
            .with_seed(7)
            .sequential();
        assert_eq!(options.schema, FeatureSchema::V1);
        assert_eq!(options.sample_size, 10);
        assert_eq!(options.seed, 7);
        assert!(!options.parallel);
    }

    #[test]
    fn test_select_clamps_sample_size() {
        let entries = (0..5)
            .map(|i| CorpusEntry {
                id: format!("{i}.json"),
                path: format!("{i}.json").into(),
                ground_truth: Vec::new(),
            })
            .collect();
        let corpus = Corpus::from_entries(entries);

        let all = DatasetBuilder::new(BuildOptions::new()).select(&corpus).unwrap();
        assert_eq!(all.len(), 5);

        let more = DatasetBuilder::new(BuildOptions::new().with_sample_size(50))
            .select(&corpus)
            .unwrap();
        assert_eq!(more.len(), 5);

        let some = DatasetBuilder::new(BuildOptions::new().with_sample_size(2));
        assert_eq!(some.select(&corpus).unwrap(), some.select(&corpus).unwrap());
    }

    #[test]
    fn test_no_ground_truth_rejected() {
        let entry = CorpusEntry {
            id: "lonely.json".to_string(),
            path: "lonely.json".into(),
            ground_truth: Vec::new(),
        };
        let outcome = DatasetBuilder::new(BuildOptions::new()).process(&entry);
        assert_eq!(outcome.state, DocumentState::Rejected);
        assert!(matches!(
            outcome.reject_reason,
            Some(RejectReason::NoGroundTruth)
        ));
    }

    #[test]
    fn test_huge_page_index_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let doc_path = dir.path().join("huge.json");
        let mut doc = crate::model::Document::new("");
        doc.add_page(crate::model::Page::new(1, 612.0, 792.0));
        std::fs::write(&doc_path, serde_json::to_string(&doc).unwrap()).unwrap();

        let entry = CorpusEntry {
            id: "huge.json".to_string(),
            path: doc_path,
            ground_truth: vec![GroundTruthFile {
                path: dir.path().join("huge_4294967295.xml"),
                page_label: "4294967295".to_string(),
            }],
        };
        let outcome = DatasetBuilder::new(BuildOptions::new()).process(&entry);
        assert_eq!(outcome.state, DocumentState::Rejected);
        assert!(matches!(
            outcome.reject_reason,
            Some(RejectReason::PageCountMismatch {
                annotated: 4294967296,
                pages: 1
            })
        ));
    }

    #[test]
    fn test_reject_reason_display() {
        let reason = RejectReason::PageCountMismatch {
            annotated: 4,
            pages: 2,
        };
        assert_eq!(
            reason.to_string(),
            "ground truth covers 4 pages but the document has 2"
        );
    }
}
