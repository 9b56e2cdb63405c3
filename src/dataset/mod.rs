//! Training data: corpus discovery, ground truth and the labeled feature table.

mod builder;
mod corpus;
pub mod ground_truth;
mod sampling;
mod table;

pub use builder::{
    BuildOptions, DatasetBuilder, DatasetReport, DocumentOutcome, DocumentState, RejectReason,
    RejectedDocument,
};
pub use corpus::{ground_truth_file_name, Corpus, CorpusEntry, GroundTruthFile};
pub use ground_truth::{AnnotatedRegion, PageAnnotation};
pub use sampling::sample_indices;
pub use table::{save_error_report, write_error_report, FeatureTable};
