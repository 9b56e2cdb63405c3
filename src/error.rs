//! Error types for the pdfblocks library.

use std::io;
use thiserror::Error;

use crate::features::FeatureSchema;

/// Result type alias for pdfblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting features, building datasets
/// or training and applying models.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON document dump or model artifact.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed CSV feature table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Ground-truth XML could not be read.
    #[error("Ground truth error: {0}")]
    GroundTruth(String),

    /// A ground-truth region has a type with no block category.
    #[error("Unknown region type: {0}")]
    UnknownRegionType(String),

    /// The page index of a ground-truth file name cannot be parsed.
    #[error("Cannot parse page number from '{0}'")]
    InvalidPageIndex(String),

    /// A polygon point list is malformed.
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A feature vector was produced under, or fed to, the wrong schema.
    #[error("Feature schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Schema the consumer was built for
        expected: FeatureSchema,
        /// Schema of the offered data
        found: FeatureSchema,
    },

    /// A feature row does not have the schema's column count.
    #[error("Feature length mismatch: expected {expected} values, found {found}")]
    FeatureLength {
        /// Column count of the schema
        expected: usize,
        /// Values actually present
        found: usize,
    },

    /// A feature table header does not match the schema.
    #[error("Invalid feature table header: {0}")]
    InvalidHeader(String),

    /// A label is not a known category id.
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    /// Cannot draw `count` distinct items out of `population`.
    #[error("Cannot sample {count} items out of {population}")]
    InvalidSample {
        /// Requested sample size
        count: usize,
        /// Population size
        population: usize,
    },

    /// Not enough samples for the requested operation.
    #[error("Dataset is empty or too small: {0}")]
    EmptyDataset(String),

    /// Model fitting failed.
    #[error("Training error: {0}")]
    Training(String),

    /// A model artifact cannot be used.
    #[error("Model format error: {0}")]
    ModelFormat(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::GroundTruth(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::SchemaMismatch {
            expected: FeatureSchema::V1,
            found: FeatureSchema::V2,
        };
        assert_eq!(
            err.to_string(),
            "Feature schema mismatch: expected v1, found v2"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
