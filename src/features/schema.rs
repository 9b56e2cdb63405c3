//! Feature schemas and the vectors they describe.
//!
//! A trained model only understands vectors of the schema it was trained
//! with: the column count and order are the whole contract. Every vector
//! therefore carries its schema tag, and consumers check it instead of
//! guessing from the length.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::BlockCategory;

/// Name of the trailing label column in feature tables.
pub const LABEL_COLUMN: &str = "label";

/// Columns of schema v1, in order.
pub const V1_COLUMNS: [&str; 13] = [
    "charsCount",
    "pctNumericChars",
    "pctAlphabeticalChars",
    "pctSymbolicChars",
    "pctBulletChars",
    "deltaToHeight",
    "pathsCount",
    "pctBezierPaths",
    "pctHorPaths",
    "pctVertPaths",
    "pctOblPaths",
    "imagesCount",
    "imageAvgProportion",
];

/// Columns of schema v2, in order.
pub const V2_COLUMNS: [&str; 17] = [
    "blockAspectRatio",
    "charsCount",
    "wordsCount",
    "linesCount",
    "pctNumericChars",
    "pctAlphabeticalChars",
    "pctSymbolicChars",
    "pctBulletChars",
    "deltaToHeight",
    "pathsCount",
    "pctBezierPaths",
    "pctHorPaths",
    "pctVertPaths",
    "pctOblPaths",
    "imagesCount",
    "imageAvgProportion",
    "bestNormEditDistance",
];

/// How glyphs are assigned to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSelection {
    /// The glyph rectangle must lie fully inside the region
    Contained,
    /// The glyph rectangle must overlap or touch the region
    Intersecting,
}

/// Version of the feature layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSchema {
    /// 13 region features; undefined values are -1
    V1,
    /// 17 block features including text geometry; undefined values are NaN
    #[default]
    V2,
}

impl FeatureSchema {
    /// Ordered feature column names.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            FeatureSchema::V1 => &V1_COLUMNS,
            FeatureSchema::V2 => &V2_COLUMNS,
        }
    }

    /// Number of features.
    pub fn feature_count(self) -> usize {
        self.columns().len()
    }

    /// Feature columns followed by the label column.
    pub fn header(self) -> Vec<&'static str> {
        let mut header = self.columns().to_vec();
        header.push(LABEL_COLUMN);
        header
    }

    /// Position of a column by name.
    pub fn column_index(self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == name)
    }

    /// Marker for values whose denominator is zero.
    pub fn sentinel(self) -> f32 {
        match self {
            FeatureSchema::V1 => -1.0,
            FeatureSchema::V2 => f32::NAN,
        }
    }

    /// Glyph-to-region assignment rule.
    pub fn glyph_selection(self) -> GlyphSelection {
        match self {
            FeatureSchema::V1 => GlyphSelection::Contained,
            FeatureSchema::V2 => GlyphSelection::Intersecting,
        }
    }

    /// Short name ("v1", "v2").
    pub fn name(self) -> &'static str {
        match self {
            FeatureSchema::V1 => "v1",
            FeatureSchema::V2 => "v2",
        }
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(FeatureSchema::V1),
            "v2" | "2" => Ok(FeatureSchema::V2),
            other => Err(Error::Other(format!("Unknown feature schema: {}", other))),
        }
    }
}

/// An ordered feature vector tagged with its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureVector")]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct RawFeatureVector {
    schema: FeatureSchema,
    values: Vec<f32>,
}

impl TryFrom<RawFeatureVector> for FeatureVector {
    type Error = Error;

    fn try_from(raw: RawFeatureVector) -> Result<Self> {
        FeatureVector::new(raw.schema, raw.values)
    }
}

impl FeatureVector {
    /// Create a vector, checking the value count against the schema.
    pub fn new(schema: FeatureSchema, values: Vec<f32>) -> Result<Self> {
        if values.len() != schema.feature_count() {
            return Err(Error::FeatureLength {
                expected: schema.feature_count(),
                found: values.len(),
            });
        }
        Ok(Self { schema, values })
    }

    /// Schema the vector was built under.
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Values in column order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a valid vector; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column.
    pub fn get(&self, column: &str) -> Option<f32> {
        self.schema
            .column_index(column)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Fail unless the vector belongs to `expected`.
    pub fn ensure_schema(&self, expected: FeatureSchema) -> Result<()> {
        if self.schema != expected {
            return Err(Error::SchemaMismatch {
                expected,
                found: self.schema,
            });
        }
        Ok(())
    }
}

/// A feature vector with its ground-truth category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    /// Extracted features
    pub features: FeatureVector,
    /// Annotated category
    pub category: BlockCategory,
}

impl LabeledSample {
    /// Pair features with a category.
    pub fn new(features: FeatureVector, category: BlockCategory) -> Self {
        Self { features, category }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_counts() {
        assert_eq!(FeatureSchema::V1.feature_count(), 13);
        assert_eq!(FeatureSchema::V2.feature_count(), 17);
        assert_eq!(FeatureSchema::V2.header().last(), Some(&"label"));
    }

    #[test]
    fn test_v2_extends_v1_columns() {
        for column in V1_COLUMNS {
            assert!(FeatureSchema::V2.column_index(column).is_some(), "{column}");
        }
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(FeatureSchema::V1.sentinel(), -1.0);
        assert!(FeatureSchema::V2.sentinel().is_nan());
    }

    #[test]
    fn test_vector_length_checked() {
        let err = FeatureVector::new(FeatureSchema::V1, vec![0.0; 17]).unwrap_err();
        assert!(matches!(
            err,
            Error::FeatureLength {
                expected: 13,
                found: 17
            }
        ));
    }

    #[test]
    fn test_deserialize_checks_length() {
        let short = serde_json::from_str::<FeatureVector>(r#"{"schema":"v1","values":[1.0]}"#);
        assert!(short.is_err());

        let json = serde_json::to_string(&FeatureVector::new(FeatureSchema::V1, vec![0.5; 13]).unwrap())
            .unwrap();
        let v: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(v.get("imageAvgProportion"), Some(0.5));
    }

    #[test]
    fn test_ensure_schema() {
        let v = FeatureVector::new(FeatureSchema::V1, vec![0.0; 13]).unwrap();
        assert!(v.ensure_schema(FeatureSchema::V1).is_ok());
        assert!(matches!(
            v.ensure_schema(FeatureSchema::V2),
            Err(Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_schema_from_str() {
        assert_eq!("V1".parse::<FeatureSchema>().unwrap(), FeatureSchema::V1);
        assert_eq!("v2".parse::<FeatureSchema>().unwrap(), FeatureSchema::V2);
        assert!("v3".parse::<FeatureSchema>().is_err());
    }
}
