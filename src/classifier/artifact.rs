//! Persisted models.
//!
//! An artifact is gzip-compressed JSON holding the trained boosters together
//! with the schema and hyperparameters they were trained with.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FeatureSchema;

use super::booster::{BoosterOptions, GbdtModel};
use super::{BlockClassifier, MulticlassModel};

/// Current artifact layout version.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A trained model with its provenance.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema: FeatureSchema,
    pub options: BoosterOptions,
    pub trained_at: DateTime<Utc>,
    /// Number of training samples
    pub samples: usize,
    pub model: GbdtModel,
}

impl ModelArtifact {
    /// Wrap a freshly trained model.
    pub fn new(model: GbdtModel, options: BoosterOptions, samples: usize) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            schema: model.schema(),
            options,
            trained_at: Utc::now(),
            samples,
            model,
        }
    }

    /// Write the compressed artifact.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer(&mut encoder, self)?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    /// Write the artifact to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file))?;
        log::info!("Saved {} model to {}", self.schema, path.display());
        Ok(())
    }

    /// Read a compressed artifact and check it is self-consistent.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let artifact: Self = serde_json::from_reader(GzDecoder::new(reader))?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(Error::ModelFormat(format!(
                "unsupported artifact version {}",
                artifact.format_version
            )));
        }
        if artifact.model.schema() != artifact.schema {
            return Err(Error::ModelFormat(format!(
                "artifact declares {} but its model was trained on {}",
                artifact.schema,
                artifact.model.schema()
            )));
        }
        Ok(artifact)
    }

    /// Read an artifact from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let artifact = Self::read(BufReader::new(File::open(path)?))?;
        log::info!(
            "Loaded {} model trained on {} samples at {}",
            artifact.schema,
            artifact.samples,
            artifact.trained_at
        );
        Ok(artifact)
    }

    /// Fail unless the artifact was trained on `expected`.
    pub fn ensure_schema(&self, expected: FeatureSchema) -> Result<()> {
        if self.schema != expected {
            return Err(Error::SchemaMismatch {
                expected,
                found: self.schema,
            });
        }
        Ok(())
    }

    /// Classifier over the stored model.
    pub fn into_classifier(self) -> BlockClassifier<GbdtModel> {
        BlockClassifier::new(self.model)
    }
}
