//! Feature tables and error reports on disk.
//!
//! A feature table is a CSV file whose header is exactly the schema's
//! columns followed by `label`; the label is the numeric category id.
//! Undefined values are written as `NaN`.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::features::{FeatureSchema, FeatureVector, LabeledSample};
use crate::model::BlockCategory;

/// Labeled rows of one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub schema: FeatureSchema,
    pub samples: Vec<LabeledSample>,
}

impl FeatureTable {
    /// Create a table, checking that every row belongs to `schema`.
    pub fn new(schema: FeatureSchema, samples: Vec<LabeledSample>) -> Result<Self> {
        for sample in &samples {
            sample.features.ensure_schema(schema)?;
        }
        Ok(Self { schema, samples })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Fail unless the table was written under `expected`.
    pub fn ensure_schema(&self, expected: FeatureSchema) -> Result<()> {
        if self.schema != expected {
            return Err(Error::SchemaMismatch {
                expected,
                found: self.schema,
            });
        }
        Ok(())
    }

    /// Write the table as CSV.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.schema.header())?;
        for sample in &self.samples {
            let record = sample
                .features
                .values()
                .iter()
                .map(|v| v.to_string())
                .chain(std::iter::once(sample.category.id().to_string()));
            csv.write_record(record)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the table to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file))?;
        log::info!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a CSV table, detecting the schema from its header.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::Reader::from_reader(reader);
        let header: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
        let schema = [FeatureSchema::V1, FeatureSchema::V2]
            .into_iter()
            .find(|s| s.header() == header)
            .ok_or_else(|| Error::InvalidHeader(header.join(",")))?;

        let width = schema.feature_count();
        let mut samples = Vec::new();
        for record in csv.records() {
            let record = record?;
            if record.len() != width + 1 {
                return Err(Error::FeatureLength {
                    expected: width,
                    found: record.len().saturating_sub(1),
                });
            }
            let values = record
                .iter()
                .take(width)
                .map(|field| {
                    field
                        .trim()
                        .parse::<f32>()
                        .map_err(|_| Error::Other(format!("Invalid feature value: {}", field)))
                })
                .collect::<Result<Vec<f32>>>()?;
            let label = &record[width];
            let category = label
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(BlockCategory::from_id)
                .ok_or_else(|| Error::InvalidLabel(label.to_string()))?;
            samples.push(LabeledSample::new(
                FeatureVector::new(schema, values)?,
                category,
            ));
        }

        Ok(Self { schema, samples })
    }

    /// Read a table from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let table = Self::read(File::open(path)?)?;
        log::info!(
            "Loaded {} {} rows from {}",
            table.len(),
            table.schema,
            path.display()
        );
        Ok(table)
    }
}

/// Write rejected document ids, one per line.
pub fn write_error_report<W, S>(mut writer: W, ids: &[S]) -> io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for id in ids {
        writeln!(writer, "{}", id.as_ref())?;
    }
    writer.flush()
}

/// Write the error report to a file.
pub fn save_error_report<S: AsRef<str>>(path: &Path, ids: &[S]) -> Result<()> {
    let file = File::create(path)?;
    write_error_report(BufWriter::new(file), ids)?;
    Ok(())
}
