//! Corpus discovery.
//!
//! A corpus directory holds parsed document dumps next to their ground-truth
//! files. Ground truth for page `i` (0-based) of `report.json` lives in
//! `report_0000i.xml`, five digits wide.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Error, Result};
use crate::source::DocumentSource;

/// Ground-truth file name for a document stem and 0-based page index.
pub fn ground_truth_file_name(stem: &str, page_index: u32) -> String {
    format!("{}_{:05}.xml", stem, page_index)
}

/// One ground-truth file of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthFile {
    /// Location of the file
    pub path: PathBuf,
    /// Page part of the file name, unparsed
    pub page_label: String,
}

impl GroundTruthFile {
    /// The 0-based page index encoded in the file name.
    pub fn page_index(&self) -> Result<u32> {
        if self.page_label.is_empty() || !self.page_label.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPageIndex(self.file_name()));
        }
        self.page_label
            .parse()
            .map_err(|_| Error::InvalidPageIndex(self.file_name()))
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A document with its ground truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    /// Document identifier used in reports (the file name)
    pub id: String,
    /// Location of the document
    pub path: PathBuf,
    /// Ground-truth files, ordered by name
    pub ground_truth: Vec<GroundTruthFile>,
}

/// Documents of a data directory, ordered by file name.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// Scan `root` (not recursively) for documents `source` can read.
    pub fn discover(root: &Path, source: &dyn DocumentSource) -> Result<Self> {
        let pattern = Regex::new(r"^(?P<stem>.+)_(?P<page>[^_]+)\.xml$")
            .map_err(|e| Error::Other(e.to_string()))?;

        let mut documents: Vec<PathBuf> = Vec::new();
        let mut annotations: HashMap<String, Vec<GroundTruthFile>> = HashMap::new();

        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if let Some(caps) = pattern.captures(name) {
                annotations
                    .entry(caps["stem"].to_string())
                    .or_default()
                    .push(GroundTruthFile {
                        page_label: caps["page"].to_string(),
                        path: path.clone(),
                    });
            } else if source.supports_path(&path) {
                documents.push(path);
            }
        }

        documents.sort();

        let entries = documents
            .into_iter()
            .filter_map(|path| {
                let id = path.file_name()?.to_str()?.to_string();
                let stem = path.file_stem()?.to_str()?.to_string();
                let mut ground_truth = annotations.remove(&stem).unwrap_or_default();
                ground_truth.sort_by(|a, b| a.path.cmp(&b.path));
                Some(CorpusEntry {
                    id,
                    path,
                    ground_truth,
                })
            })
            .collect::<Vec<_>>();

        log::info!(
            "Discovered {} documents in {}",
            entries.len(),
            root.display()
        );

        Ok(Self { entries })
    }

    /// Build a corpus from explicit entries.
    pub fn from_entries(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// All entries.
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the corpus has no documents.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
