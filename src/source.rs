//! Document sources.
//!
//! Parsing PDF content streams is left to an external parser; what this crate
//! consumes is its output, a [`Document`] with glyphs, paths, images and the
//! outline. A [`DocumentSource`] turns a file into that model. The bundled
//! [`JsonDocumentSource`] reads the parser's JSON page dump.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Document;

/// Loads parsed documents from files.
///
/// Implement this trait to plug in another parser or dump format.
pub trait DocumentSource: Send + Sync {
    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this source.
    fn name(&self) -> &str;

    /// Load the document at `path`.
    fn load(&self, path: &Path) -> Result<Document>;

    /// Load a document from bytes; `name` identifies it in reports.
    fn load_bytes(&self, bytes: &[u8], name: &str) -> Result<Document>;

    /// Check if this source reads files with the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }

    /// Check if this source reads the given file.
    fn supports_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.supports_extension(e))
    }
}

/// Reads documents from JSON dumps of the [`Document`] model.
#[derive(Debug, Clone, Default)]
pub struct JsonDocumentSource {
    _private: (),
}

impl JsonDocumentSource {
    /// Create a new JSON source.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentSource for JsonDocumentSource {
    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "json"
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Other(format!("Invalid file name: {}", path.display())))?;
        self.load_bytes(&bytes, name)
    }

    fn load_bytes(&self, bytes: &[u8], name: &str) -> Result<Document> {
        let mut document: Document = serde_json::from_slice(bytes)?;
        if document.name.is_empty() {
            document.name = name.to_string();
        }
        log::debug!(
            "Loaded '{}' ({} pages, {} bookmarks)",
            document.name,
            document.page_count(),
            document.bookmarks().len()
        );
        Ok(document)
    }
}
