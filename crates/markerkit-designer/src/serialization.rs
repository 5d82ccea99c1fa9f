//! Save and load design documents.
//!
//! Documents are stored as pretty-printed JSON wrapped in a [`DocumentFile`]
//! carrying the file format version.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::document::DesignDocument;

/// Document file format version
pub const FILE_FORMAT_VERSION: &str = "1.0";

/// On-disk document structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    pub version: String,
    pub document: DesignDocument,
}

impl DocumentFile {
    pub fn new(document: DesignDocument) -> Self {
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            document,
        }
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize document")
    }

    /// Parse from a JSON string, rejecting unknown major versions
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DocumentFile = serde_json::from_str(json).context("Failed to parse document file")?;
        let major = |v: &str| v.split('.').next().unwrap_or_default().to_string();
        if major(&file.version) != major(FILE_FORMAT_VERSION) {
            bail!(
                "Unsupported document file version {} (expected {})",
                file.version,
                FILE_FORMAT_VERSION
            );
        }
        Ok(file)
    }

    /// Save document to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).context("Failed to write document file")?;
        tracing::debug!("Saved document {} to {}", self.document.id(), path.as_ref().display());
        Ok(())
    }

    /// Load document from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read document file")?;
        Self::from_json(&content)
    }
}

/// Save `document` to `path`
pub fn save_document(document: &DesignDocument, path: impl AsRef<Path>) -> Result<()> {
    DocumentFile::new(document.clone()).save_to_file(path)
}

/// Load the document stored at `path`
pub fn load_document(path: impl AsRef<Path>) -> Result<DesignDocument> {
    Ok(DocumentFile::load_from_file(path)?.document)
}
