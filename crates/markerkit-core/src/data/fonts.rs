//! Typeface catalog.
//!
//! Stored documents reference fonts by family name, so the family is the
//! primary lookup key. Ids exist for administrative tooling.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{CatalogError, ReferenceKind};

/// Typeface record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub id: String,
    pub family: String,
    pub category: String,
    /// Outline source file name, resolved against the configured font directory
    pub source_file: String,
}

/// Read-only font repository
pub trait FontCatalog: Send + Sync {
    /// Get a font by id
    fn get_by_id(&self, id: &str) -> Option<&Font>;

    /// Get a font by family name
    fn get_by_family(&self, family: &str) -> Option<&Font>;

    /// Get every font in a category, in catalog order
    fn list_by_category(&self, category: &str) -> Vec<&Font>;
}

/// In-memory font catalog
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    fonts: Vec<Font>,
    by_id: HashMap<String, usize>,
    by_family: HashMap<String, usize>,
    // lowercase family -> index
    by_family_folded: HashMap<String, usize>,
}

impl FontLibrary {
    pub fn from_records(records: Vec<Font>) -> Result<Self, CatalogError> {
        let mut lib = Self::default();
        for (i, font) in records.iter().enumerate() {
            if lib.by_id.insert(font.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateEntry {
                    kind: ReferenceKind::Font,
                    key: font.id.clone(),
                });
            }
            if lib.by_family.insert(font.family.clone(), i).is_some() {
                return Err(CatalogError::DuplicateEntry {
                    kind: ReferenceKind::Font,
                    key: font.family.clone(),
                });
            }
            lib.by_family_folded
                .entry(font.family.to_lowercase())
                .or_insert(i);
        }
        debug!("Loaded {} fonts", records.len());
        lib.fonts = records;
        Ok(lib)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<Font> = serde_json::from_str(json).map_err(|e| CatalogError::Parse {
            kind: ReferenceKind::Font,
            reason: e.to_string(),
        })?;
        Self::from_records(records)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// All family names, sorted
    pub fn families(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.fonts.iter().map(|f| f.family.as_str()).collect();
        out.sort_unstable();
        out
    }
}

impl FontCatalog for FontLibrary {
    fn get_by_id(&self, id: &str) -> Option<&Font> {
        self.by_id.get(id).map(|&i| &self.fonts[i])
    }

    /// Exact match first, then a case-insensitive match for older documents.
    fn get_by_family(&self, family: &str) -> Option<&Font> {
        self.by_family
            .get(family)
            .or_else(|| self.by_family_folded.get(&family.to_lowercase()))
            .map(|&i| &self.fonts[i])
    }

    fn list_by_category(&self, category: &str) -> Vec<&Font> {
        self.fonts.iter().filter(|f| f.category == category).collect()
    }
}
