//! Materials catalog
//!
//! Finish and texture records a document can select. Entries are immutable
//! once any approved document references them, so the catalog exposes no
//! mutation API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{CatalogError, ReferenceKind};

/// Material/finish record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    pub texture_ref: String,
    pub swatch_ref: String,
}

/// Read-only material repository
pub trait MaterialCatalog: Send + Sync {
    /// Get a material by id
    fn get_by_id(&self, id: &str) -> Option<&Material>;

    /// Get all materials, in catalog order
    fn list_all(&self) -> Vec<&Material>;
}

/// In-memory materials catalog
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    index: HashMap<String, usize>,
}

impl MaterialLibrary {
    pub fn from_records(records: Vec<Material>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, material) in records.iter().enumerate() {
            if index.insert(material.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateEntry {
                    kind: ReferenceKind::Material,
                    key: material.id.clone(),
                });
            }
        }
        debug!("Loaded {} materials", records.len());
        Ok(Self {
            materials: records,
            index,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<Material> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse {
                kind: ReferenceKind::Material,
                reason: e.to_string(),
            })?;
        Self::from_records(records)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Search materials by name (partial match, case-insensitive)
    pub fn search_by_name(&self, query: &str) -> Vec<&Material> {
        let query_lower = query.to_lowercase();
        self.materials
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&query_lower))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialCatalog for MaterialLibrary {
    fn get_by_id(&self, id: &str) -> Option<&Material> {
        self.index.get(id).map(|&i| &self.materials[i])
    }

    fn list_all(&self) -> Vec<&Material> {
        self.materials.iter().collect()
    }
}
