//! Product template records and the template catalog.
//!
//! A template fixes the real-world geometry of a product: its physical size,
//! the editing canvas it is designed on, the zones where content may go, the
//! decorative slots, and the material base band.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{CatalogError, ReferenceKind};
use crate::geometry::Rect;

/// Slack allowed when checking that template rectangles fit the extent.
const EXTENT_TOLERANCE: f64 = 1e-6;

/// Region of a template where user content may be placed (inches).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditZone {
    pub id: String,
    pub rect: Rect,
}

/// Template-fixed placeholder for ornamental artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorativeSlot {
    pub id: String,
    pub image_ref: String,
    pub rect: Rect,
}

/// Material base band at the foot of the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRegion {
    pub rect: Rect,
    pub material_id: String,
}

/// Product template record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Physical width in inches
    pub real_world_width: f64,
    /// Physical height in inches
    pub real_world_height: f64,
    /// Editing canvas width in pixels
    pub canvas_width: f64,
    /// Editing canvas height in pixels
    pub canvas_height: f64,
    #[serde(default)]
    pub edit_zones: Vec<EditZone>,
    #[serde(default)]
    pub decorative_slots: Vec<DecorativeSlot>,
    #[serde(default)]
    pub base_regions: Vec<BaseRegion>,
    #[serde(default)]
    pub available_materials: Vec<String>,
    pub default_material_id: String,
}

impl Template {
    /// Whether `material_id` may be selected for documents on this template
    pub fn permits_material(&self, material_id: &str) -> bool {
        self.available_materials.iter().any(|m| m == material_id)
    }

    /// True when all four dimensions are finite and positive
    pub fn has_positive_dimensions(&self) -> bool {
        [
            self.real_world_width,
            self.real_world_height,
            self.canvas_width,
            self.canvas_height,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }

    /// Check the record's geometry invariants.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidTemplate {
            id: self.id.clone(),
            reason,
        };

        if !self.has_positive_dimensions() {
            return Err(invalid(format!(
                "dimensions must be positive (real {}x{} in, canvas {}x{} px)",
                self.real_world_width,
                self.real_world_height,
                self.canvas_width,
                self.canvas_height
            )));
        }

        let (w, h) = (self.real_world_width, self.real_world_height);
        let rects = self
            .edit_zones
            .iter()
            .map(|z| (format!("edit zone '{}'", z.id), z.rect))
            .chain(
                self.decorative_slots
                    .iter()
                    .map(|s| (format!("decorative slot '{}'", s.id), s.rect)),
            )
            .chain(
                self.base_regions
                    .iter()
                    .enumerate()
                    .map(|(i, b)| (format!("base region {}", i), b.rect)),
            );
        for (label, rect) in rects {
            if !rect.within_extent(w, h, EXTENT_TOLERANCE) {
                return Err(invalid(format!("{} lies outside the {}x{} in extent", label, w, h)));
            }
        }

        if !self.permits_material(&self.default_material_id) {
            return Err(invalid(format!(
                "default material '{}' is not in the permitted set",
                self.default_material_id
            )));
        }

        Ok(())
    }
}

/// Read-only template repository
pub trait TemplateCatalog: Send + Sync {
    /// Get a template by id
    fn get_by_id(&self, id: &str) -> Option<&Template>;

    /// Get every template in a category, in catalog order
    fn list_by_category(&self, category: &str) -> Vec<&Template>;
}

/// In-memory template catalog loaded once from records.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
    index: HashMap<String, usize>,
}

impl TemplateLibrary {
    /// Build a catalog, validating every record.
    pub fn from_records(records: Vec<Template>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, template) in records.iter().enumerate() {
            template.validate()?;
            if index.insert(template.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateEntry {
                    kind: ReferenceKind::Template,
                    key: template.id.clone(),
                });
            }
        }
        debug!("Loaded {} templates", records.len());
        Ok(Self {
            templates: records,
            index,
        })
    }

    /// Parse a JSON array of template records
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<Template> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse {
                kind: ReferenceKind::Template,
                reason: e.to_string(),
            })?;
        Self::from_records(records)
    }

    /// Load a JSON array of template records from disk
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }
}

impl TemplateCatalog for TemplateLibrary {
    fn get_by_id(&self, id: &str) -> Option<&Template> {
        self.index.get(id).map(|&i| &self.templates[i])
    }

    fn list_by_category(&self, category: &str) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }
}
