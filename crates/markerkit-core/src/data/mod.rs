//! Catalog data: templates, fonts, and materials.
//!
//! Catalogs are read-only repositories behind traits so that callers can
//! inject test doubles or their own storage. The in-memory libraries here
//! are loaded once and never mutated afterwards.

pub mod fonts;
pub mod materials;
pub mod templates;

use std::sync::Arc;

pub use fonts::{Font, FontCatalog, FontLibrary};
pub use materials::{Material, MaterialCatalog, MaterialLibrary};
pub use templates::{BaseRegion, DecorativeSlot, EditZone, Template, TemplateCatalog, TemplateLibrary};

/// The set of catalogs consulted by validation and export.
#[derive(Clone)]
pub struct Catalogs {
    pub templates: Arc<dyn TemplateCatalog>,
    pub fonts: Arc<dyn FontCatalog>,
    pub materials: Arc<dyn MaterialCatalog>,
}

impl Catalogs {
    pub fn new(
        templates: Arc<dyn TemplateCatalog>,
        fonts: Arc<dyn FontCatalog>,
        materials: Arc<dyn MaterialCatalog>,
    ) -> Self {
        Self {
            templates,
            fonts,
            materials,
        }
    }
}

impl std::fmt::Debug for Catalogs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalogs").finish_non_exhaustive()
    }
}
