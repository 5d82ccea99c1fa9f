//! Font resolution for an export.
//!
//! Every family used by a document is resolved once, up front, into a
//! [`FontResolution`] map owned by that export. There is no process-wide
//! font cache.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::Font as FontFace;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use markerkit_core::{ExportWarning, Font, FontCatalog};
use markerkit_settings::ExportSettings;

use crate::document::DesignElement;

/// Loads outline sources for catalog fonts.
///
/// Sources are looked up in `font_directory` by the catalog's file name.
/// When a system database is attached, a failed file lookup falls back to
/// an installed face with the same family name.
#[derive(Debug)]
pub struct FontSourceLoader {
    font_directory: PathBuf,
    system: Option<Database>,
}

impl FontSourceLoader {
    pub fn new(font_directory: impl Into<PathBuf>) -> Self {
        Self {
            font_directory: font_directory.into(),
            system: None,
        }
    }

    /// Builds a loader from export settings, scanning system fonts if enabled.
    pub fn from_settings(settings: &ExportSettings) -> Self {
        let loader = Self::new(&settings.font_directory);
        if settings.use_system_fonts {
            loader.with_system_fonts()
        } else {
            loader
        }
    }

    pub fn with_system_fonts(mut self) -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} system font faces", db.len());
        self.system = Some(db);
        self
    }

    /// Uses a prepared font database instead of scanning the system.
    pub fn with_database(mut self, db: Database) -> Self {
        self.system = Some(db);
        self
    }

    pub fn font_directory(&self) -> &Path {
        &self.font_directory
    }

    /// Loads the outline face for a catalog font.
    pub fn load(&self, font: &Font) -> Result<FontFace<'static>, String> {
        let path = self.font_directory.join(&font.source_file);
        let file_error = match fs::read(&path) {
            Ok(bytes) => match FontFace::try_from_vec(bytes) {
                Some(face) => return Ok(face),
                None => format!("{} is not a readable font", path.display()),
            },
            Err(e) => format!("{}: {}", path.display(), e),
        };

        if let Some(face) = self.load_from_system(&font.family) {
            tracing::debug!("Using system face for '{}'", font.family);
            return Ok(face);
        }

        Err(file_error)
    }

    fn load_from_system(&self, family: &str) -> Option<FontFace<'static>> {
        let db = self.system.as_ref()?;
        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };

        let id = db.query(&query)?;
        let face = db.face(id)?;
        match &face.source {
            fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => {
                let bytes = fs::read(path).ok()?;
                FontFace::try_from_vec(bytes)
            }
            fontdb::Source::Binary(bytes) => {
                FontFace::try_from_vec(bytes.as_ref().as_ref().to_vec())
            }
        }
    }
}

/// The font chosen for one requested family.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Family named by the element
    pub requested: String,
    /// Catalog family actually used
    pub family: String,
    /// Catalog id, `None` when neither the family nor the fallback exists
    pub font_id: Option<String>,
    /// Outline face, `None` when the source could not be loaded
    pub face: Option<Arc<FontFace<'static>>>,
}

impl ResolvedFont {
    pub fn is_fallback(&self) -> bool {
        self.requested != self.family
    }

    pub fn has_outlines(&self) -> bool {
        self.face.is_some()
    }
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("requested", &self.requested)
            .field("family", &self.family)
            .field("font_id", &self.font_id)
            .field("has_outlines", &self.face.is_some())
            .finish()
    }
}

/// Per-export map from requested family to resolved font.
#[derive(Debug, Default, Clone)]
pub struct FontResolution {
    fonts: BTreeMap<String, ResolvedFont>,
    warnings: Vec<ExportWarning>,
}

impl FontResolution {
    pub fn get(&self, requested: &str) -> Option<&ResolvedFont> {
        self.fonts.get(requested)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Warnings in the order their families first appear in the document.
    pub fn warnings(&self) -> &[ExportWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ExportWarning> {
        self.warnings
    }
}

/// Resolves every font family referenced by `elements`.
///
/// A family missing from the catalog falls back to `default_family` and
/// records `UnresolvedFont`. A family whose outline source cannot be loaded
/// records `OutlineUnavailable`; its text is still exported without glyphs.
pub fn resolve_fonts(
    elements: &[DesignElement],
    catalog: &dyn FontCatalog,
    loader: &FontSourceLoader,
    default_family: &str,
) -> FontResolution {
    let mut resolution = FontResolution::default();
    // Faces are shared when several requested families land on the same source.
    let mut faces: BTreeMap<String, Result<Arc<FontFace<'static>>, String>> = BTreeMap::new();

    for element in elements {
        let Some(text) = element.as_text() else {
            continue;
        };
        if resolution.fonts.contains_key(&text.font_family) {
            continue;
        }

        let requested = text.font_family.clone();
        let entry = match catalog.get_by_family(&requested) {
            Some(font) => Some(font),
            None => {
                tracing::warn!(
                    "Font family '{}' not in catalog, falling back to '{}'",
                    requested,
                    default_family
                );
                resolution.warnings.push(ExportWarning::UnresolvedFont {
                    requested: requested.clone(),
                    fallback: default_family.to_string(),
                });
                catalog.get_by_family(default_family)
            }
        };

        let resolved = match entry {
            Some(font) => {
                let face = faces
                    .entry(font.id.clone())
                    .or_insert_with(|| loader.load(font).map(Arc::new))
                    .clone();
                let face = match face {
                    Ok(face) => Some(face),
                    Err(reason) => {
                        tracing::warn!("No outlines for '{}': {}", font.family, reason);
                        resolution.warnings.push(ExportWarning::OutlineUnavailable {
                            family: font.family.clone(),
                            reason,
                        });
                        None
                    }
                };
                ResolvedFont {
                    requested: requested.clone(),
                    family: font.family.clone(),
                    font_id: Some(font.id.clone()),
                    face,
                }
            }
            None => {
                let reason = format!("default family '{}' is not in the catalog", default_family);
                tracing::warn!("No outlines for '{}': {}", requested, reason);
                resolution.warnings.push(ExportWarning::OutlineUnavailable {
                    family: default_family.to_string(),
                    reason,
                });
                ResolvedFont {
                    requested: requested.clone(),
                    family: default_family.to_string(),
                    font_id: None,
                    face: None,
                }
            }
        };

        resolution.fonts.insert(requested, resolved);
    }

    tracing::debug!(
        "Resolved {} font families with {} warnings",
        resolution.fonts.len(),
        resolution.warnings.len()
    );
    resolution
}
