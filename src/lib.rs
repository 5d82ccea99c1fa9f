//! # MarkerKit
//!
//! Compose inscribed memorial markers from product templates and export
//! them as scale-accurate vector files and paginated approval proofs.
//!
//! ## Architecture
//!
//! 1. **markerkit-core** - Errors, units, geometry, template/font/material catalogs
//! 2. **markerkit-designer** - Documents, coordinate transform, vector export, proofs
//! 3. **markerkit-settings** - Export configuration
//! 4. **markerkit** - This facade and the command-line exporter

use std::path::Path;
use std::sync::Arc;

pub use markerkit_core as core;
pub use markerkit_designer as designer;
pub use markerkit_settings as settings;

pub use markerkit_core::{
    Catalogs, DocumentError, Error, ExportError, ExportWarning, Font, FontLibrary, Material,
    MaterialLibrary, Point, Rect, Result, Template, TemplateLibrary,
};

pub use markerkit_designer::{
    ArtworkElement, ArtworkTemplate, ArtworkTemplateLibrary, CoordinateTransform, DesignDocument,
    DesignElement, DocumentStatus, LayerKind, ProofRenderer, RasterCapture, TextElement,
    VectorExport, VectorExporter,
};

pub use markerkit_settings::{ExportSettings, ProofSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog file names inside a catalog directory
pub const TEMPLATES_FILE: &str = "templates.json";
pub const FONTS_FILE: &str = "fonts.json";
pub const MATERIALS_FILE: &str = "materials.json";

/// Load the three catalogs from `dir`.
pub fn load_catalogs(dir: &Path) -> Result<Catalogs> {
    let templates = TemplateLibrary::load_from_file(&dir.join(TEMPLATES_FILE))?;
    let fonts = FontLibrary::load_from_file(&dir.join(FONTS_FILE))?;
    let materials = MaterialLibrary::load_from_file(&dir.join(MATERIALS_FILE))?;
    tracing::info!(
        "Loaded catalogs from {}: {} templates, {} fonts, {} materials",
        dir.display(),
        templates.len(),
        fonts.len(),
        materials.len()
    );
    Ok(Catalogs::new(
        Arc::new(templates),
        Arc::new(fonts),
        Arc::new(materials),
    ))
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(())
}
