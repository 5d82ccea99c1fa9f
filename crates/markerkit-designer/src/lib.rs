//! # MarkerKit Designer
//!
//! Composition and export for inscribed markers.
//!
//! - [`document`]: the design document, its elements and lifecycle
//! - [`transform`]: editing pixels to inches
//! - [`font_manager`]: per-export font resolution
//! - [`vector_export`] and [`svg_writer`]: layered vector output in inches
//! - [`proof`]: paginated approval PDF from a raster capture
//! - [`artwork_templates`]: reusable element snapshots
//! - [`serialization`]: document files

pub mod artwork_templates;
pub mod document;
pub mod font_manager;
pub mod proof;
pub mod serialization;
pub mod svg_writer;
pub mod transform;
pub mod vector_export;

pub use artwork_templates::{ArtworkTemplate, ArtworkTemplateLibrary};
pub use document::{
    ArtworkElement, DesignDocument, DesignElement, DocumentSnapshot, DocumentStatus, ElementKind,
    TextElement,
};
pub use font_manager::{resolve_fonts, FontResolution, FontSourceLoader, ResolvedFont};
pub use proof::{
    paginate, CaptureError, ProofDocument, ProofLayout, ProofPage, ProofRenderer, RasterCapture,
};
pub use serialization::{load_document, save_document, DocumentFile};
pub use transform::CoordinateTransform;
pub use vector_export::{
    LayerKind, PathCommand, Placement, TextRun, VectorDocument, VectorEntity, VectorExport,
    VectorExporter, VectorLayer,
};
