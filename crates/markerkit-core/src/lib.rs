//! # MarkerKit Core
//!
//! Core types, catalogs, and utilities for MarkerKit.
//! Provides the error taxonomy, unit conversions, shared geometry, and the
//! read-only template, font, and material repositories.

pub mod data;
pub mod error;
pub mod geometry;
pub mod units;

pub use data::{
    BaseRegion, Catalogs, DecorativeSlot, EditZone, Font, FontCatalog, FontLibrary, Material,
    MaterialCatalog, MaterialLibrary, Template, TemplateCatalog, TemplateLibrary,
};

pub use error::{
    CatalogError, DocumentError, Error, ExportError, ExportWarning, ReferenceKind, Result,
};

pub use geometry::{Point, Rect};
