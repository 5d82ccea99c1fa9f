//! Error handling for MarkerKit
//!
//! Provides error types for every layer of the composition pipeline:
//! - Catalog errors (loading and looking up templates, fonts, materials)
//! - Document errors (edits against the document lifecycle)
//! - Export errors (vector and proof generation)
//!
//! Non-fatal export conditions are reported as [`ExportWarning`] values
//! attached to a successful result instead of as errors.
//!
//! All error types use `thiserror` for ergonomic error handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of catalog entry a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// Product template
    Template,
    /// Material/finish
    Material,
    /// Typeface
    Font,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::Material => write!(f, "material"),
            Self::Font => write!(f, "font"),
        }
    }
}

/// Catalog error type
///
/// Raised while loading a catalog snapshot. Lookups themselves return
/// `Option` and never fail.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Two entries share the same key
    #[error("Duplicate {kind} entry: {key}")]
    DuplicateEntry {
        /// The kind of catalog.
        kind: ReferenceKind,
        /// The duplicated id or family name.
        key: String,
    },

    /// A template record violates its geometry invariants
    #[error("Invalid template '{id}': {reason}")]
    InvalidTemplate {
        /// The offending template id.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The catalog file could not be parsed
    #[error("Failed to parse {kind} catalog: {reason}")]
    Parse {
        /// The kind of catalog.
        kind: ReferenceKind,
        /// The parser message.
        reason: String,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document error type
///
/// Represents rejected edits to a design document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The document's status forbids the requested operation
    #[error("Cannot {operation} a document in status '{status}'")]
    InvalidState {
        /// The current status name.
        status: String,
        /// The attempted operation.
        operation: String,
    },

    /// Requested status change goes backwards or skips the lifecycle
    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// The current status name.
        from: String,
        /// The requested status name.
        to: String,
    },

    /// Material is not offered by the document's template
    #[error("Material '{material_id}' is not permitted by template '{template_id}'")]
    MaterialNotPermitted {
        /// The requested material id.
        material_id: String,
        /// The template id.
        template_id: String,
    },

    /// Document was paired with a template other than the one it references
    #[error("Document references template '{expected}', got '{actual}'")]
    TemplateMismatch {
        /// The template id stored on the document.
        expected: String,
        /// The template id supplied.
        actual: String,
    },

    /// Element index is past the end of the sequence
    #[error("Element index {index} out of range (len {len})")]
    ElementIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The sequence length.
        len: usize,
    },

    /// A referenced catalog entry does not exist
    #[error("Unknown {kind} reference: {id}")]
    InvalidReference {
        /// The kind of entry.
        kind: ReferenceKind,
        /// The missing id.
        id: String,
    },
}

/// Export error type
///
/// Represents fatal export failures. Nothing partial is returned when one
/// of these occurs.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A template, material, or font reference was not found
    #[error("Unknown {kind} reference: {id}")]
    InvalidReference {
        /// The kind of entry.
        kind: ReferenceKind,
        /// The missing id.
        id: String,
    },

    /// The rasterization collaborator failed to produce a bitmap
    #[error("Capture failed: {reason}")]
    CaptureFailure {
        /// The collaborator's message.
        reason: String,
    },

    /// Zero-area bitmap or non-positive template dimensions
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// What is wrong with the geometry.
        reason: String,
    },

    /// The output document could not be encoded
    #[error("Encoding failed: {reason}")]
    Encoding {
        /// The encoder's message.
        reason: String,
    },

    /// The document failed validation
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ExportError {
    /// Convenience constructor for geometry failures
    pub fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

/// Non-fatal condition recorded during an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportWarning {
    /// Font family missing from the catalog; the fallback family was used
    UnresolvedFont {
        /// Family requested by the element.
        requested: String,
        /// Family used instead.
        fallback: String,
    },
    /// Family resolved but its outline source could not be loaded
    OutlineUnavailable {
        /// Family whose outlines are missing.
        family: String,
        /// Loader message.
        reason: String,
    },
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedFont {
                requested,
                fallback,
            } => write!(f, "Font '{}' not found, using '{}'", requested, fallback),
            Self::OutlineUnavailable { family, reason } => {
                write!(f, "No outlines for font '{}': {}", family, reason)
            }
        }
    }
}

/// Main error type for MarkerKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a missing-reference error from any layer
    pub fn is_invalid_reference(&self) -> bool {
        matches!(
            self,
            Error::Export(ExportError::InvalidReference { .. })
                | Error::Export(ExportError::Document(DocumentError::InvalidReference { .. }))
                | Error::Document(DocumentError::InvalidReference { .. })
        )
    }

    /// Check if this is a lifecycle violation from any layer
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Error::Document(DocumentError::InvalidState { .. })
                | Error::Export(ExportError::Document(DocumentError::InvalidState { .. }))
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
