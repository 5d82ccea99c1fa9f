//! Design document: one template, one material, and an ordered sequence of
//! design elements.
//!
//! The element sequence is the z-order and the export order. A document
//! holds only the id of its template; templates and catalogs are shared and
//! read-only.
//!
//! Lifecycle: `draft -> in_progress -> completed -> approved`. Transitions
//! only move forward. Once approved, the element sequence and the material
//! selection are frozen and every edit is rejected with `InvalidState`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use markerkit_core::{
    Catalogs, DocumentError, Material, Point, Rect, ReferenceKind, Template,
};

use crate::transform::CoordinateTransform;

/// Document lifecycle status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Approved,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Approved => "approved",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }

    /// The status that follows this one, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => Some(Self::Approved),
            Self::Approved => None,
        }
    }

    /// Approved documents are immutable
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text bound to a named typeface, in real-world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub content: String,
    pub font_family: String,
    /// Em size in inches
    pub size: f64,
    /// Top-left of the text box in inches
    pub position: Point,
    /// Clockwise rotation in degrees about `position`
    #[serde(default)]
    pub rotation: f64,
}

impl TextElement {
    pub fn new(
        content: impl Into<String>,
        font_family: impl Into<String>,
        size: f64,
        position: Point,
    ) -> Self {
        Self {
            content: content.into(),
            font_family: font_family.into(),
            size,
            position,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Builds a text element from an editing-space position.
    /// `size` is already in inches.
    pub fn from_editing(
        transform: &CoordinateTransform,
        content: impl Into<String>,
        font_family: impl Into<String>,
        size: f64,
        editing_position: Point,
    ) -> Self {
        Self::new(
            content,
            font_family,
            size,
            transform.point_to_real(editing_position),
        )
    }
}

/// Placed artwork image, in real-world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkElement {
    pub image_ref: String,
    /// Top-left in inches
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

impl ArtworkElement {
    pub fn new(image_ref: impl Into<String>, rect: Rect) -> Self {
        Self {
            image_ref: image_ref.into(),
            position: rect.origin(),
            width: rect.width,
            height: rect.height,
        }
    }

    /// Builds an artwork element from an editing-space rectangle.
    pub fn from_editing(
        transform: &CoordinateTransform,
        image_ref: impl Into<String>,
        editing_rect: Rect,
    ) -> Self {
        Self::new(image_ref, transform.rect_to_real(editing_rect))
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }
}

/// Kind tag of a design element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Text,
    Artwork,
}

/// A single element of the design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DesignElement {
    Text(TextElement),
    Artwork(ArtworkElement),
}

impl DesignElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Artwork(_) => ElementKind::Artwork,
        }
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Self::Text(t) => Some(t),
            Self::Artwork(_) => None,
        }
    }

    pub fn as_artwork(&self) -> Option<&ArtworkElement> {
        match self {
            Self::Artwork(a) => Some(a),
            Self::Text(_) => None,
        }
    }
}

impl From<TextElement> for DesignElement {
    fn from(t: TextElement) -> Self {
        Self::Text(t)
    }
}

impl From<ArtworkElement> for DesignElement {
    fn from(a: ArtworkElement) -> Self {
        Self::Artwork(a)
    }
}

/// Deep copy of a document taken at the start of an export.
///
/// Exporters read only the snapshot, so the live document may keep
/// accepting edits for later exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub document_id: Uuid,
    pub title: String,
    pub template_id: String,
    pub material_id: String,
    pub status: DocumentStatus,
    pub elements: Vec<DesignElement>,
}

impl DocumentSnapshot {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Checks the snapshot's references against the catalogs.
    pub fn validate<'c>(
        &self,
        catalogs: &'c Catalogs,
    ) -> Result<(&'c Template, &'c Material), DocumentError> {
        validate_references(&self.template_id, &self.material_id, catalogs)
    }
}

fn validate_references<'c>(
    template_id: &str,
    material_id: &str,
    catalogs: &'c Catalogs,
) -> Result<(&'c Template, &'c Material), DocumentError> {
    let template = catalogs.templates.get_by_id(template_id).ok_or_else(|| {
        DocumentError::InvalidReference {
            kind: ReferenceKind::Template,
            id: template_id.to_string(),
        }
    })?;
    let material = catalogs.materials.get_by_id(material_id).ok_or_else(|| {
        DocumentError::InvalidReference {
            kind: ReferenceKind::Material,
            id: material_id.to_string(),
        }
    })?;
    if !template.permits_material(material_id) {
        return Err(DocumentError::MaterialNotPermitted {
            material_id: material_id.to_string(),
            template_id: template_id.to_string(),
        });
    }
    Ok((template, material))
}

/// The mutable composition of one template, one material, and design elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    id: Uuid,
    title: String,
    template_id: String,
    material_id: String,
    #[serde(default)]
    elements: Vec<DesignElement>,
    #[serde(default)]
    status: DocumentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DesignDocument {
    /// Creates a draft document on `template` using its default material.
    pub fn new(template: &Template, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            template_id: template.id.clone(),
            material_id: template.default_material_id.clone(),
            elements: Vec::new(),
            status: DocumentStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn material_id(&self) -> &str {
        &self.material_id
    }

    pub fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&DesignElement> {
        self.elements.get(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the document. Titles are metadata and stay editable after approval.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Selects a material permitted by the document's template.
    pub fn select_material(
        &mut self,
        template: &Template,
        material_id: &str,
    ) -> Result<(), DocumentError> {
        self.ensure_editable("change the material of")?;
        if template.id != self.template_id {
            return Err(DocumentError::TemplateMismatch {
                expected: self.template_id.clone(),
                actual: template.id.clone(),
            });
        }
        if !template.permits_material(material_id) {
            return Err(DocumentError::MaterialNotPermitted {
                material_id: material_id.to_string(),
                template_id: template.id.clone(),
            });
        }
        self.material_id = material_id.to_string();
        self.touch();
        Ok(())
    }

    /// Appends an element on top of the z-order and returns its index.
    pub fn push_element(&mut self, element: impl Into<DesignElement>) -> Result<usize, DocumentError> {
        self.ensure_editable("add elements to")?;
        self.elements.push(element.into());
        self.touch();
        Ok(self.elements.len() - 1)
    }

    /// Inserts an element at `index`; `index == len` appends.
    pub fn insert_element(
        &mut self,
        index: usize,
        element: impl Into<DesignElement>,
    ) -> Result<(), DocumentError> {
        self.ensure_editable("add elements to")?;
        if index > self.elements.len() {
            return Err(self.out_of_range(index));
        }
        self.elements.insert(index, element.into());
        self.touch();
        Ok(())
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn update_element(
        &mut self,
        index: usize,
        element: impl Into<DesignElement>,
    ) -> Result<DesignElement, DocumentError> {
        self.ensure_editable("edit elements of")?;
        let len = self.elements.len();
        let slot = self
            .elements
            .get_mut(index)
            .ok_or(DocumentError::ElementIndexOutOfRange { index, len })?;
        let previous = std::mem::replace(slot, element.into());
        self.touch();
        Ok(previous)
    }

    /// Removes and returns the element at `index`.
    pub fn remove_element(&mut self, index: usize) -> Result<DesignElement, DocumentError> {
        self.ensure_editable("remove elements from")?;
        if index >= self.elements.len() {
            return Err(self.out_of_range(index));
        }
        let removed = self.elements.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Moves the element at `from` so that it ends up at index `to`.
    pub fn move_element(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        self.ensure_editable("reorder elements of")?;
        let len = self.elements.len();
        if from >= len {
            return Err(self.out_of_range(from));
        }
        if to >= len {
            return Err(self.out_of_range(to));
        }
        if from != to {
            let element = self.elements.remove(from);
            self.elements.insert(to, element);
            self.touch();
        }
        Ok(())
    }

    /// Removes every element.
    pub fn clear_elements(&mut self) -> Result<(), DocumentError> {
        self.ensure_editable("clear")?;
        self.elements.clear();
        self.touch();
        Ok(())
    }

    /// Moves the document to `status`.
    ///
    /// Setting the current status again is a no-op. Backward moves are
    /// rejected, and nothing may change once the document is approved.
    pub fn set_status(&mut self, status: DocumentStatus) -> Result<(), DocumentError> {
        if status == self.status {
            return Ok(());
        }
        self.ensure_editable("change the status of")?;
        if status < self.status {
            return Err(DocumentError::InvalidTransition {
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        tracing::debug!("Document {} status {} -> {}", self.id, self.status, status);
        self.status = status;
        self.touch();
        Ok(())
    }

    /// Advances to the next lifecycle status and returns it.
    pub fn advance_status(&mut self) -> Result<DocumentStatus, DocumentError> {
        let next = self.status.next().ok_or_else(|| DocumentError::InvalidState {
            status: self.status.to_string(),
            operation: "advance the status of".to_string(),
        })?;
        self.set_status(next)?;
        Ok(next)
    }

    /// Deep copy of the parts an export reads.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            document_id: self.id,
            title: self.title.clone(),
            template_id: self.template_id.clone(),
            material_id: self.material_id.clone(),
            status: self.status,
            elements: self.elements.clone(),
        }
    }

    /// Resolves the template and material references, failing closed when
    /// either is missing or the material is not permitted.
    pub fn validate<'c>(
        &self,
        catalogs: &'c Catalogs,
    ) -> Result<(&'c Template, &'c Material), DocumentError> {
        validate_references(&self.template_id, &self.material_id, catalogs)
    }

    /// Appends copies of `elements` (used when applying a saved artwork template).
    pub(crate) fn extend_elements(
        &mut self,
        elements: &[DesignElement],
    ) -> Result<std::ops::Range<usize>, DocumentError> {
        self.ensure_editable("add elements to")?;
        let start = self.elements.len();
        self.elements.extend_from_slice(elements);
        self.touch();
        Ok(start..self.elements.len())
    }

    fn ensure_editable(&self, operation: &str) -> Result<(), DocumentError> {
        if self.status.is_locked() {
            return Err(DocumentError::InvalidState {
                status: self.status.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> DocumentError {
        DocumentError::ElementIndexOutOfRange {
            index,
            len: self.elements.len(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
