//! # Artwork Templates
//!
//! An artwork template is a named, reusable snapshot of a document's design
//! elements. It is captured explicitly from a live document, never edited in
//! place, and deleted independently of the documents it was taken from.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use markerkit_core::DocumentError;

use crate::document::{DesignDocument, DesignElement};

/// Captured element snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkTemplate {
    id: String,
    name: String,
    preview_ref: Option<String>,
    /// Template the elements were composed on
    source_template_id: String,
    elements: Vec<DesignElement>,
    created_at: DateTime<Utc>,
}

impl ArtworkTemplate {
    /// Captures a deep copy of `document`'s current elements.
    pub fn capture(
        document: &DesignDocument,
        name: impl Into<String>,
        preview_ref: Option<String>,
    ) -> Self {
        let template = Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            preview_ref,
            source_template_id: document.template_id().to_string(),
            elements: document.elements().to_vec(),
            created_at: Utc::now(),
        };
        tracing::debug!(
            "Captured artwork template '{}' with {} elements",
            template.name,
            template.elements.len()
        );
        template
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preview_ref(&self) -> Option<&str> {
        self.preview_ref.as_deref()
    }

    pub fn source_template_id(&self) -> &str {
        &self.source_template_id
    }

    pub fn elements(&self) -> &[DesignElement] {
        &self.elements
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Appends a copy of the captured elements to `document` and returns the
    /// range of new indices. Approved documents reject this with `InvalidState`.
    pub fn apply_to(
        &self,
        document: &mut DesignDocument,
    ) -> std::result::Result<std::ops::Range<usize>, DocumentError> {
        document.extend_elements(&self.elements)
    }

    /// Case-insensitive match on the name
    pub fn matches_search(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// In-memory collection of artwork templates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtworkTemplateLibrary {
    templates: HashMap<String, ArtworkTemplate>,
}

impl ArtworkTemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template; ids must be unique
    pub fn add(&mut self, template: ArtworkTemplate) -> Result<()> {
        if self.templates.contains_key(&template.id) {
            return Err(anyhow!("Artwork template with ID '{}' already exists", template.id));
        }
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ArtworkTemplate> {
        self.templates.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<ArtworkTemplate> {
        self.templates.remove(id)
    }

    /// All templates, oldest first
    pub fn list(&self) -> Vec<&ArtworkTemplate> {
        let mut all: Vec<_> = self.templates.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    pub fn search(&self, query: &str) -> Vec<&ArtworkTemplate> {
        self.list()
            .into_iter()
            .filter(|t| t.matches_search(query))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Save library to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize artwork templates")?;
        std::fs::write(path, json).context("Failed to write artwork template file")?;
        Ok(())
    }

    /// Load library from a JSON file; a missing file yields an empty library
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content =
            std::fs::read_to_string(path).context("Failed to read artwork template file")?;
        let library =
            serde_json::from_str(&content).context("Failed to parse artwork template file")?;
        Ok(library)
    }
}
