//! Export configuration for MarkerKit
//!
//! Settings are grouped in two sections:
//! - Vector export (fallback font, font directory, coordinate precision)
//! - Proof rendering (page medium, capture oversampling)
//!
//! Files may be JSON or TOML; the format is chosen by extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};

/// Coordinates below this many decimals would lose thousandth-inch precision.
pub const MIN_COORDINATE_PRECISION: usize = 3;
pub const MAX_COORDINATE_PRECISION: usize = 9;

/// Proof page medium and capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofSettings {
    /// Landscape page width in millimeters
    pub page_width_mm: f64,
    /// Landscape page height in millimeters
    pub page_height_mm: f64,
    /// Oversampling factor requested from the rasterizer
    pub oversampling: f64,
}

impl Default for ProofSettings {
    fn default() -> Self {
        // A4 landscape
        Self {
            page_width_mm: 297.0,
            page_height_mm: 210.0,
            oversampling: 2.0,
        }
    }
}

/// Top-level export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Family used when an element's font is missing from the catalog
    pub default_font_family: String,
    /// Directory that font catalog source files are resolved against
    pub font_directory: PathBuf,
    /// Also query installed system fonts by family name
    pub use_system_fonts: bool,
    /// Decimal places written for vector coordinates (inches)
    pub coordinate_precision: usize,
    /// Proof rendering settings
    pub proof: ProofSettings,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_font_family: "Times New Roman".to_string(),
            font_directory: dirs::data_dir()
                .map(|d| d.join("markerkit").join("fonts"))
                .unwrap_or_else(|| PathBuf::from("fonts")),
            use_system_fonts: false,
            coordinate_precision: 4,
            proof: ProofSettings::default(),
        }
    }
}

impl ExportSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match extension(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        debug!("Loaded export settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        if self.default_font_family.trim().is_empty() {
            return Err(SettingsError::invalid(
                "default_font_family",
                "must not be empty",
            ));
        }

        if !(MIN_COORDINATE_PRECISION..=MAX_COORDINATE_PRECISION)
            .contains(&self.coordinate_precision)
        {
            return Err(SettingsError::invalid(
                "coordinate_precision",
                format!(
                    "must be between {} and {}",
                    MIN_COORDINATE_PRECISION, MAX_COORDINATE_PRECISION
                ),
            ));
        }

        let proof = &self.proof;
        if !(proof.page_width_mm > 0.0 && proof.page_height_mm > 0.0) {
            return Err(SettingsError::invalid("proof.page", "dimensions must be > 0"));
        }

        if proof.page_width_mm < proof.page_height_mm {
            return Err(SettingsError::invalid(
                "proof.page",
                "medium must be landscape (width >= height)",
            ));
        }

        if !(proof.oversampling >= 1.0) {
            return Err(SettingsError::invalid("proof.oversampling", "must be >= 1"));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

fn extension(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

/// Platform config location: `<config_dir>/markerkit/export.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("markerkit").join("export.toml"))
        .ok_or_else(|| SettingsError::ConfigDirectory("no platform config directory".to_string()))
}
