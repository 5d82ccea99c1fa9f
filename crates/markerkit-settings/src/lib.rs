//! MarkerKit Settings Crate
//!
//! Handles export configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, ExportSettings, ProofSettings, MAX_COORDINATE_PRECISION,
    MIN_COORDINATE_PRECISION,
};
pub use error::{SettingsError, SettingsResult};
