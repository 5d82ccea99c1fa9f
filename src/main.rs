//! markerkit - export a marker design as a layered SVG in inches.
//!
//! Usage:
//!   markerkit <catalog-dir> <document.json> <output.svg> [--settings settings.toml]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use markerkit::designer::load_document;
use markerkit::{init_logging, load_catalogs, ExportSettings, VectorExporter};

#[derive(Parser, Debug)]
#[command(name = "markerkit")]
#[command(about = "Scale-accurate vector export for marker designs")]
#[command(version)]
struct Cli {
    /// Directory holding templates.json, fonts.json and materials.json
    catalog_dir: PathBuf,

    /// Saved design document
    document: PathBuf,

    /// SVG file to write
    output: PathBuf,

    /// Export settings file (TOML or JSON); defaults to the user config
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let settings = match &cli.settings {
        Some(path) => ExportSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ExportSettings::load_or_default().context("Failed to load export settings")?,
    };

    let catalogs = load_catalogs(&cli.catalog_dir)?;
    let document = load_document(&cli.document)?;

    let export = VectorExporter::new(&settings).export(&document, &catalogs)?;
    for warning in &export.warnings {
        tracing::warn!("{}", warning);
    }

    std::fs::write(&cli.output, &export.bytes)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    tracing::info!("Wrote {}", cli.output.display());

    Ok(())
}
