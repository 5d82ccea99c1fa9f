// Shared fixtures for designer integration tests

#![allow(dead_code)]

use std::sync::Arc;

use markerkit_core::{
    BaseRegion, Catalogs, DecorativeSlot, EditZone, Font, FontLibrary, Material, MaterialLibrary,
    Rect, Template, TemplateLibrary,
};
use markerkit_designer::{FontSourceLoader, VectorExporter};
use markerkit_settings::ExportSettings;

pub const TEMPLATE_ID: &str = "upright-60";
pub const DEFAULT_FAMILY: &str = "Times";
/// Family backed by the public domain face in `tests/fonts`
pub const OUTLINE_FAMILY: &str = "Tuffy";

/// 60 x 23 inch upright designed on a 1200 x 460 pixel canvas.
pub fn upright_template() -> Template {
    Template {
        id: TEMPLATE_ID.to_string(),
        name: "Companion Upright".to_string(),
        category: "upright".to_string(),
        real_world_width: 60.0,
        real_world_height: 23.0,
        canvas_width: 1200.0,
        canvas_height: 460.0,
        edit_zones: vec![
            EditZone {
                id: "left".to_string(),
                rect: Rect::new(2.0, 2.0, 26.0, 16.0),
            },
            EditZone {
                id: "right".to_string(),
                rect: Rect::new(32.0, 2.0, 26.0, 16.0),
            },
        ],
        decorative_slots: vec![DecorativeSlot {
            id: "center-rose".to_string(),
            image_ref: "art/rose.svg".to_string(),
            rect: Rect::new(28.5, 6.0, 3.0, 3.0),
        }],
        base_regions: vec![BaseRegion {
            rect: Rect::new(0.0, 19.0, 60.0, 4.0),
            material_id: "gray".to_string(),
        }],
        available_materials: vec!["gray".to_string(), "black".to_string()],
        default_material_id: "gray".to_string(),
    }
}

pub fn materials() -> Vec<Material> {
    ["gray", "black", "bronze"]
        .iter()
        .map(|id| Material {
            id: id.to_string(),
            name: format!("{} granite", id),
            texture_ref: format!("textures/{}.jpg", id),
            swatch_ref: format!("swatches/{}.png", id),
        })
        .collect()
}

pub fn fonts() -> Vec<Font> {
    vec![
        Font {
            id: "times".to_string(),
            family: DEFAULT_FAMILY.to_string(),
            category: "serif".to_string(),
            source_file: "times.ttf".to_string(),
        },
        Font {
            id: "script".to_string(),
            family: "Script".to_string(),
            category: "script".to_string(),
            source_file: "script.ttf".to_string(),
        },
        Font {
            id: "tuffy".to_string(),
            family: OUTLINE_FAMILY.to_string(),
            category: "sans".to_string(),
            source_file: "Tuffy.ttf".to_string(),
        },
    ]
}

pub fn catalogs_with(templates: Vec<Template>, materials: Vec<Material>) -> Catalogs {
    Catalogs::new(
        Arc::new(TemplateLibrary::from_records(templates).unwrap()),
        Arc::new(FontLibrary::from_records(fonts()).unwrap()),
        Arc::new(MaterialLibrary::from_records(materials).unwrap()),
    )
}

pub fn catalogs() -> Catalogs {
    catalogs_with(vec![upright_template()], materials())
}

pub fn settings(font_dir: &std::path::Path) -> ExportSettings {
    ExportSettings {
        default_font_family: DEFAULT_FAMILY.to_string(),
        font_directory: font_dir.to_path_buf(),
        use_system_fonts: false,
        ..ExportSettings::default()
    }
}

/// Exporter reading fonts from an empty directory, so text is emitted without outlines.
pub fn exporter(font_dir: &tempfile::TempDir) -> VectorExporter {
    VectorExporter::new(&settings(font_dir.path()))
        .with_loader(FontSourceLoader::new(font_dir.path()))
}

pub fn font_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fonts")
}

/// Exporter reading fonts from `tests/fonts`, so `OUTLINE_FAMILY` text gets glyphs.
pub fn outline_exporter() -> VectorExporter {
    VectorExporter::new(&settings(&font_dir())).with_loader(FontSourceLoader::new(font_dir()))
}
