use markerkit_core::{EditZone, ExportError, ExportWarning, Point, Rect, ReferenceKind, Template};
use markerkit_designer::{
    ArtworkElement, CoordinateTransform, DesignDocument, DocumentStatus, LayerKind, PathCommand,
    TextElement, TextRun, VectorEntity, VectorExport,
};

use crate::common::{
    catalogs, catalogs_with, exporter, materials, outline_exporter, upright_template,
    OUTLINE_FAMILY,
};

fn mixed_document(n: usize) -> DesignDocument {
    let mut doc = DesignDocument::new(&upright_template(), "Mixed");
    for i in 0..n {
        let x = 2.0 + i as f64;
        if i % 3 == 1 {
            doc.push_element(ArtworkElement::new(
                format!("art/{}.png", i),
                Rect::new(x, 10.0, 2.0, 2.0),
            ))
            .unwrap();
        } else {
            doc.push_element(
                TextElement::new(format!("Line {}", i), "Times", 0.75, Point::new(x, 3.0))
                    .with_rotation(i as f64 * 5.0),
            )
            .unwrap();
        }
    }
    doc
}

#[test]
fn test_one_entity_per_element_in_sequence_order() {
    let fonts = tempfile::tempdir().unwrap();
    let doc = mixed_document(7);
    let export = exporter(&fonts).export(&doc, &catalogs()).unwrap();
    let vector = &export.document;

    let text = vector.layer(LayerKind::Text).unwrap();
    let artwork = vector.layer(LayerKind::Artwork).unwrap();
    assert_eq!(text.len() + artwork.len(), 7);
    assert_eq!(artwork.len(), 2);

    for layer in [text, artwork] {
        let seqs: Vec<_> = layer.entities.iter().filter_map(|e| e.sequence()).collect();
        let mut sorted = seqs.clone();
        sorted.sort_unstable();
        assert_eq!(seqs, sorted);
        assert_eq!(seqs.len(), layer.len());
    }

    let mut all: Vec<_> = vector.element_entities().filter_map(|e| e.sequence()).collect();
    all.sort_unstable();
    assert_eq!(all, (0..7).collect::<Vec<_>>());

    // Outline layer carries both edit zones and the base band
    assert_eq!(vector.layer(LayerKind::Outline).unwrap().len(), 3);
    assert_eq!(vector.layer(LayerKind::Decoration).unwrap().len(), 1);
}

#[test]
fn test_text_keeps_stored_position_and_rotation() {
    let fonts = tempfile::tempdir().unwrap();
    let doc = mixed_document(3);
    let export = exporter(&fonts).export(&doc, &catalogs()).unwrap();
    let text = export.document.layer(LayerKind::Text).unwrap();
    match &text.entities[1] {
        VectorEntity::Text(run) => {
            assert_eq!(run.sequence, 2);
            assert_eq!(run.position, Point::new(4.0, 3.0));
            assert_eq!(run.rotation, 10.0);
            assert_eq!(run.size, 0.75);
        }
        other => panic!("unexpected entity {:?}", other),
    }
}

#[test]
fn test_export_is_byte_identical_when_unchanged() {
    let fonts = tempfile::tempdir().unwrap();
    let doc = mixed_document(5);
    let catalogs = catalogs();
    let exporter = exporter(&fonts);
    let first = exporter.export(&doc, &catalogs).unwrap();
    let second = exporter.export(&doc, &catalogs).unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn test_unknown_family_falls_back_with_warning() {
    let fonts = tempfile::tempdir().unwrap();
    let mut doc = DesignDocument::new(&upright_template(), "Fallback");
    doc.push_element(TextElement::new("Rest", "Copperplate", 1.0, Point::new(5.0, 5.0)))
        .unwrap();

    let export = exporter(&fonts).export(&doc, &catalogs()).unwrap();
    assert!(export.warnings.contains(&ExportWarning::UnresolvedFont {
        requested: "Copperplate".to_string(),
        fallback: "Times".to_string(),
    }));

    let text = export.document.layer(LayerKind::Text).unwrap();
    match &text.entities[0] {
        VectorEntity::Text(run) => {
            assert_eq!(run.requested_family, "Copperplate");
            assert_eq!(run.family, "Times");
        }
        other => panic!("unexpected entity {:?}", other),
    }
    let svg = String::from_utf8(export.bytes).unwrap();
    assert!(svg.contains("data-requested-family=\"Copperplate\""));
}

#[test]
fn test_missing_outline_source_still_emits_text() {
    let fonts = tempfile::tempdir().unwrap();
    let mut doc = DesignDocument::new(&upright_template(), "NoOutlines");
    doc.push_element(TextElement::new("Smith & Sons", "Script", 1.0, Point::new(5.0, 5.0)))
        .unwrap();

    let export = exporter(&fonts).export(&doc, &catalogs()).unwrap();
    assert!(matches!(
        export.warnings.as_slice(),
        [ExportWarning::OutlineUnavailable { family, .. }] if family == "Script"
    ));
    let svg = String::from_utf8(export.bytes).unwrap();
    assert!(svg.contains(">Smith &amp; Sons</text>"));
    assert!(svg.contains("dominant-baseline=\"hanging\""));
}

#[test]
fn test_empty_composition_has_outline_layer_only() {
    let fonts = tempfile::tempdir().unwrap();
    let doc = DesignDocument::new(&upright_template(), "Blank");
    let export = exporter(&fonts).export(&doc, &catalogs()).unwrap();

    assert!(export.document.layer(LayerKind::Text).unwrap().is_empty());
    assert!(export.document.layer(LayerKind::Artwork).unwrap().is_empty());
    assert_eq!(export.document.layer(LayerKind::Outline).unwrap().len(), 3);
    assert!(export.warnings.is_empty());

    let svg = String::from_utf8(export.bytes).unwrap();
    assert!(svg.contains("width=\"60in\" height=\"23in\""));
    assert!(svg.contains("inkscape:label=\"outline\""));
    assert!(svg.contains("inkscape:label=\"text\""));
}

#[test]
fn test_missing_template_refuses_export() {
    let fonts = tempfile::tempdir().unwrap();
    let doc = mixed_document(2);
    let mut other = upright_template();
    other.id = "flat-24".to_string();
    let catalogs = catalogs_with(vec![other], materials());
    match exporter(&fonts).export(&doc, &catalogs) {
        Err(ExportError::InvalidReference { kind, id }) => {
            assert_eq!(kind, ReferenceKind::Template);
            assert_eq!(id, "upright-60");
        }
        other => panic!("expected InvalidReference, got {:?}", other.map(|e| e.bytes.len())),
    }
}

#[test]
fn test_missing_material_refuses_export() {
    let fonts = tempfile::tempdir().unwrap();
    let doc = mixed_document(2);
    let catalogs = catalogs_with(vec![upright_template()], Vec::new());
    assert!(matches!(
        exporter(&fonts).export(&doc, &catalogs),
        Err(ExportError::InvalidReference {
            kind: ReferenceKind::Material,
            ..
        })
    ));
}

#[test]
fn test_approved_document_still_exports() {
    let fonts = tempfile::tempdir().unwrap();
    let mut doc = mixed_document(4);
    doc.set_status(DocumentStatus::Approved).unwrap();
    let export = exporter(&fonts).export(&doc, &catalogs()).unwrap();
    assert_eq!(export.document.element_entities().count(), 4);
}

#[test]
fn test_coordinates_keep_thousandths() {
    let fonts = tempfile::tempdir().unwrap();
    let mut doc = DesignDocument::new(&upright_template(), "Precise");
    doc.push_element(ArtworkElement::new(
        "art/leaf.png",
        Rect::new(1.23456, 2.0005, 3.0, 1.5),
    ))
    .unwrap();
    let export = exporter(&fonts).export(&doc, &catalogs()).unwrap();
    let svg = String::from_utf8(export.bytes).unwrap();
    assert!(svg.contains("x=\"1.2346\" y=\"2.0005\" width=\"3\" height=\"1.5\""));
}

fn only_text_run(export: &VectorExport) -> &TextRun {
    match export.document.layer(LayerKind::Text).unwrap().entities.as_slice() {
        [VectorEntity::Text(run)] => run,
        other => panic!("expected a single text run, got {:?}", other),
    }
}

/// (min_x, min_y, max_x, max_y) over every point of a glyph
fn glyph_bounds(glyph: &[PathCommand]) -> (f64, f64, f64, f64) {
    let mut points = Vec::new();
    for cmd in glyph {
        match *cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
            PathCommand::QuadTo { ctrl, to } => points.extend([ctrl, to]),
            PathCommand::CubicTo { ctrl1, ctrl2, to } => points.extend([ctrl1, ctrl2, to]),
            PathCommand::Close => {}
        }
    }
    points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
    )
}

#[test]
fn test_glyphs_advance_along_a_shared_baseline() {
    let mut doc = DesignDocument::new(&upright_template(), "Outlined");
    doc.push_element(TextElement::new("HIH", OUTLINE_FAMILY, 1.0, Point::new(5.0, 4.0)))
        .unwrap();

    let export = outline_exporter().export(&doc, &catalogs()).unwrap();
    assert!(export.warnings.is_empty(), "{:?}", export.warnings);

    let run = only_text_run(&export);
    assert_eq!(run.family, OUTLINE_FAMILY);
    assert_eq!(run.glyphs.len(), 3);

    let bounds: Vec<_> = run.glyphs.iter().map(|g| glyph_bounds(g)).collect();

    // First glyph starts at the element position, the rest follow the pen
    assert!(bounds[0].0 >= 5.0 && bounds[0].0 < 5.2, "{:?}", bounds[0]);
    for pair in bounds.windows(2) {
        assert!(pair[1].0 > pair[0].0 + 0.1, "glyphs overlap: {:?}", pair);
        assert!(pair[1].0 >= pair[0].2 - 1e-6, "glyphs overlap: {:?}", pair);
    }

    // Flat-bottomed capitals sit on one baseline below the top edge
    for b in &bounds[1..] {
        assert!((b.3 - bounds[0].3).abs() < 1e-3, "baseline differs: {:?}", bounds);
    }
    assert!(bounds.iter().all(|b| b.1 >= 4.0 - 1e-6 && b.3 < 5.0));

    // Two H glyphs have the same shape, shifted by the pen advance
    let width = |b: &(f64, f64, f64, f64)| b.2 - b.0;
    assert!((width(&bounds[0]) - width(&bounds[2])).abs() < 1e-6);

    let svg = String::from_utf8(export.bytes.clone()).unwrap();
    assert_eq!(svg.matches("<path").count(), 3);
    assert!(!svg.contains("dominant-baseline"));
}

#[test]
fn test_outlined_export_is_byte_identical() {
    let mut doc = DesignDocument::new(&upright_template(), "Outlined");
    doc.push_element(
        TextElement::new("In Memory", OUTLINE_FAMILY, 1.5, Point::new(3.0, 3.0))
            .with_rotation(-4.0),
    )
    .unwrap();

    let catalogs = catalogs();
    let first = outline_exporter().export(&doc, &catalogs).unwrap();
    let second = outline_exporter().export(&doc, &catalogs).unwrap();
    assert!(only_text_run(&first).has_outlines());
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn test_rotated_glyphs_turn_about_the_position() {
    let mut straight = DesignDocument::new(&upright_template(), "Straight");
    straight
        .push_element(TextElement::new("HH", OUTLINE_FAMILY, 1.0, Point::new(5.0, 4.0)))
        .unwrap();
    let mut turned = DesignDocument::new(&upright_template(), "Turned");
    turned
        .push_element(
            TextElement::new("HH", OUTLINE_FAMILY, 1.0, Point::new(5.0, 4.0)).with_rotation(90.0),
        )
        .unwrap();

    let catalogs = catalogs();
    let a = outline_exporter().export(&straight, &catalogs).unwrap();
    let b = outline_exporter().export(&turned, &catalogs).unwrap();
    let a = glyph_bounds(&only_text_run(&a).glyphs[1]);
    let b = glyph_bounds(&only_text_run(&b).glyphs[1]);

    // A quarter turn maps (5 + dx, 4 + dy) to (5 - dy, 4 + dx)
    assert!((b.1 - (4.0 + (a.0 - 5.0))).abs() < 1e-6);
    assert!((b.2 - (5.0 - (a.1 - 4.0))).abs() < 1e-6);
}

/// 24 x 12 inch flat marker on a 1000 x 400 pixel canvas: 0.024 in/px
/// horizontally, 0.03 in/px vertically.
fn stretched_template() -> Template {
    Template {
        id: "flat-24".to_string(),
        name: "Flat Marker".to_string(),
        category: "flat".to_string(),
        real_world_width: 24.0,
        real_world_height: 12.0,
        canvas_width: 1000.0,
        canvas_height: 400.0,
        edit_zones: vec![EditZone {
            id: "face".to_string(),
            rect: Rect::new(1.0, 1.0, 22.0, 10.0),
        }],
        decorative_slots: Vec::new(),
        base_regions: Vec::new(),
        available_materials: vec!["gray".to_string()],
        default_material_id: "gray".to_string(),
    }
}

#[test]
fn test_non_uniform_canvas_keeps_per_axis_scale() {
    let fonts = tempfile::tempdir().unwrap();
    let template = stretched_template();
    let transform = CoordinateTransform::from_template(&template).unwrap();
    assert!(!transform.is_uniform(1e-9));

    let mut doc = DesignDocument::new(&template, "Stretched");
    doc.push_element(ArtworkElement::from_editing(
        &transform,
        "art/vine.png",
        Rect::new(100.0, 100.0, 500.0, 200.0),
    ))
    .unwrap();

    let catalogs = catalogs_with(vec![template], materials());
    let export = exporter(&fonts).export(&doc, &catalogs).unwrap();

    match export.document.layer(LayerKind::Artwork).unwrap().entities.as_slice() {
        [VectorEntity::Placement(p)] => {
            assert!((p.rect.x - 2.4).abs() < 1e-9);
            assert!((p.rect.y - 3.0).abs() < 1e-9);
            assert!((p.rect.width - 12.0).abs() < 1e-9);
            assert!((p.rect.height - 6.0).abs() < 1e-9);
        }
        other => panic!("unexpected artwork layer {:?}", other),
    }

    let svg = String::from_utf8(export.bytes).unwrap();
    assert!(svg.contains("width=\"24in\" height=\"12in\""));
    assert!(svg.contains("x=\"2.4\" y=\"3\" width=\"12\" height=\"6\""));
}
