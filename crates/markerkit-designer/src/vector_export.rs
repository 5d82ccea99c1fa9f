//! Scale-accurate vector export.
//!
//! A document is exported into a [`VectorDocument`]: named layers of
//! entities in inches, with text converted to glyph outlines. The document
//! is then encoded as a layered SVG sized in inches (see [`crate::svg_writer`]).
//!
//! Layers:
//! - `outline`: edit-zone and base-region boundaries
//! - `decoration`: template decorative slots
//! - `text`: one run per text element, in sequence order
//! - `artwork`: one placement per artwork element, in sequence order

use lyon::math::{point, vector, Vector};
use lyon::path::{Event, Path};
use rusttype::{point as rt_point, OutlineBuilder, Scale};
use serde::Serialize;
use std::fmt;

use markerkit_core::{
    Catalogs, DocumentError, ExportError, ExportWarning, Point, Rect, Template,
};
use markerkit_settings::{ExportSettings, MIN_COORDINATE_PRECISION};

use crate::document::{ArtworkElement, DesignDocument, DesignElement, TextElement};
use crate::font_manager::{resolve_fonts, FontResolution, FontSourceLoader};
use crate::svg_writer;
use crate::transform::CoordinateTransform;

/// Glyphs are laid out in thousandths of an inch.
const LAYOUT_UNITS_PER_INCH: f64 = 1000.0;

/// Named output layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Outline,
    Decoration,
    Text,
    Artwork,
}

impl LayerKind {
    /// Layers in output order
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Outline,
        LayerKind::Decoration,
        LayerKind::Text,
        LayerKind::Artwork,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Outline => "outline",
            Self::Decoration => "decoration",
            Self::Text => "text",
            Self::Artwork => "artwork",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One drawing command of a glyph outline, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

/// Which template feature an outline boundary traces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OutlineSource {
    EditZone,
    BaseRegion { material_id: String },
}

/// Rectangular boundary on the outline layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineEntity {
    pub id: String,
    pub source: OutlineSource,
    pub rect: Rect,
}

/// Glyph outlines for one text element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    /// Index of the element in the document sequence
    pub sequence: usize,
    pub content: String,
    /// Family named by the element
    pub requested_family: String,
    /// Family whose outlines were used
    pub family: String,
    pub size: f64,
    pub position: Point,
    pub rotation: f64,
    /// One command list per glyph, empty when outlines are unavailable
    pub glyphs: Vec<Vec<PathCommand>>,
}

impl TextRun {
    pub fn has_outlines(&self) -> bool {
        !self.glyphs.is_empty()
    }
}

/// Image placed at a fixed rectangle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Element index for artwork, `None` for template slots
    pub sequence: Option<usize>,
    /// Slot id for decorative placements
    pub slot_id: Option<String>,
    pub image_ref: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VectorEntity {
    Outline(OutlineEntity),
    Text(TextRun),
    Placement(Placement),
}

impl VectorEntity {
    /// Element index, for entities derived from design elements
    pub fn sequence(&self) -> Option<usize> {
        match self {
            Self::Outline(_) => None,
            Self::Text(run) => Some(run.sequence),
            Self::Placement(p) => p.sequence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorLayer {
    pub kind: LayerKind,
    pub entities: Vec<VectorEntity>,
}

impl VectorLayer {
    fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            entities: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Layered vector document in inches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorDocument {
    pub title: String,
    pub template_id: String,
    pub material_id: String,
    pub width: f64,
    pub height: f64,
    pub layers: Vec<VectorLayer>,
}

impl VectorDocument {
    pub fn layer(&self, kind: LayerKind) -> Option<&VectorLayer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// Entities that came from design elements (text and artwork layers).
    pub fn element_entities(&self) -> impl Iterator<Item = &VectorEntity> {
        self.layers
            .iter()
            .filter(|l| matches!(l.kind, LayerKind::Text | LayerKind::Artwork))
            .flat_map(|l| l.entities.iter())
    }

    pub fn entity_count(&self) -> usize {
        self.layers.iter().map(|l| l.len()).sum()
    }
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct VectorExport {
    pub document: VectorDocument,
    /// Encoded SVG
    pub bytes: Vec<u8>,
    pub warnings: Vec<ExportWarning>,
}

impl VectorExport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Builds vector exports from design documents.
#[derive(Debug)]
pub struct VectorExporter {
    default_font_family: String,
    coordinate_precision: usize,
    loader: FontSourceLoader,
}

impl VectorExporter {
    pub fn new(settings: &ExportSettings) -> Self {
        Self {
            default_font_family: settings.default_font_family.clone(),
            coordinate_precision: settings.coordinate_precision.max(MIN_COORDINATE_PRECISION),
            loader: FontSourceLoader::from_settings(settings),
        }
    }

    /// Replaces the font source loader.
    pub fn with_loader(mut self, loader: FontSourceLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn coordinate_precision(&self) -> usize {
        self.coordinate_precision
    }

    /// Exports `document` at any status.
    ///
    /// Fails with `InvalidReference` when the template or material is not in
    /// the catalogs and with `InvalidGeometry` for a degenerate template.
    /// Nothing is returned on failure.
    pub fn export(
        &self,
        document: &DesignDocument,
        catalogs: &Catalogs,
    ) -> Result<VectorExport, ExportError> {
        let snapshot = document.snapshot();
        let (template, _material) = snapshot.validate(catalogs).map_err(reference_error)?;
        let transform = CoordinateTransform::from_template(template)?;
        let (width, height) = transform.real_extent();

        let fonts = resolve_fonts(
            &snapshot.elements,
            catalogs.fonts.as_ref(),
            &self.loader,
            &self.default_font_family,
        );

        let mut outline = VectorLayer::new(LayerKind::Outline);
        let mut decoration = VectorLayer::new(LayerKind::Decoration);
        let mut text = VectorLayer::new(LayerKind::Text);
        let mut artwork = VectorLayer::new(LayerKind::Artwork);

        emit_template(template, &mut outline, &mut decoration);

        for (sequence, element) in snapshot.elements.iter().enumerate() {
            match element {
                DesignElement::Text(t) => {
                    text.entities
                        .push(VectorEntity::Text(text_run(sequence, t, &fonts)));
                }
                DesignElement::Artwork(a) => {
                    artwork
                        .entities
                        .push(VectorEntity::Placement(artwork_placement(sequence, a)));
                }
            }
        }

        let vector = VectorDocument {
            title: snapshot.title.clone(),
            template_id: snapshot.template_id.clone(),
            material_id: snapshot.material_id.clone(),
            width,
            height,
            layers: vec![outline, decoration, text, artwork],
        };

        let bytes = svg_writer::write_svg(&vector, self.coordinate_precision).into_bytes();
        let warnings = fonts.into_warnings();

        tracing::info!(
            "Vector export of '{}': {} elements, {} entities, {} bytes, {} warnings",
            vector.title,
            snapshot.elements.len(),
            vector.entity_count(),
            bytes.len(),
            warnings.len()
        );

        Ok(VectorExport {
            document: vector,
            bytes,
            warnings,
        })
    }
}

fn reference_error(err: DocumentError) -> ExportError {
    match err {
        DocumentError::InvalidReference { kind, id } => ExportError::InvalidReference { kind, id },
        other => ExportError::Document(other),
    }
}

fn emit_template(template: &Template, outline: &mut VectorLayer, decoration: &mut VectorLayer) {
    for zone in &template.edit_zones {
        outline.entities.push(VectorEntity::Outline(OutlineEntity {
            id: zone.id.clone(),
            source: OutlineSource::EditZone,
            rect: zone.rect,
        }));
    }
    for (i, base) in template.base_regions.iter().enumerate() {
        outline.entities.push(VectorEntity::Outline(OutlineEntity {
            id: format!("base-{}", i),
            source: OutlineSource::BaseRegion {
                material_id: base.material_id.clone(),
            },
            rect: base.rect,
        }));
    }
    for slot in &template.decorative_slots {
        decoration.entities.push(VectorEntity::Placement(Placement {
            sequence: None,
            slot_id: Some(slot.id.clone()),
            image_ref: slot.image_ref.clone(),
            rect: slot.rect,
        }));
    }
}

fn artwork_placement(sequence: usize, artwork: &ArtworkElement) -> Placement {
    Placement {
        sequence: Some(sequence),
        slot_id: None,
        image_ref: artwork.image_ref.clone(),
        rect: artwork.rect(),
    }
}

fn text_run(sequence: usize, text: &TextElement, fonts: &FontResolution) -> TextRun {
    let resolved = fonts.get(&text.font_family);
    let family = resolved
        .map(|r| r.family.clone())
        .unwrap_or_else(|| text.font_family.clone());

    let glyphs = resolved
        .and_then(|r| r.face.as_deref())
        .map(|face| glyph_outlines(face, text))
        .unwrap_or_default();

    TextRun {
        sequence,
        content: text.content.clone(),
        requested_family: text.font_family.clone(),
        family,
        size: text.size,
        position: text.position,
        rotation: text.rotation,
        glyphs,
    }
}

/// Lays out `text` and returns one command list per glyph in inches, placed
/// at the element position and rotated about it.
fn glyph_outlines(face: &rusttype::Font<'static>, text: &TextElement) -> Vec<Vec<PathCommand>> {
    let scale = Scale::uniform((text.size * LAYOUT_UNITS_PER_INCH) as f32);
    let v_metrics = face.v_metrics(scale);
    let start = rt_point(0.0, v_metrics.ascent);

    let mut glyphs = Vec::new();
    for glyph in face.layout(&text.content, scale, start) {
        // Outline relative to the glyph origin; the pen position is applied here
        let pen = glyph.position();
        let mut builder = GlyphPathBuilder::new();
        if !glyph.unpositioned().build_outline(&mut builder) {
            // Whitespace and glyphs without contours
            continue;
        }
        let commands = place_path(
            &builder.build(),
            vector(pen.x, pen.y),
            text.position,
            text.rotation,
        );
        if !commands.is_empty() {
            glyphs.push(commands);
        }
    }
    glyphs
}

/// Converts a glyph path in layout units to inches. `pen` is the glyph origin
/// in layout units, `origin` the element position in inches.
fn place_path(path: &Path, pen: Vector, origin: Point, rotation: f64) -> Vec<PathCommand> {
    let place = |p: lyon::math::Point| {
        let p = p + pen;
        Point::new(
            origin.x + p.x as f64 / LAYOUT_UNITS_PER_INCH,
            origin.y + p.y as f64 / LAYOUT_UNITS_PER_INCH,
        )
        .rotated_about(origin, rotation)
    };

    let mut commands = Vec::new();
    for event in path.iter() {
        match event {
            Event::Begin { at } => commands.push(PathCommand::MoveTo(place(at))),
            Event::Line { to, .. } => commands.push(PathCommand::LineTo(place(to))),
            Event::Quadratic { ctrl, to, .. } => commands.push(PathCommand::QuadTo {
                ctrl: place(ctrl),
                to: place(to),
            }),
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => commands.push(PathCommand::CubicTo {
                ctrl1: place(ctrl1),
                ctrl2: place(ctrl2),
                to: place(to),
            }),
            Event::End { close, .. } => {
                if close {
                    commands.push(PathCommand::Close);
                }
            }
        }
    }
    commands
}

/// Collects rusttype outline callbacks into a lyon path.
struct GlyphPathBuilder {
    builder: lyon::path::path::Builder,
    open: bool,
}

impl GlyphPathBuilder {
    fn new() -> Self {
        Self {
            builder: Path::builder(),
            open: false,
        }
    }

    fn build(mut self) -> Path {
        if self.open {
            self.builder.end(false);
        }
        self.builder.build()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.open {
            self.builder.end(false);
        }
        self.builder.begin(point(x, y));
        self.open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if self.open {
            self.builder.line_to(point(x, y));
        }
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        if self.open {
            self.builder.quadratic_bezier_to(point(x1, y1), point(x, y));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        if self.open {
            self.builder
                .cubic_bezier_to(point(x1, y1), point(x2, y2), point(x, y));
        }
    }

    fn close(&mut self) {
        if self.open {
            self.builder.end(true);
            self.open = false;
        }
    }
}
