//! Paginated proof PDF
//!
//! The composed design is rasterized by an external [`RasterCapture`]
//! collaborator and the bitmap is placed, scaled to the page width, on
//! fixed-size landscape pages. A bitmap taller than one page is repeated
//! on following pages, each shifted up so the next slice is visible.

use async_trait::async_trait;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use markerkit_core::units::mm_to_points;
use markerkit_core::{Catalogs, DocumentError, ExportError};
use markerkit_settings::ProofSettings;

use crate::document::{DesignDocument, DocumentSnapshot};
use crate::transform::CoordinateTransform;

const IMAGE_NAME: &str = "Im0";

/// Failure reported by the rasterization collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CaptureError {
    pub message: String,
}

impl CaptureError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<CaptureError> for ExportError {
    fn from(err: CaptureError) -> Self {
        ExportError::CaptureFailure {
            reason: err.message,
        }
    }
}

/// Rasterizes a composed design.
///
/// `oversampling` is the pixel density multiplier requested for the capture.
#[async_trait]
pub trait RasterCapture: Send + Sync {
    async fn capture(
        &self,
        snapshot: &DocumentSnapshot,
        oversampling: f64,
    ) -> Result<DynamicImage, CaptureError>;
}

/// A page and the vertical offset of the bitmap's top edge (mm, down positive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProofPage {
    pub offset_mm: f64,
}

/// Placement of the scaled bitmap across the proof pages.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub final_width_mm: f64,
    pub final_height_mm: f64,
    pub pages: Vec<ProofPage>,
}

impl ProofLayout {
    /// Single empty page.
    pub fn blank(page_width_mm: f64, page_height_mm: f64) -> Self {
        Self {
            page_width_mm,
            page_height_mm,
            final_width_mm: 0.0,
            final_height_mm: 0.0,
            pages: vec![ProofPage { offset_mm: 0.0 }],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_blank(&self) -> bool {
        self.final_height_mm <= 0.0
    }

    /// The bitmap rows (mm from its top) shown on page `index`.
    pub fn visible_range(&self, index: usize) -> Option<(f64, f64)> {
        let page = self.pages.get(index)?;
        let top = -page.offset_mm;
        let bottom = (top + self.page_height_mm).min(self.final_height_mm);
        Some((top.max(0.0), bottom))
    }
}

/// Lays out a `bitmap_width` x `bitmap_height` pixel bitmap on pages of
/// `page_width_mm` x `page_height_mm`.
///
/// The bitmap is scaled to the page width. When it is taller than a page,
/// page 1 shows it from the top and every further page places it at
/// `consumed - final_height` until the whole height has been consumed.
/// Page 2 therefore always shows the bottom of the bitmap; with three or more
/// pages the middle slices follow it, counting up from the bottom.
pub fn paginate(
    bitmap_width: u32,
    bitmap_height: u32,
    page_width_mm: f64,
    page_height_mm: f64,
) -> Result<ProofLayout, ExportError> {
    if bitmap_width == 0 || bitmap_height == 0 {
        return Err(ExportError::geometry(format!(
            "capture has zero dimension ({}x{} px)",
            bitmap_width, bitmap_height
        )));
    }
    if !(page_width_mm > 0.0 && page_height_mm > 0.0) {
        return Err(ExportError::geometry(format!(
            "page medium must be positive, got {}x{} mm",
            page_width_mm, page_height_mm
        )));
    }

    let final_width = page_width_mm;
    let final_height = final_width * (bitmap_height as f64 / bitmap_width as f64);

    let mut pages = vec![ProofPage { offset_mm: 0.0 }];
    if final_height > page_height_mm {
        let mut consumed = page_height_mm;
        while final_height - consumed > 0.0 {
            pages.push(ProofPage {
                offset_mm: consumed - final_height,
            });
            consumed += page_height_mm;
        }
    }

    Ok(ProofLayout {
        page_width_mm,
        page_height_mm,
        final_width_mm: final_width,
        final_height_mm: final_height,
        pages,
    })
}

/// Encoded proof
#[derive(Debug, Clone)]
pub struct ProofDocument {
    pub layout: ProofLayout,
    /// PDF bytes
    pub bytes: Vec<u8>,
}

impl ProofDocument {
    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }
}

/// Renders proof PDFs on a fixed landscape medium.
#[derive(Debug, Clone)]
pub struct ProofRenderer {
    settings: ProofSettings,
}

impl ProofRenderer {
    pub fn new(settings: &ProofSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &ProofSettings {
        &self.settings
    }

    /// Validates `document`, captures it and encodes the proof.
    ///
    /// An empty composition produces one blank page and the collaborator is
    /// not called. A capture failure is returned as `CaptureFailure` without
    /// retrying.
    pub async fn render(
        &self,
        document: &DesignDocument,
        catalogs: &Catalogs,
        capture: &dyn RasterCapture,
    ) -> Result<ProofDocument, ExportError> {
        let snapshot = document.snapshot();
        let (template, _) = snapshot.validate(catalogs).map_err(|e| match e {
            DocumentError::InvalidReference { kind, id } => {
                ExportError::InvalidReference { kind, id }
            }
            other => ExportError::Document(other),
        })?;
        CoordinateTransform::from_template(template)?;

        if snapshot.is_empty() {
            tracing::info!("Proof of '{}': empty composition, blank page", snapshot.title);
            return self.render_blank(&snapshot.title);
        }

        let bitmap = capture
            .capture(&snapshot, self.settings.oversampling)
            .await
            .map_err(|e| {
                tracing::warn!("Capture failed for '{}': {}", snapshot.title, e);
                ExportError::from(e)
            })?;

        self.render_bitmap(&snapshot.title, &bitmap)
    }

    /// Encodes a proof from an already captured bitmap.
    pub fn render_bitmap(
        &self,
        title: &str,
        bitmap: &DynamicImage,
    ) -> Result<ProofDocument, ExportError> {
        let layout = paginate(
            bitmap.width(),
            bitmap.height(),
            self.settings.page_width_mm,
            self.settings.page_height_mm,
        )?;
        let bytes = encode_pdf(title, &layout, Some(bitmap))?;
        tracing::info!(
            "Proof of '{}': {}x{} px on {} page(s), {} bytes",
            title,
            bitmap.width(),
            bitmap.height(),
            layout.page_count(),
            bytes.len()
        );
        Ok(ProofDocument { layout, bytes })
    }

    /// Encodes a single blank page.
    pub fn render_blank(&self, title: &str) -> Result<ProofDocument, ExportError> {
        let layout = ProofLayout::blank(self.settings.page_width_mm, self.settings.page_height_mm);
        let bytes = encode_pdf(title, &layout, None)?;
        Ok(ProofDocument { layout, bytes })
    }
}

fn real(v: f64) -> Object {
    Object::Real(v as _)
}

fn encoding(err: impl std::fmt::Display) -> ExportError {
    ExportError::Encoding {
        reason: err.to_string(),
    }
}

/// Flattens `bitmap` onto white and returns packed 8-bit RGB samples.
fn rgb_on_white(bitmap: &DynamicImage) -> Vec<u8> {
    let rgba = bitmap.to_rgba8();
    let mut out = Vec::with_capacity(rgba.width() as usize * rgba.height() as usize * 3);
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        let alpha = a as u32;
        for channel in [r, g, b] {
            let blended = (channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            out.push(blended as u8);
        }
    }
    out
}

fn encode_pdf(
    title: &str,
    layout: &ProofLayout,
    bitmap: Option<&DynamicImage>,
) -> Result<Vec<u8>, ExportError> {
    let page_w = mm_to_points(layout.page_width_mm);
    let page_h = mm_to_points(layout.page_height_mm);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id: Option<ObjectId> = match bitmap {
        Some(bitmap) if !layout.is_blank() => {
            let image = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => bitmap.width() as i64,
                    "Height" => bitmap.height() as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8_i64,
                },
                rgb_on_white(bitmap),
            );
            Some(doc.add_object(image))
        }
        _ => None,
    };

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new("re", vec![real(0.0), real(0.0), real(page_w), real(page_h)]),
            Operation::new("W", vec![]),
            Operation::new("n", vec![]),
        ];
        if image_id.is_some() {
            let final_w = mm_to_points(layout.final_width_mm);
            let final_h = mm_to_points(layout.final_height_mm);
            let y_bottom =
                mm_to_points(layout.page_height_mm - (page.offset_mm + layout.final_height_mm));
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        real(final_w),
                        real(0.0),
                        real(0.0),
                        real(final_h),
                        real(0.0),
                        real(y_bottom),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ]);
        }
        operations.push(Operation::new("Q", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(encoding)?,
        ));

        let resources = match image_id {
            Some(id) => dictionary! {
                "XObject" => dictionary! { IMAGE_NAME => id },
            },
            None => dictionary! {},
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(page_w), real(page_h)],
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal("MarkerKit"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(encoding)?;
    Ok(bytes)
}
