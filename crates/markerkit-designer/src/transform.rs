//! Coordinate transformation between editing space and real-world space.
//!
//! Editing coordinates are canvas pixels (0,0 at the top-left of the
//! template canvas). Real-world coordinates are inches on the physical
//! product, with the same origin and axis directions.
//!
//! ```text
//! real_x = pixel_x * scale_x      scale_x = real_world_width  / canvas_width
//! real_y = pixel_y * scale_y      scale_y = real_world_height / canvas_height
//! ```
//!
//! The two axes are scaled independently. A template whose canvas aspect
//! ratio differs from its physical aspect ratio keeps that distortion;
//! callers that need a single scale factor use [`CoordinateTransform::require_uniform`].

use markerkit_core::{ExportError, Point, Rect, Template};
use std::fmt;

/// Default tolerance when comparing the two axis scales.
pub const UNIFORM_SCALE_TOLERANCE: f64 = 1e-9;

/// Bidirectional mapping between editing pixels and inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    scale_x: f64,
    scale_y: f64,
    real_width: f64,
    real_height: f64,
    canvas_width: f64,
    canvas_height: f64,
}

impl CoordinateTransform {
    /// Builds the transform for a template.
    ///
    /// Fails with `InvalidGeometry` when any dimension is zero, negative,
    /// or not finite.
    pub fn from_template(template: &Template) -> Result<Self, ExportError> {
        Self::new(
            template.real_world_width,
            template.real_world_height,
            template.canvas_width,
            template.canvas_height,
        )
        .map_err(|e| match e {
            ExportError::InvalidGeometry { reason } => ExportError::InvalidGeometry {
                reason: format!("template '{}': {}", template.id, reason),
            },
            other => other,
        })
    }

    /// Builds a transform from a real-world size (inches) and a canvas size (pixels).
    pub fn new(
        real_width: f64,
        real_height: f64,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Result<Self, ExportError> {
        let dims = [
            ("real-world width", real_width),
            ("real-world height", real_height),
            ("canvas width", canvas_width),
            ("canvas height", canvas_height),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(ExportError::geometry(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            scale_x: real_width / canvas_width,
            scale_y: real_height / canvas_height,
            real_width,
            real_height,
            canvas_width,
            canvas_height,
        })
    }

    /// Inches per editing pixel along X.
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Inches per editing pixel along Y.
    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Physical size in inches.
    pub fn real_extent(&self) -> (f64, f64) {
        (self.real_width, self.real_height)
    }

    /// Canvas size in pixels.
    pub fn canvas_extent(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    /// Converts editing pixels to inches.
    pub fn to_real(&self, px: f64, py: f64) -> Point {
        Point::new(px * self.scale_x, py * self.scale_y)
    }

    /// Converts inches to editing pixels.
    pub fn to_editing(&self, rx: f64, ry: f64) -> Point {
        Point::new(rx / self.scale_x, ry / self.scale_y)
    }

    pub fn point_to_real(&self, p: Point) -> Point {
        self.to_real(p.x, p.y)
    }

    pub fn point_to_editing(&self, p: Point) -> Point {
        self.to_editing(p.x, p.y)
    }

    /// Converts a pixel rectangle to inches, scaling each axis separately.
    pub fn rect_to_real(&self, r: Rect) -> Rect {
        Rect::new(
            r.x * self.scale_x,
            r.y * self.scale_y,
            r.width * self.scale_x,
            r.height * self.scale_y,
        )
    }

    pub fn rect_to_editing(&self, r: Rect) -> Rect {
        Rect::new(
            r.x / self.scale_x,
            r.y / self.scale_y,
            r.width / self.scale_x,
            r.height / self.scale_y,
        )
    }

    /// Converts a horizontal pixel length to inches.
    pub fn length_to_real_x(&self, px: f64) -> f64 {
        px * self.scale_x
    }

    /// Converts a vertical pixel length to inches.
    pub fn length_to_real_y(&self, px: f64) -> f64 {
        px * self.scale_y
    }

    /// True when both axes scale by the same factor within `tolerance`
    /// (relative to the larger scale).
    pub fn is_uniform(&self, tolerance: f64) -> bool {
        let largest = self.scale_x.max(self.scale_y);
        (self.scale_x - self.scale_y).abs() <= tolerance * largest
    }

    /// Returns the single scale factor, or `InvalidGeometry` when the axes differ.
    pub fn require_uniform(&self) -> Result<f64, ExportError> {
        if self.is_uniform(UNIFORM_SCALE_TOLERANCE) {
            Ok(self.scale_x)
        } else {
            Err(ExportError::geometry(format!(
                "non-uniform scale ({} in/px horizontally, {} in/px vertically)",
                self.scale_x, self.scale_y
            )))
        }
    }
}

impl fmt::Display for CoordinateTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} px -> {}x{} in ({} x {} in/px)",
            self.canvas_width,
            self.canvas_height,
            self.real_width,
            self.real_height,
            self.scale_x,
            self.scale_y
        )
    }
}
