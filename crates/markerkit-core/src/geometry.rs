//! Plain geometry shared by templates, documents, and exporters.

use serde::{Deserialize, Serialize};

/// A 2D point. Units depend on context (inches or editing pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rotate around `center` by `angle_deg` degrees (clockwise on a y-down canvas).
    pub fn rotated_about(self, center: Point, angle_deg: f64) -> Point {
        if angle_deg.abs() < 1e-12 {
            return self;
        }
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when the rectangle lies inside `[0, width] x [0, height]`,
    /// allowing `tolerance` of slack on every edge.
    pub fn within_extent(&self, width: f64, height: f64, tolerance: f64) -> bool {
        self.width >= 0.0
            && self.height >= 0.0
            && self.x >= -tolerance
            && self.y >= -tolerance
            && self.right() <= width + tolerance
            && self.bottom() <= height + tolerance
    }
}
