//! Unit conversion utilities
//!
//! Real-world geometry is stored in inches. Proof pages are specified in
//! millimeters and written to PDF in points.

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// PDF points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Convert inches to millimeters
pub fn inches_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

/// Convert millimeters to inches
pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Convert millimeters to PDF points
pub fn mm_to_points(mm: f64) -> f64 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

/// Format a coordinate with a fixed number of decimals.
///
/// Output is stable across platforms: negative zero prints as `0` and
/// trailing zeros are trimmed, so equal values always produce equal text.
pub fn format_coord(value: f64, decimals: usize) -> String {
    let mut s = format!("{:.*}", decimals, value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
