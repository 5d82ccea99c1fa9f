use markerkit_core::{ExportError, Point, Rect};
use markerkit_designer::CoordinateTransform;
use proptest::prelude::*;

use crate::common::upright_template;

#[test]
fn test_canvas_center_maps_to_product_center() {
    let t = CoordinateTransform::from_template(&upright_template()).unwrap();
    let real = t.to_real(600.0, 230.0);
    assert!((real.x - 30.0).abs() < 1e-9);
    assert!((real.y - 11.5).abs() < 1e-9);
}

#[test]
fn test_canvas_corners() {
    let t = CoordinateTransform::from_template(&upright_template()).unwrap();
    assert_eq!(t.to_real(0.0, 0.0), Point::new(0.0, 0.0));
    let far = t.to_real(1200.0, 460.0);
    assert!((far.x - 60.0).abs() < 1e-9);
    assert!((far.y - 23.0).abs() < 1e-9);
}

#[test]
fn test_rect_to_real_scales_both_axes() {
    let t = CoordinateTransform::new(24.0, 12.0, 1000.0, 400.0).unwrap();
    let r = t.rect_to_real(Rect::new(100.0, 100.0, 500.0, 200.0));
    assert!((r.x - 2.4).abs() < 1e-9);
    assert!((r.y - 3.0).abs() < 1e-9);
    assert!((r.width - 12.0).abs() < 1e-9);
    assert!((r.height - 6.0).abs() < 1e-9);
}

#[test]
fn test_degenerate_template_rejected() {
    let mut template = upright_template();
    template.canvas_height = 0.0;
    match CoordinateTransform::from_template(&template) {
        Err(ExportError::InvalidGeometry { reason }) => {
            assert!(reason.contains("upright-60"));
            assert!(reason.contains("canvas height"));
        }
        other => panic!("expected InvalidGeometry, got {:?}", other),
    }
}

proptest! {
    #[test]
    fn prop_real_editing_round_trip(
        real_w in 1.0f64..120.0,
        real_h in 1.0f64..60.0,
        canvas_w in 100.0f64..4000.0,
        canvas_h in 100.0f64..4000.0,
        px in 0.0f64..4000.0,
        py in 0.0f64..4000.0,
    ) {
        let t = CoordinateTransform::new(real_w, real_h, canvas_w, canvas_h).unwrap();
        let real = t.to_real(px, py);
        let back = t.to_editing(real.x, real.y);
        let again = t.to_real(back.x, back.y);
        prop_assert!((again.x - real.x).abs() < 1e-6);
        prop_assert!((again.y - real.y).abs() < 1e-6);
    }

    #[test]
    fn prop_uniform_iff_aspect_matches(
        real_w in 1.0f64..120.0,
        canvas_w in 100.0f64..4000.0,
        ratio in 0.2f64..1.0,
    ) {
        let t = CoordinateTransform::new(real_w, real_w * ratio, canvas_w, canvas_w * ratio).unwrap();
        prop_assert!(t.is_uniform(1e-9));
        prop_assert!(t.require_uniform().is_ok());
    }
}
