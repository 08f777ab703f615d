//! Property-based invariant tests for the geometry kernel and shape algebra.
//!
//! 1. Canonical rectangles are ordered and independent of drag direction.
//! 2. Canonical circles are square and centered on the first anchor.
//! 3. Ellipse boxes are symmetric about the center.
//! 4. Integer image points survive a view round trip at any fit and pan.
//! 5. Cutting a rectangle conserves its area.
//! 6. Combining a shape with itself leaves its area unchanged.
//! 7. Tessellated ovals stay inside their box.
//! 8. Oblique cuts conserve area and their pieces combine back.

use proptest::prelude::*;
use region_annotator::boolean_ops;
use region_annotator::geometry::{
    canonical_circle, canonical_ellipse, canonical_rectangle, polygon_area, tessellate_oval,
};
use region_annotator::{Bounds, Point, Shape, ViewState};

// ── Helpers ─────────────────────────────────────────────────────────────

fn point_strategy() -> impl Strategy<Value = Point> {
    (-1000i32..=1000, -1000i32..=1000).prop_map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
}

/// Rectangle with a positive extent on both axes.
fn rect_strategy() -> impl Strategy<Value = Bounds> {
    (0i32..=500, 0i32..=500, 2i32..=300, 2i32..=300).prop_map(|(x, y, w, h)| {
        let top_left = Point::new(f64::from(x), f64::from(y));
        Bounds::new(top_left, top_left.translated(f64::from(w), f64::from(h)))
    })
}

/// Rectangle at image scale, hundreds to thousands of pixels.
fn image_rect_strategy() -> impl Strategy<Value = Bounds> {
    (0i32..=2000, 0i32..=2000, 10i32..=1500, 10i32..=1500).prop_map(|(x, y, w, h)| {
        let top_left = Point::new(f64::from(x), f64::from(y));
        Bounds::new(top_left, top_left.translated(f64::from(w), f64::from(h)))
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Canonical rectangles
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rectangle_is_ordered(a in point_strategy(), b in point_strategy()) {
        let r = canonical_rectangle(a, b);
        prop_assert!(r.top_left.x <= r.bottom_right.x, "x unordered: {:?}", r);
        prop_assert!(r.top_left.y <= r.bottom_right.y, "y unordered: {:?}", r);
        prop_assert_eq!(r, canonical_rectangle(b, a), "drag direction changed the box");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Canonical circles
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn circle_box_is_square(center in point_strategy(), edge in point_strategy()) {
        let b = canonical_circle(center, edge);
        prop_assert!((b.width() - b.height()).abs() < 1e-9, "not square: {:?}", b);
        prop_assert!((b.width() / 2.0 - center.distance_to(&edge)).abs() < 1e-9);
        prop_assert!(b.center().distance_to(&center) < 1e-9);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Ellipse boxes
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ellipse_box_is_centered(center in point_strategy(), edge in point_strategy()) {
        let b = canonical_ellipse(center, edge);
        prop_assert_eq!(b.center(), center);
        prop_assert_eq!(b.width(), 2.0 * (edge.x - center.x).abs());
        prop_assert_eq!(b.height(), 2.0 * (edge.y - center.y).abs());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. View round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn image_points_round_trip_through_view(
        image in (1u32..=4000, 1u32..=4000),
        canvas in (1u32..=2000, 1u32..=2000),
        pan in (-500i32..=500, -500i32..=500),
        fraction in (0.0f64..=1.0, 0.0f64..=1.0),
    ) {
        let mut view = ViewState::fit(image, canvas);
        view.pan(f64::from(pan.0), f64::from(pan.1));

        let norm = Point::new(
            (f64::from(image.0) * fraction.0).round(),
            (f64::from(image.1) * fraction.1).round(),
        );
        let back = view.to_normalized(view.to_view(norm));
        prop_assert_eq!(back, Ok(norm), "view {:?}", view);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Cut conserves area
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cut_conserves_rectangle_area(rect in rect_strategy(), at in 0.05f64..=0.95) {
        let shape = Shape::Rectangle {
            top_left: rect.top_left,
            bottom_right: rect.bottom_right,
        };
        let x = rect.top_left.x + rect.width() * at;
        let line = (Point::new(x, rect.top_left.y - 10.0), Point::new(x, rect.bottom_right.y + 10.0));

        let pieces = boolean_ops::cut(&shape.outline(4), line).unwrap();
        prop_assert_eq!(pieces.len(), 2);
        let total: f64 = pieces.iter().map(|piece| polygon_area(piece)).sum();
        prop_assert!(
            (total - shape.area()).abs() < 1e-6,
            "pieces sum to {} but the rectangle has {}",
            total,
            shape.area()
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Self-union
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn combine_with_itself_keeps_area(rect in rect_strategy()) {
        let outline = Shape::Rectangle {
            top_left: rect.top_left,
            bottom_right: rect.bottom_right,
        }
        .outline(4);

        let merged = boolean_ops::combine(&[outline.clone(), outline.clone()]).unwrap();
        prop_assert!((polygon_area(&merged) - polygon_area(&outline)).abs() < 1e-6);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Oval tessellation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn oval_samples_stay_in_box(rect in rect_strategy(), steps in 3usize..=64) {
        let samples = tessellate_oval(rect, steps, 0.0);
        prop_assert_eq!(samples.len(), steps);
        for p in samples {
            prop_assert!(p.x >= rect.top_left.x - 1e-9 && p.x <= rect.bottom_right.x + 1e-9);
            prop_assert!(p.y >= rect.top_left.y - 1e-9 && p.y <= rect.bottom_right.y + 1e-9);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Oblique cuts
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn oblique_cut_conserves_area_and_recombines(
        rect in image_rect_strategy(),
        through in (0.05f64..=0.95, 0.05f64..=0.95),
        angle in 0.0f64..std::f64::consts::PI,
    ) {
        let shape = Shape::Rectangle {
            top_left: rect.top_left,
            bottom_right: rect.bottom_right,
        };
        let outline = shape.outline(4);
        let a = rect
            .top_left
            .translated(rect.width() * through.0, rect.height() * through.1);
        let b = a.translated(angle.cos() * 100.0, angle.sin() * 100.0);

        let pieces = boolean_ops::cut(&outline, (a, b)).unwrap();
        prop_assert!(!pieces.is_empty());
        let total: f64 = pieces.iter().map(|piece| polygon_area(piece)).sum();
        prop_assert!(
            (total - shape.area()).abs() < 1e-6,
            "pieces sum to {} but the rectangle has {} (line {:?} -> {:?})",
            total,
            shape.area(),
            a,
            b
        );

        if pieces.len() >= 2 {
            let merged = boolean_ops::combine(&pieces);
            prop_assert!(merged.is_ok(), "pieces did not recombine: {:?}", merged);
            let merged = merged.unwrap();
            prop_assert!((polygon_area(&merged) - shape.area()).abs() < 1e-6);
        }
    }
}
