//! Round-trip tests: annotation -> document -> annotation.

use crate::format::{LoadPolicy, ShapeEntry, parse_document, write_document};
use crate::model::{Annotation, Point, Shape};

fn roundtrip(annotations: &[Annotation]) -> Vec<Annotation> {
    let bytes = write_document(annotations).expect("write");
    parse_document(&bytes, LoadPolicy::Strict).expect("parse")
}

#[test]
fn test_polygon_roundtrip_exact() {
    for points in [
        vec![Point::new(3.0, 4.0)],
        vec![Point::new(0.0, 0.0), Point::new(10.5, 2.25)],
        vec![
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            Point::new(25.0, 18.5),
            Point::new(12.0, 30.0),
        ],
    ] {
        let original = Annotation::new(Shape::Polygon { points });
        let loaded = roundtrip(std::slice::from_ref(&original));
        assert_eq!(loaded, vec![original]);
    }
}

#[test]
fn test_polygon_entry_conversion_is_identity() {
    let original = Annotation::new(Shape::Polygon {
        points: vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 1.0)],
    })
    .with_area(Some(12.0));
    let entry = ShapeEntry::from_annotation(&original);
    let back = entry.clone().into_annotation().unwrap();
    assert_eq!(back, original);
    assert_eq!(ShapeEntry::from_annotation(&back), entry);
}

#[test]
fn test_ellipse_roundtrip() {
    let original = Annotation::new(Shape::Ellipse {
        center: Point::new(100.0, 60.0),
        edge: Point::new(130.0, 75.0),
    });
    let loaded = roundtrip(std::slice::from_ref(&original));
    assert_eq!(loaded, vec![original]);
}

#[test]
fn test_ellipse_with_edge_above_left_keeps_radii() {
    // The edge may sit on any side of the center; only the radii survive.
    let original = Annotation::new(Shape::Ellipse {
        center: Point::new(100.0, 60.0),
        edge: Point::new(70.0, 45.0),
    });
    let loaded = roundtrip(std::slice::from_ref(&original));
    assert_eq!(loaded[0].id, original.id);
    assert_eq!(loaded[0].shape.radii(), original.shape.radii());
    assert_eq!(loaded[0].shape.bounds(), original.shape.bounds());
}

#[test]
fn test_circle_roundtrip_preserves_radius() {
    let original = Annotation::new(Shape::Circle {
        center: Point::new(40.0, 40.0),
        edge: Point::new(40.0, 52.0),
    });
    let loaded = roundtrip(std::slice::from_ref(&original));
    assert_eq!(loaded[0].shape.radii(), Some((12.0, 12.0)));
    assert_eq!(loaded[0].shape.bounds(), original.shape.bounds());
}

#[test]
fn test_rectangle_roundtrip() {
    let original = Annotation::new(Shape::Rectangle {
        top_left: Point::new(5.0, 6.0),
        bottom_right: Point::new(25.0, 16.0),
    })
    .with_accuracy(Some(0.25));
    let loaded = roundtrip(std::slice::from_ref(&original));
    assert_eq!(loaded, vec![original]);
}

#[test]
fn test_document_order_preserved() {
    let annotations: Vec<Annotation> = (0..5)
        .map(|i| {
            Annotation::new(Shape::Polygon {
                points: vec![Point::new(f64::from(i), 0.0)],
            })
        })
        .collect();
    let loaded = roundtrip(&annotations);
    let original_ids: Vec<_> = annotations.iter().map(|a| a.id).collect();
    let loaded_ids: Vec<_> = loaded.iter().map(|a| a.id).collect();
    assert_eq!(loaded_ids, original_ids);
}
