//! Tests for reading interchange documents.

use uuid::Uuid;

use crate::format::{FormatError, LoadPolicy, ShapeEntry, parse_document, write_document};
use crate::model::{Annotation, Point, Shape, ShapeKind};

const ELLIPSE_AND_POLYGON: &str = r#"[
    {
        "type": "ellipse",
        "id": "2f1c8f5e-7a4b-4d38-9a8e-3b6f0c1d2e4f",
        "center": {"x": 120, "y": 80},
        "radiusX": 30,
        "radiusY": 12,
        "angleOfRotation": 0,
        "area": 1130.9,
        "accuracy": 0.87
    },
    {
        "type": "polygon",
        "points": [{"x": 1.5, "y": 1}, {"x": 9, "y": 1}, {"x": 5, "y": 7.25}]
    }
]"#;

#[test]
fn test_load_ellipse_and_polygon() {
    let annotations = parse_document(ELLIPSE_AND_POLYGON.as_bytes(), LoadPolicy::Strict).unwrap();
    assert_eq!(annotations.len(), 2);

    let ellipse = &annotations[0];
    assert_eq!(ellipse.kind(), ShapeKind::Ellipse);
    assert_eq!(
        ellipse.id,
        Uuid::parse_str("2f1c8f5e-7a4b-4d38-9a8e-3b6f0c1d2e4f").unwrap()
    );
    assert_eq!(
        ellipse.shape,
        Shape::Ellipse {
            center: Point::new(120.0, 80.0),
            edge: Point::new(150.0, 92.0),
        }
    );
    assert_eq!(ellipse.shape.radii(), Some((30.0, 12.0)));
    assert_eq!(ellipse.area, Some(1130.9));
    assert_eq!(ellipse.accuracy, Some(0.87));

    let polygon = &annotations[1];
    assert_eq!(polygon.kind(), ShapeKind::Polygon);
    assert_eq!(
        polygon.shape,
        Shape::Polygon {
            points: vec![
                Point::new(1.5, 1.0),
                Point::new(9.0, 1.0),
                Point::new(5.0, 7.25),
            ],
        }
    );
    assert!(polygon.area.is_none());
}

#[test]
fn test_missing_id_is_generated() {
    let json = r#"[{"type": "polygon", "points": [{"x": 1, "y": 1}]},
                   {"type": "polygon", "points": [{"x": 2, "y": 2}]}]"#;
    let annotations = parse_document(json.as_bytes(), LoadPolicy::Strict).unwrap();
    assert_ne!(annotations[0].id, annotations[1].id);
}

#[test]
fn test_circle_fields() {
    let json = r#"[{"type": "circle", "center": {"x": 50, "y": 50}, "radiusX": 10, "radiusY": 10}]"#;
    let annotations = parse_document(json.as_bytes(), LoadPolicy::Strict).unwrap();
    assert_eq!(annotations[0].kind(), ShapeKind::Circle);
    assert_eq!(annotations[0].shape.radii(), Some((10.0, 10.0)));
}

#[test]
fn test_rectangle_fields() {
    let json = r#"[{"type": "rectangle", "coords": [10, 20], "width": 30, "height": 40}]"#;
    let annotations = parse_document(json.as_bytes(), LoadPolicy::Strict).unwrap();
    assert_eq!(
        annotations[0].shape,
        Shape::Rectangle {
            top_left: Point::new(10.0, 20.0),
            bottom_right: Point::new(40.0, 60.0),
        }
    );
}

#[test]
fn test_unknown_type_fails_strict_load() {
    let json = r#"[{"type": "polygon", "points": [{"x": 1, "y": 1}]},
                   {"type": "hexagon", "side": 4}]"#;
    let err = parse_document(json.as_bytes(), LoadPolicy::Strict).unwrap_err();
    match err {
        FormatError::UnsupportedShape { shape } => assert_eq!(shape, "hexagon"),
        other => panic!("Expected UnsupportedShape, got {:?}", other),
    }
}

#[test]
fn test_unknown_type_skipped_when_lenient() {
    let json = r#"[{"type": "hexagon", "side": 4},
                   {"type": "polygon", "points": [{"x": 1, "y": 1}]}]"#;
    let annotations = parse_document(json.as_bytes(), LoadPolicy::Lenient).unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].kind(), ShapeKind::Polygon);
}

#[test]
fn test_missing_type_field() {
    let json = r#"[{"points": [{"x": 1, "y": 1}]}]"#;
    let err = parse_document(json.as_bytes(), LoadPolicy::Lenient).unwrap_err();
    assert!(matches!(err, FormatError::MissingField { ref field } if field == "type"));
}

#[test]
fn test_missing_shape_field_is_json_error() {
    let json = r#"[{"type": "ellipse", "center": {"x": 1, "y": 1}, "radiusX": 3}]"#;
    let err = parse_document(json.as_bytes(), LoadPolicy::Strict).unwrap_err();
    assert!(matches!(err, FormatError::Json(_)));
}

#[test]
fn test_empty_polygon_rejected() {
    let json = r#"[{"type": "polygon", "points": []}]"#;
    let err = parse_document(json.as_bytes(), LoadPolicy::Strict).unwrap_err();
    assert!(matches!(err, FormatError::InvalidCoordinates { .. }));
}

#[test]
fn test_negative_radius_rejected() {
    let json = r#"[{"type": "ellipse", "center": {"x": 1, "y": 1}, "radiusX": -3, "radiusY": 2}]"#;
    let err = parse_document(json.as_bytes(), LoadPolicy::Strict).unwrap_err();
    assert!(matches!(err, FormatError::InvalidCoordinates { .. }));
}

#[test]
fn test_not_an_array() {
    let err = parse_document(br#"{"type": "polygon"}"#, LoadPolicy::Strict).unwrap_err();
    assert!(matches!(err, FormatError::Json(_)));
}

#[test]
fn test_written_fields() {
    let ellipse = Annotation::new(Shape::Ellipse {
        center: Point::new(10.0, 10.0),
        edge: Point::new(15.7, 2.0),
    });
    let circle = Annotation::new(Shape::Circle {
        center: Point::new(0.0, 0.0),
        edge: Point::new(3.0, 4.0),
    })
    .with_accuracy(Some(0.5));

    let bytes = write_document([&ellipse, &circle]).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value[0]["type"], "ellipse");
    assert_eq!(value[0]["radiusX"], 5.0);
    assert_eq!(value[0]["radiusY"], 8.0);
    assert_eq!(value[0]["angleOfRotation"], 0.0);
    assert_eq!(value[0]["id"], ellipse.id.to_string());
    assert!(value[0].get("area").is_none());
    assert!(value[0].get("accuracy").is_none());

    assert_eq!(value[1]["type"], "circle");
    assert_eq!(value[1]["radiusX"], 5.0);
    assert_eq!(value[1]["radiusY"], 5.0);
    assert_eq!(value[1]["accuracy"], 0.5);
}

#[test]
fn test_entry_kind_matches_annotation() {
    let rect = Annotation::new(Shape::Rectangle {
        top_left: Point::new(0.0, 0.0),
        bottom_right: Point::new(2.0, 3.0),
    });
    assert_eq!(ShapeEntry::from_annotation(&rect).kind(), ShapeKind::Rectangle);
}
