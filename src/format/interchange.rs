//! JSON interchange format.
//!
//! A document is a JSON array of shape objects. Every object carries a
//! `type` (`ellipse`, `circle`, `rectangle` or `polygon`), an optional `id`
//! (UUID string, generated when absent), optional `area` and `accuracy`, and
//! the fields of its kind:
//!
//! ```json
//! [
//!   {"type": "ellipse", "center": {"x": 120, "y": 80}, "radiusX": 30, "radiusY": 12, "angleOfRotation": 0},
//!   {"type": "rectangle", "coords": [10, 10], "width": 40, "height": 25},
//!   {"type": "polygon", "points": [{"x": 1, "y": 1}, {"x": 9, "y": 1}, {"x": 5, "y": 7}]}
//! ]
//! ```
//!
//! All coordinates are normalized image coordinates. Oval radii are written
//! floored to whole pixels.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::format::error::FormatError;
use crate::geometry::canonical_rectangle;
use crate::model::{Annotation, Point, Shape, ShapeKind};

/// How a document with an unknown shape `type` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Fail the whole load
    #[default]
    Strict,
    /// Skip the entry with a warning
    Lenient,
}

/// Fields of an ellipse or circle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvalEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    /// Always written as 0; read but unused.
    #[serde(default)]
    pub angle_of_rotation: f64,
}

/// Fields of a rectangle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Top-left corner as `[x, y]`.
    pub coords: [f64; 2],
    pub width: f64,
    pub height: f64,
}

/// Fields of a polygon entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    pub points: Vec<Point>,
}

/// One entry of an interchange document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeEntry {
    Ellipse(OvalEntry),
    Circle(OvalEntry),
    Rectangle(RectangleEntry),
    Polygon(PolygonEntry),
}

impl ShapeEntry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeEntry::Ellipse(_) => ShapeKind::Ellipse,
            ShapeEntry::Circle(_) => ShapeKind::Circle,
            ShapeEntry::Rectangle(_) => ShapeKind::Rectangle,
            ShapeEntry::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Convert a stored annotation into its interchange entry.
    pub fn from_annotation(annotation: &Annotation) -> Self {
        let id = Some(annotation.id);
        let area = annotation.area;
        let accuracy = annotation.accuracy;

        match &annotation.shape {
            Shape::Ellipse { center, edge } => ShapeEntry::Ellipse(OvalEntry {
                id,
                area,
                accuracy,
                center: *center,
                radius_x: (edge.x - center.x).abs().floor(),
                radius_y: (edge.y - center.y).abs().floor(),
                angle_of_rotation: 0.0,
            }),
            Shape::Circle { center, edge } => {
                let radius = center.distance_to(edge).floor();
                ShapeEntry::Circle(OvalEntry {
                    id,
                    area,
                    accuracy,
                    center: *center,
                    radius_x: radius,
                    radius_y: radius,
                    angle_of_rotation: 0.0,
                })
            }
            Shape::Rectangle {
                top_left,
                bottom_right,
            } => ShapeEntry::Rectangle(RectangleEntry {
                id,
                area,
                accuracy,
                coords: [top_left.x, top_left.y],
                width: bottom_right.x - top_left.x,
                height: bottom_right.y - top_left.y,
            }),
            Shape::Polygon { points } => ShapeEntry::Polygon(PolygonEntry {
                id,
                area,
                accuracy,
                points: points.clone(),
            }),
        }
    }

    /// Convert the entry into an annotation, generating an id when the entry
    /// has none.
    pub fn into_annotation(self) -> Result<Annotation, FormatError> {
        let (id, area, accuracy, shape) = match self {
            ShapeEntry::Ellipse(oval) => {
                let shape = oval_shape(ShapeKind::Ellipse, &oval)?;
                (oval.id, oval.area, oval.accuracy, shape)
            }
            ShapeEntry::Circle(oval) => {
                let shape = oval_shape(ShapeKind::Circle, &oval)?;
                (oval.id, oval.area, oval.accuracy, shape)
            }
            ShapeEntry::Rectangle(rect) => {
                let [x, y] = rect.coords;
                let top_left = Point::new(x, y);
                ensure_finite(&[top_left, Point::new(rect.width, rect.height)])?;
                let b = canonical_rectangle(top_left, top_left.translated(rect.width, rect.height));
                let shape = Shape::Rectangle {
                    top_left: b.top_left,
                    bottom_right: b.bottom_right,
                };
                (rect.id, rect.area, rect.accuracy, shape)
            }
            ShapeEntry::Polygon(poly) => {
                if poly.points.is_empty() {
                    return Err(FormatError::invalid_coordinates(
                        "polygon needs at least one point",
                    ));
                }
                ensure_finite(&poly.points)?;
                let shape = Shape::Polygon {
                    points: poly.points,
                };
                (poly.id, poly.area, poly.accuracy, shape)
            }
        };

        if let Some(acc) = accuracy {
            if !(0.0..=1.0).contains(&acc) {
                log::warn!("Accuracy {} is outside [0, 1]", acc);
            }
        }

        Ok(Annotation::with_id(id.unwrap_or_else(Uuid::new_v4), shape)
            .with_area(area)
            .with_accuracy(accuracy))
    }
}

fn oval_shape(kind: ShapeKind, oval: &OvalEntry) -> Result<Shape, FormatError> {
    ensure_finite(&[oval.center, Point::new(oval.radius_x, oval.radius_y)])?;
    if oval.radius_x < 0.0 || oval.radius_y < 0.0 {
        return Err(FormatError::invalid_coordinates(format!(
            "negative radius ({}, {})",
            oval.radius_x, oval.radius_y
        )));
    }

    let center = oval.center;
    Ok(match kind {
        ShapeKind::Circle => Shape::Circle {
            center,
            edge: center.translated(oval.radius_x, 0.0),
        },
        _ => Shape::Ellipse {
            center,
            edge: center.translated(oval.radius_x, oval.radius_y),
        },
    })
}

fn ensure_finite(points: &[Point]) -> Result<(), FormatError> {
    match points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
        Some(p) => Err(FormatError::invalid_coordinates(format!(
            "non-finite value ({}, {})",
            p.x, p.y
        ))),
        None => Ok(()),
    }
}

/// Parse a whole document.
///
/// The document is validated completely before anything is returned, so a
/// failing entry never leaves a partial result behind.
pub fn parse_document(bytes: &[u8], policy: LoadPolicy) -> Result<Vec<Annotation>, FormatError> {
    let values: Vec<Value> = serde_json::from_slice(bytes)?;
    let mut annotations = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let type_name = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| FormatError::missing_field("type"))?;

        if ShapeKind::parse(&type_name).is_none() {
            match policy {
                LoadPolicy::Strict => return Err(FormatError::unsupported_shape(type_name)),
                LoadPolicy::Lenient => {
                    log::warn!("Skipping entry {} with unsupported type '{}'", index, type_name);
                    continue;
                }
            }
        }

        let entry: ShapeEntry = serde_json::from_value(value)?;
        annotations.push(entry.into_annotation()?);
    }

    Ok(annotations)
}

/// Serialize annotations, in the given order, into a document.
pub fn write_document<'a>(
    annotations: impl IntoIterator<Item = &'a Annotation>,
) -> Result<Vec<u8>, FormatError> {
    let entries: Vec<ShapeEntry> = annotations
        .into_iter()
        .map(ShapeEntry::from_annotation)
        .collect();
    Ok(serde_json::to_vec_pretty(&entries)?)
}

/// Read and parse a document from disk.
pub fn read_file(path: &Path, policy: LoadPolicy) -> Result<Vec<Annotation>, FormatError> {
    log::info!("Importing annotations from {:?}", path);
    let bytes = std::fs::read(path)?;
    let annotations = parse_document(&bytes, policy)?;
    log::info!("Imported {} annotations", annotations.len());
    Ok(annotations)
}

/// Write a document to disk.
pub fn write_file<'a>(
    path: &Path,
    annotations: impl IntoIterator<Item = &'a Annotation>,
) -> Result<(), FormatError> {
    log::info!("Exporting annotations to {:?}", path);
    let bytes = write_document(annotations)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
