//! Polygon union (combine) and polygon splitting (cut).
//!
//! Both operations take shapes that were already tessellated into point
//! sequences (see [`crate::model::Shape::outline`]) and work purely in
//! normalized coordinates, so their results do not depend on the zoom level.
//! The polygon algebra itself is delegated to [`geo`].
//!
//! `geo` rounds its output onto an internal grid, so every result vertex is
//! snapped back onto the exact input vertex or cut point it came from. Cut
//! pieces therefore share identical edges and combine back into one region.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use thiserror::Error;

use crate::model::{Bounds, MIN_AREA_VERTICES, Point};

/// Regions smaller than this (in square pixels) are treated as slivers
/// produced by floating-point noise and dropped.
const AREA_EPSILON: f64 = 1e-6;

/// Snap distance as a fraction of the working extent.
const SNAP_RELATIVE: f64 = 1e-6;

/// Errors from combine and cut.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BooleanOpError {
    /// The union does not form one connected region
    #[error("union is split into {parts} disconnected regions")]
    Unresolved {
        /// Number of disjoint regions in the union
        parts: usize,
    },

    /// An input cannot enclose an area
    #[error("polygon has {count} vertices, at least {MIN_AREA_VERTICES} are needed")]
    TooFewVertices {
        /// Number of vertices the input had
        count: usize,
    },

    /// Nothing to operate on, or the result has no area
    #[error("operation produced no area")]
    Empty,
}

/// Union of all `polygons` as a single boundary.
///
/// Succeeds only when the inputs overlap or touch transitively, returning
/// the outer boundary of the merged region. A disconnected union is reported
/// as [`BooleanOpError::Unresolved`] instead of silently picking one part.
pub fn combine(polygons: &[Vec<Point>]) -> Result<Vec<Point>, BooleanOpError> {
    let Some((first, rest)) = polygons.split_first() else {
        return Err(BooleanOpError::Empty);
    };
    for polygon in polygons {
        check_vertices(polygon)?;
    }

    let anchors: Vec<Point> = polygons.iter().flatten().copied().collect();
    let extent = Bounds::enclosing(&anchors)
        .map(|b| b.width().max(b.height()))
        .unwrap_or_default();

    let mut merged = MultiPolygon::new(vec![to_geo(first)]);
    for polygon in rest {
        merged = merged.union(&MultiPolygon::new(vec![to_geo(polygon)]));
    }

    let parts: Vec<&Polygon<f64>> = merged
        .0
        .iter()
        .filter(|part| part.unsigned_area() > AREA_EPSILON)
        .collect();

    log::debug!(
        "Combined {} polygons into {} region(s)",
        polygons.len(),
        parts.len()
    );

    match parts.as_slice() {
        [] => Err(BooleanOpError::Empty),
        [single] => Ok(snap(from_geo(single), &anchors, snap_tolerance(extent))),
        _ => Err(BooleanOpError::Unresolved { parts: parts.len() }),
    }
}

/// Split `polygon` along the infinite line through `line.0` and `line.1`.
///
/// Returns every resulting piece. When the line does not bisect the interior
/// (it misses the polygon, only grazes an edge, or its two points coincide)
/// the original polygon comes back unchanged as the only element.
pub fn cut(polygon: &[Point], line: (Point, Point)) -> Result<Vec<Vec<Point>>, BooleanOpError> {
    check_vertices(polygon)?;

    let (a, b) = line;
    let length = a.distance_to(&b);
    if length == 0.0 {
        return Ok(vec![polygon.to_vec()]);
    }

    let direction = ((b.x - a.x) / length, (b.y - a.y) / length);
    let normal = (-direction.1, direction.0);
    // Every vertex lies within half of this distance from `a`
    let reach = polygon
        .iter()
        .map(|p| p.distance_to(&a))
        .fold(0.0, f64::max)
        * 2.0
        + 1.0;

    let anchors = cut_anchors(polygon, a, direction);
    let tolerance = snap_tolerance(reach);

    let subject = to_geo(polygon);
    let mut pieces = Vec::new();
    for side in [1.0, -1.0] {
        let half_plane = half_plane(a, direction, (normal.0 * side, normal.1 * side), reach);
        pieces.extend(
            subject
                .intersection(&half_plane)
                .0
                .iter()
                .filter(|part| part.unsigned_area() > AREA_EPSILON)
                .map(|part| snap(from_geo(part), &anchors, tolerance))
                .filter(|piece| piece.len() >= MIN_AREA_VERTICES),
        );
    }

    log::debug!("Cut produced {} piece(s)", pieces.len());

    if pieces.len() < 2 {
        return Ok(vec![polygon.to_vec()]);
    }
    Ok(pieces)
}

fn check_vertices(polygon: &[Point]) -> Result<(), BooleanOpError> {
    if polygon.len() < MIN_AREA_VERTICES {
        return Err(BooleanOpError::TooFewVertices {
            count: polygon.len(),
        });
    }
    Ok(())
}

/// Quad covering the side of the line through `origin` that `normal` points to.
fn half_plane(origin: Point, direction: (f64, f64), normal: (f64, f64), reach: f64) -> Polygon<f64> {
    let start = origin.translated(-direction.0 * reach, -direction.1 * reach);
    let end = origin.translated(direction.0 * reach, direction.1 * reach);
    to_geo(&[
        start,
        end,
        end.translated(normal.0 * reach, normal.1 * reach),
        start.translated(normal.0 * reach, normal.1 * reach),
    ])
}

/// The polygon's vertices plus every point where the line through `origin`
/// along `direction` crosses one of its edges.
fn cut_anchors(polygon: &[Point], origin: Point, direction: (f64, f64)) -> Vec<Point> {
    let side = |p: &Point| direction.0 * (p.y - origin.y) - direction.1 * (p.x - origin.x);

    let mut anchors = polygon.to_vec();
    for (i, p) in polygon.iter().enumerate() {
        let q = &polygon[(i + 1) % polygon.len()];
        let (sp, sq) = (side(p), side(q));
        if (sp < 0.0 && sq > 0.0) || (sp > 0.0 && sq < 0.0) {
            let t = sp / (sp - sq);
            anchors.push(Point::new(p.x + (q.x - p.x) * t, p.y + (q.y - p.y) * t));
        }
    }
    anchors
}

fn snap_tolerance(extent: f64) -> f64 {
    extent.max(1.0) * SNAP_RELATIVE
}

/// Move every vertex onto the nearest anchor within `tolerance`, then drop
/// the repeated vertices that leaves behind.
fn snap(points: Vec<Point>, anchors: &[Point], tolerance: f64) -> Vec<Point> {
    let mut snapped: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        let p = anchors
            .iter()
            .map(|anchor| (anchor, anchor.distance_to(&p)))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .map_or(p, |(anchor, _)| *anchor);
        if snapped.last() != Some(&p) {
            snapped.push(p);
        }
    }
    while snapped.len() > 1 && snapped.first() == snapped.last() {
        snapped.pop();
    }
    snapped
}

fn to_geo(points: &[Point]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    Polygon::new(LineString::new(coords), vec![])
}

/// Exterior ring as an open point sequence (closing vertex removed).
fn from_geo(polygon: &Polygon<f64>) -> Vec<Point> {
    let mut points: Vec<Point> = polygon
        .exterior()
        .coords()
        .map(|c| Point::new(c.x, c.y))
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}
