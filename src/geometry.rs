//! Geometry kernel.
//!
//! Pure functions that turn the two anchors of a drag gesture into the
//! canonical box of each shape kind, tessellate ovals and rectangles into
//! closed point sequences, and map points between view and normalized
//! (image) coordinates.
//!
//! Normalized coordinates produced here are rounded to whole pixels, so the
//! exact comparisons used to detect flat shapes stay exact.

use thiserror::Error;

use crate::model::{Bounds, Point};

/// Default number of samples used when an oval is turned into a polygon.
pub const DEFAULT_OVAL_STEPS: usize = 20;

/// A view point mapped outside the image.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("point ({x:.1}, {y:.1}) lies outside the image")]
pub struct OutsideImage {
    /// Normalized x coordinate that was rejected
    pub x: f64,
    /// Normalized y coordinate that was rejected
    pub y: f64,
}

/// Box of an ellipse whose center is `p0` and whose far control point is `p1`.
///
/// `p1` is reflected through `p0`, so the half extents are `|p1.x - p0.x|`
/// and `|p1.y - p0.y|`. An axis on which both anchors agree collapses to
/// zero width at `p0`.
pub fn canonical_ellipse(p0: Point, p1: Point) -> Bounds {
    let dx = (p1.x - p0.x).abs();
    let dy = (p1.y - p0.y).abs();
    Bounds::new(
        Point::new(p0.x - dx, p0.y - dy),
        Point::new(p0.x + dx, p0.y + dy),
    )
}

/// Box of a circle centered on `p0` passing through `p1`.
pub fn canonical_circle(p0: Point, p1: Point) -> Bounds {
    let radius = p0.distance_to(&p1);
    Bounds::new(
        Point::new(p0.x - radius, p0.y - radius),
        Point::new(p0.x + radius, p0.y + radius),
    )
}

/// Box spanned by two opposite corners, whatever the drag direction was.
pub fn canonical_rectangle(p0: Point, p1: Point) -> Bounds {
    Bounds::new(
        Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
        Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
    )
}

/// Sample `steps` points around the ellipse inscribed in `bounds`.
///
/// Points are taken at equal angular increments starting on the positive x
/// axis, rotated counter-clockwise by `rotation_degrees` about the center and
/// rounded to whole pixels.
pub fn tessellate_oval(bounds: Bounds, steps: usize, rotation_degrees: f64) -> Vec<Point> {
    let rotation = rotation_degrees * std::f64::consts::PI / 180.0;
    let (sin_r, cos_r) = rotation.sin_cos();

    let a = bounds.width() / 2.0;
    let b = bounds.height() / 2.0;
    let center = bounds.center();

    let dtheta = 2.0 * std::f64::consts::PI / steps.max(1) as f64;

    (0..steps)
        .map(|i| {
            let theta = dtheta * i as f64;
            let xbr = a * theta.cos();
            let ybr = b * theta.sin();
            Point::new(
                center.x + cos_r * xbr - sin_r * ybr,
                center.y + sin_r * xbr + cos_r * ybr,
            )
            .rounded()
        })
        .collect()
}

/// The four corners of `bounds`: top-left, top-right, bottom-right, bottom-left.
pub fn tessellate_rectangle(bounds: Bounds) -> [Point; 4] {
    let Bounds {
        top_left: tl,
        bottom_right: br,
    } = bounds;
    [
        tl,
        Point::new(br.x, tl.y),
        br,
        Point::new(tl.x, br.y),
    ]
}

/// Map a view point to normalized image coordinates.
///
/// `origin` is where the image's top-left corner currently sits in view
/// space and `scale` is the number of view pixels per image pixel.
pub fn view_to_normalized(
    view_point: Point,
    origin: Point,
    scale: f64,
    image_size: (u32, u32),
) -> Result<Point, OutsideImage> {
    let p = Point::new(
        (view_point.x - origin.x) / scale,
        (view_point.y - origin.y) / scale,
    )
    .rounded();

    let (width, height) = image_size;
    if p.x < 0.0 || p.y < 0.0 || p.x > f64::from(width) || p.y > f64::from(height) {
        return Err(OutsideImage { x: p.x, y: p.y });
    }
    Ok(p)
}

/// Map a normalized point to view coordinates, keeping sub-pixel precision.
pub fn normalized_to_view(norm_point: Point, origin: Point, scale: f64) -> Point {
    Point::new(
        norm_point.x * scale + origin.x,
        norm_point.y * scale + origin.y,
    )
}

/// Box of the given size centered on `center`.
///
/// Half dimensions are truncated toward zero, matching the integer pixel
/// grid shapes are anchored on.
pub fn center_from_dimensions(center: Point, width: f64, height: f64) -> Bounds {
    let half_w = (width / 2.0).trunc();
    let half_h = (height / 2.0).trunc();
    Bounds::new(
        Point::new(center.x - half_w, center.y - half_h),
        Point::new(center.x + half_w, center.y + half_h),
    )
}

/// Unsigned area of the closed polygon through `points` (shoelace formula).
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x * q.y - q.x * p.y;
    }
    (twice_area / 2.0).abs()
}

/// Average of the vertices, used as the grab point of a polygon.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}
