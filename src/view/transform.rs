//! Zoom/pan view state.
//!
//! The view maps normalized image coordinates onto the canvas with an
//! effective scale of `imscale * ratio`, where `ratio` fits the image into
//! the canvas when it is opened and `imscale` is the user's zoom on top of
//! that. Shapes are never rescaled in the store; only this mapping changes.

use crate::geometry::{self, OutsideImage};
use crate::model::{Bounds, Point};
use crate::view::pyramid::level_dimensions;

/// Default multiplicative zoom step per wheel notch.
pub const DEFAULT_ZOOM_STEP: f64 = 0.75;

/// Default upper bound of the effective scale.
pub const DEFAULT_MAX_SCALE: f64 = 20.0;

/// Pixel box in the space of one pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The part of the image that is visible in a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRegion {
    /// Pyramid level the crop refers to.
    pub level: usize,
    /// Crop box in that level's pixel space.
    pub crop: CropBox,
    /// Where the crop lands in view space.
    pub placement: Bounds,
}

/// Zoom, pan and pyramid level of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    imscale: f64,
    ratio: f64,
    origin: Point,
    image_size: (u32, u32),
    levels: usize,
    pyramid_level: usize,
    max_scale: f64,
}

impl ViewState {
    /// Create a view that fits `image_size` inside `canvas_size`.
    ///
    /// The image is anchored at the canvas origin and scaled by
    /// `min(canvas_w / img_w, canvas_h / img_h)`.
    pub fn fit(image_size: (u32, u32), canvas_size: (u32, u32)) -> Self {
        let (iw, ih) = image_size;
        let (cw, ch) = canvas_size;
        let ratio = if iw == 0 || ih == 0 || cw == 0 || ch == 0 {
            1.0
        } else {
            (f64::from(cw) / f64::from(iw)).min(f64::from(ch) / f64::from(ih))
        };

        let mut view = Self {
            imscale: 1.0,
            ratio,
            origin: Point::default(),
            image_size,
            levels: 1,
            pyramid_level: 0,
            max_scale: DEFAULT_MAX_SCALE,
        };
        view.update_level();
        view
    }

    /// Set the number of pyramid levels available.
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels.max(1);
        self.update_level();
        self
    }

    /// Set the upper bound of the effective scale.
    pub fn with_max_scale(mut self, max_scale: f64) -> Self {
        if max_scale.is_finite() && max_scale > 0.0 {
            self.max_scale = max_scale;
        } else {
            log::warn!("Ignoring invalid max scale {}", max_scale);
        }
        self
    }

    /// Effective number of view pixels per image pixel.
    pub fn scale(&self) -> f64 {
        self.imscale * self.ratio
    }

    pub fn imscale(&self) -> f64 {
        self.imscale
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// View position of the image's top-left corner.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    pub fn pyramid_level(&self) -> usize {
        self.pyramid_level
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Smallest effective scale: the coarsest level shown at half size.
    pub fn min_scale(&self) -> f64 {
        0.5_f64.powi(self.levels as i32)
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale.max(self.min_scale())
    }

    /// Zoom by `factor` keeping `pivot` (a view point) fixed on screen.
    ///
    /// The effective scale is clamped to `[min_scale, max_scale]`; the
    /// factor that was actually applied is returned so callers can rescale
    /// their view-space geometry by the same amount.
    pub fn zoom(&mut self, factor: f64, pivot: Point) -> f64 {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Ignoring invalid zoom factor {}", factor);
            return 1.0;
        }

        let scale = self.scale();
        let target = (scale * factor).clamp(self.min_scale(), self.max_scale());
        let applied = target / scale;

        self.imscale *= applied;
        self.origin = Point::new(
            pivot.x - (pivot.x - self.origin.x) * applied,
            pivot.y - (pivot.y - self.origin.y) * applied,
        );
        self.update_level();

        log::debug!(
            "Zoom x{:.3} at ({:.1}, {:.1}): scale {:.3}, level {}",
            applied,
            pivot.x,
            pivot.y,
            self.scale(),
            self.pyramid_level
        );
        applied
    }

    /// Shift the view by a view-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.origin = self.origin.translated(dx, dy);
    }

    /// Map a view point to normalized image coordinates.
    pub fn to_normalized(&self, view_point: Point) -> Result<Point, OutsideImage> {
        geometry::view_to_normalized(view_point, self.origin, self.scale(), self.image_size)
    }

    /// Map a normalized point to view coordinates.
    pub fn to_view(&self, norm_point: Point) -> Point {
        geometry::normalized_to_view(norm_point, self.origin, self.scale())
    }

    /// The whole image's box in view space.
    pub fn image_view_bounds(&self) -> Bounds {
        let (w, h) = self.image_size;
        Bounds::new(
            self.origin,
            self.to_view(Point::new(f64::from(w), f64::from(h))),
        )
    }

    /// The part of the image visible through `viewport`, as a crop box in
    /// the current pyramid level.
    ///
    /// The crop is widened to whole level pixels and `placement` is where
    /// exactly that crop lands in view space. Returns `None` when the image
    /// and the viewport do not overlap.
    pub fn visible_region(&self, viewport: Bounds) -> Option<VisibleRegion> {
        let overlap = self.image_view_bounds().intersection(&viewport)?;

        let level = self.pyramid_level;
        let (lw, lh) = level_dimensions(self.image_size, level);
        // View pixels per pixel of the selected level
        let level_scale = self.scale() * 2.0_f64.powi(level as i32);

        let to_level = |v: f64, o: f64| (v - o) / level_scale;
        let x0 = to_level(overlap.top_left.x, self.origin.x).floor().clamp(0.0, f64::from(lw));
        let y0 = to_level(overlap.top_left.y, self.origin.y).floor().clamp(0.0, f64::from(lh));
        let x1 = to_level(overlap.bottom_right.x, self.origin.x).ceil().clamp(0.0, f64::from(lw));
        let y1 = to_level(overlap.bottom_right.y, self.origin.y).ceil().clamp(0.0, f64::from(lh));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let placement = Bounds::new(
            Point::new(self.origin.x + x0 * level_scale, self.origin.y + y0 * level_scale),
            Point::new(self.origin.x + x1 * level_scale, self.origin.y + y1 * level_scale),
        );

        Some(VisibleRegion {
            level,
            crop: CropBox {
                x: x0 as u32,
                y: y0 as u32,
                width: (x1 - x0) as u32,
                height: (y1 - y0) as u32,
            },
            placement,
        })
    }

    /// `clamp(-floor(log2(scale)), 0, levels - 1)`
    fn update_level(&mut self) {
        let raw = -self.scale().log2().floor();
        let max_level = (self.levels - 1) as f64;
        self.pyramid_level = raw.clamp(0.0, max_level) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn unrounded_normalized(view: &ViewState, p: Point) -> Point {
        Point::new(
            (p.x - view.origin().x) / view.scale(),
            (p.y - view.origin().y) / view.scale(),
        )
    }

    #[test]
    fn test_fit_ratio() {
        let view = ViewState::fit((2000, 1000), (1000, 1000)).with_levels(3);
        assert!(approx_eq(view.ratio(), 0.5));
        assert!(approx_eq(view.scale(), 0.5));
        assert_eq!(view.pyramid_level(), 1);
    }

    #[test]
    fn test_fit_degenerate_sizes() {
        let view = ViewState::fit((0, 0), (800, 600));
        assert_eq!(view.ratio(), 1.0);
    }

    #[test]
    fn test_zoom_keeps_pivot_fixed() {
        let mut view = ViewState::fit((400, 400), (400, 400));
        view.pan(30.0, -10.0);
        let pivot = Point::new(150.0, 120.0);
        let before = unrounded_normalized(&view, pivot);

        let applied = view.zoom(1.0 / DEFAULT_ZOOM_STEP, pivot);

        let after = unrounded_normalized(&view, pivot);
        assert!(approx_eq(applied, 1.0 / DEFAULT_ZOOM_STEP));
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_zoom_clamps_at_max() {
        let mut view = ViewState::fit((100, 100), (100, 100));
        let applied = view.zoom(100.0, Point::new(0.0, 0.0));
        assert!(approx_eq(applied, DEFAULT_MAX_SCALE));
        assert!(approx_eq(view.scale(), DEFAULT_MAX_SCALE));

        let again = view.zoom(2.0, Point::new(0.0, 0.0));
        assert!(approx_eq(again, 1.0));
    }

    #[test]
    fn test_zoom_clamps_at_min() {
        let mut view = ViewState::fit((100, 100), (100, 100));
        let applied = view.zoom(0.1, Point::new(50.0, 50.0));
        assert!(approx_eq(applied, 0.5));
        assert!(approx_eq(view.scale(), view.min_scale()));
        assert!(view.imscale() > 0.0);
    }

    #[test]
    fn test_invalid_zoom_factor_is_ignored() {
        let mut view = ViewState::fit((100, 100), (100, 100));
        assert_eq!(view.zoom(0.0, Point::new(0.0, 0.0)), 1.0);
        assert_eq!(view.zoom(f64::NAN, Point::new(0.0, 0.0)), 1.0);
        assert_eq!(view.scale(), 1.0);
    }

    #[test]
    fn test_pyramid_level_follows_scale() {
        let mut view = ViewState::fit((1000, 1000), (1000, 1000)).with_levels(4);
        assert_eq!(view.pyramid_level(), 0);

        view.zoom(0.75, Point::new(0.0, 0.0));
        // scale 0.75
        assert_eq!(view.pyramid_level(), 1);
        view.zoom(0.75, Point::new(0.0, 0.0));
        // scale 0.5625
        assert_eq!(view.pyramid_level(), 1);
        view.zoom(0.75, Point::new(0.0, 0.0));
        // scale 0.421875
        assert_eq!(view.pyramid_level(), 2);

        view.zoom(0.01, Point::new(0.0, 0.0));
        assert_eq!(view.pyramid_level(), 3);

        view.zoom(1000.0, Point::new(0.0, 0.0));
        assert_eq!(view.pyramid_level(), 0);
    }

    #[test]
    fn test_pan_shifts_origin() {
        let mut view = ViewState::fit((100, 100), (100, 100));
        view.pan(5.0, -10.0);
        assert_eq!(view.origin(), Point::new(5.0, -10.0));
        assert_eq!(view.scale(), 1.0);
    }

    #[test]
    fn test_to_normalized_and_back() {
        let mut view = ViewState::fit((200, 200), (400, 400));
        view.pan(20.0, 30.0);
        let norm = view.to_normalized(Point::new(220.0, 130.0)).unwrap();
        assert_eq!(norm, Point::new(100.0, 50.0));
        assert_eq!(view.to_view(norm), Point::new(220.0, 130.0));
        assert!(view.to_normalized(Point::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn test_visible_region_level_zero() {
        let view = ViewState::fit((200, 100), (200, 100));
        let viewport = Bounds::new(Point::new(50.0, 20.0), Point::new(150.0, 80.0));
        let region = view.visible_region(viewport).unwrap();
        assert_eq!(region.level, 0);
        assert_eq!(
            region.crop,
            CropBox {
                x: 50,
                y: 20,
                width: 100,
                height: 60,
            }
        );
        assert_eq!(region.placement, viewport);
    }

    #[test]
    fn test_visible_region_coarse_level() {
        let view = ViewState::fit((400, 200), (200, 100)).with_levels(2);
        assert_eq!(view.pyramid_level(), 1);
        let viewport = Bounds::new(Point::new(0.0, 0.0), Point::new(200.0, 100.0));
        let region = view.visible_region(viewport).unwrap();
        assert_eq!(region.level, 1);
        assert_eq!(
            region.crop,
            CropBox {
                x: 0,
                y: 0,
                width: 200,
                height: 100,
            }
        );
    }

    #[test]
    fn test_visible_region_clipped_by_image() {
        let mut view = ViewState::fit((100, 100), (100, 100));
        view.pan(60.0, 0.0);
        let viewport = Bounds::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let region = view.visible_region(viewport).unwrap();
        assert_eq!(region.crop.x, 0);
        assert_eq!(region.crop.width, 40);
        assert_eq!(region.placement.top_left, Point::new(60.0, 0.0));
    }

    #[test]
    fn test_visible_region_no_overlap() {
        let mut view = ViewState::fit((100, 100), (100, 100));
        view.pan(-1000.0, 0.0);
        let viewport = Bounds::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert!(view.visible_region(viewport).is_none());
    }
}
