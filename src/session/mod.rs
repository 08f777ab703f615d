//! Interaction session.
//!
//! [`InteractionSession`] owns everything a drawing session mutates: the
//! annotation store, the view state and pyramid, the canvas with its
//! `id -> handle` map, the current mode and shape kind, the gesture in
//! progress and the selection sets. Hosts translate their input events into
//! the gesture methods ([`click`](InteractionSession::click),
//! [`pointer_moved`](InteractionSession::pointer_moved),
//! [`commit`](InteractionSession::commit)) and the commands below; every
//! gesture reports what it did as an [`Outcome`] instead of failing.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut session = InteractionSession::new(canvas, &config, (1024, 768));
//! session.open_image(Path::new("slide.png"))?;
//! session.set_shape_kind(ShapeKind::Polygon);
//! session.click(Point::new(100.0, 100.0));
//! session.click(Point::new(180.0, 110.0));
//! session.click(Point::new(150.0, 190.0));
//! session.commit();
//! session.save(Path::new("slide.json"))?;
//! ```

mod canvas;
mod error;
mod mode;
mod selection;


pub use canvas::{Canvas, Style, ViewGeometry};
pub use error::SessionError;
pub use mode::{Mode, ZoomDirection};
pub use selection::{Selection, SelectionSet, Toggle};

use std::collections::HashMap;
use std::path::Path;

use image::DynamicImage;
use uuid::Uuid;

use crate::boolean_ops::{self, BooleanOpError};
use crate::config::{AnnotatorConfig, Preferences, StyleConfig};
use crate::format;
use crate::model::{Annotation, Bounds, Point, Shape, ShapeKind};
use crate::store::{AnnotationStore, StoreError};
use crate::view::{ImagePyramid, ViewState};

/// What a gesture did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing changed
    Ignored,
    /// An anchor was recorded; the gesture needs more input
    Pending { anchors: usize },
    /// The live preview was redrawn
    Previewed,
    Created(Uuid),
    /// Pending anchors were dropped without creating a shape
    Discarded,
    Selected { id: Uuid, set: SelectionSet },
    Deselected { id: Uuid, set: SelectionSet },
    Moved(Uuid),
    Deleted(Vec<Uuid>),
    Combined { removed: Vec<Uuid>, created: Uuid },
    Cut { original: Uuid, pieces: Vec<Uuid> },
    /// The cut line did not split the shape
    Unchanged(Uuid),
    /// Combine or cut could not produce a result; nothing was changed
    Rejected(BooleanOpError),
}

/// Gesture in progress. Points are normalized.
#[derive(Debug)]
struct Gesture<H> {
    anchors: Vec<Point>,
    /// Last pointer position while the gesture is open
    pointer: Option<Point>,
    preview: Option<H>,
}

impl<H> Default for Gesture<H> {
    fn default() -> Self {
        Self {
            anchors: Vec::new(),
            pointer: None,
            preview: None,
        }
    }
}

/// One image, its annotations and the interaction state around them.
pub struct InteractionSession<C: Canvas> {
    canvas: C,
    store: AnnotationStore,
    view: Option<ViewState>,
    pyramid: Option<ImagePyramid>,
    canvas_size: (u32, u32),
    handles: HashMap<Uuid, C::Handle>,
    mode: Mode,
    shape_kind: ShapeKind,
    gesture: Gesture<C::Handle>,
    selection: Selection,
    visible: bool,
    preferences: Preferences,
    styles: StyleConfig,
}

impl<C: Canvas> InteractionSession<C> {
    pub fn new(canvas: C, config: &AnnotatorConfig, canvas_size: (u32, u32)) -> Self {
        Self {
            canvas,
            store: AnnotationStore::new(),
            view: None,
            pyramid: None,
            canvas_size,
            handles: HashMap::new(),
            mode: Mode::default(),
            shape_kind: ShapeKind::default(),
            gesture: Gesture::default(),
            selection: Selection::new(),
            visible: true,
            preferences: config.preferences.clone(),
            styles: config.styles.clone(),
        }
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// `None` until an image is opened.
    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    pub fn pyramid(&self) -> Option<&ImagePyramid> {
        self.pyramid.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape_kind
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Canvas handle currently drawing annotation `id`.
    pub fn handle(&self, id: Uuid) -> Option<C::Handle> {
        self.handles.get(&id).copied()
    }

    /// Anchors of the gesture in progress.
    pub fn pending_anchors(&self) -> &[Point] {
        &self.gesture.anchors
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Switch mode. The gesture in progress is flushed first.
    pub fn set_mode(&mut self, mode: Mode) -> Outcome {
        let outcome = self.flush();
        if self.mode != mode {
            log::debug!("🖌️ Mode: {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        outcome
    }

    /// Switch the kind of shape created. The gesture in progress is flushed
    /// first.
    pub fn set_shape_kind(&mut self, kind: ShapeKind) -> Outcome {
        let outcome = self.flush();
        log::debug!("🖌️ Shape kind: {}", kind);
        self.shape_kind = kind;
        outcome
    }

    /// Show or hide all annotations. Returns the new visibility.
    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        let ids: Vec<Uuid> = self.handles.keys().copied().collect();
        for id in ids {
            self.restyle(id);
        }
        log::debug!("Annotations visible: {}", self.visible);
        self.visible
    }

    /// Load annotations from an interchange file.
    ///
    /// Unknown shape kinds are handled per the configured policy. A failed
    /// load leaves the store untouched.
    pub fn load(&mut self, path: &Path) -> Result<Vec<Uuid>, SessionError> {
        log::info!("📂 Loading annotations from {:?}", path);
        let bytes = std::fs::read(path)?;
        let ids = self
            .store
            .load_with(&bytes, self.preferences.shape_policy)?;

        // Replaced records may have changed kind; draw them from scratch
        for id in &ids {
            if let Some(handle) = self.handles.remove(id) {
                self.canvas.delete_shape(handle);
            }
        }
        self.refresh();

        log::info!("📂 Loaded {} annotations", ids.len());
        Ok(ids)
    }

    /// Save all annotations to an interchange file.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        format::write_file(path, self.store.iter().map(|(annotation, _)| annotation))?;
        log::info!("💾 Saved {} annotations to {:?}", self.store.len(), path);
        Ok(())
    }

    /// Decode an image file and make it the session's image.
    pub fn open_image(&mut self, path: &Path) -> Result<(), SessionError> {
        let pyramid = ImagePyramid::open(path, self.preferences.pyramid_min_dimension)?;
        self.install_pyramid(pyramid);
        Ok(())
    }

    /// Make an already decoded image the session's image.
    pub fn set_image(&mut self, image: DynamicImage) {
        let pyramid = ImagePyramid::from_dynamic(image, self.preferences.pyramid_min_dimension);
        self.install_pyramid(pyramid);
    }

    /// The canvas was resized.
    pub fn set_canvas_size(&mut self, canvas_size: (u32, u32)) {
        self.canvas_size = canvas_size;
        self.refresh();
    }

    /// Zoom one wheel step about `pivot`. Returns the factor applied.
    pub fn zoom(&mut self, direction: ZoomDirection, pivot: Point) -> Result<f64, SessionError> {
        let view = self.view.as_mut().ok_or(SessionError::NoImage)?;
        let applied = view.zoom(direction.factor(self.preferences.zoom_step), pivot);
        self.refresh();
        Ok(applied)
    }

    /// Shift the view by a view-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), SessionError> {
        let view = self.view.as_mut().ok_or(SessionError::NoImage)?;
        view.pan(dx, dy);
        self.refresh();
        Ok(())
    }

    /// Redraw the image tile, every annotation and the gesture preview.
    pub fn redraw(&mut self) -> Result<(), SessionError> {
        if self.view.is_none() {
            return Err(SessionError::NoImage);
        }
        self.refresh();
        Ok(())
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// A click at a view point.
    pub fn click(&mut self, view_point: Point) -> Outcome {
        let Some(view) = self.view else {
            log::debug!("Click ignored, no image open");
            return Outcome::Ignored;
        };

        match self.mode {
            Mode::Create => self.click_create(&view, view_point),
            Mode::Move => self.click_select(SelectionSet::Move, view_point),
            Mode::Delete => self.click_select(SelectionSet::Delete, view_point),
            Mode::Combine => self.click_select(SelectionSet::Combine, view_point),
            Mode::Cut => self.click_cut(&view, view_point),
        }
    }

    /// The pointer moved to a view point.
    pub fn pointer_moved(&mut self, view_point: Point) -> Outcome {
        let Some(view) = self.view else {
            return Outcome::Ignored;
        };

        match self.mode {
            Mode::Create | Mode::Cut => {
                if self.gesture.anchors.is_empty() {
                    return Outcome::Ignored;
                }
                let Ok(norm) = view.to_normalized(view_point) else {
                    return Outcome::Ignored;
                };
                self.gesture.pointer = Some(norm);
                self.draw_preview();
                Outcome::Previewed
            }
            Mode::Move => self.move_target_to(&view, view_point),
            Mode::Delete | Mode::Combine => Outcome::Ignored,
        }
    }

    /// Finish the current mode's pending work: close a polygon, delete the
    /// delete set or merge the combine set.
    pub fn commit(&mut self) -> Outcome {
        match self.mode {
            Mode::Create => self.commit_polygon(),
            Mode::Delete => self.commit_delete(),
            Mode::Combine => self.commit_combine(),
            Mode::Move | Mode::Cut => Outcome::Ignored,
        }
    }

    fn click_create(&mut self, view: &ViewState, view_point: Point) -> Outcome {
        let norm = match view.to_normalized(view_point) {
            Ok(p) => p,
            Err(e) => {
                log::debug!("Click ignored: {}", e);
                return Outcome::Ignored;
            }
        };

        self.gesture.anchors.push(norm);
        self.gesture.pointer = None;
        let count = self.gesture.anchors.len();
        log::debug!("✏️ Anchor {} at ({:.0}, {:.0})", count, norm.x, norm.y);

        if self.shape_kind.anchor_count() == Some(count) {
            let anchors = std::mem::take(&mut self.gesture.anchors);
            self.clear_preview();
            return match Shape::from_anchors(self.shape_kind, &anchors) {
                Some(shape) => self.commit_shape(shape),
                None => Outcome::Discarded,
            };
        }

        self.draw_preview();
        Outcome::Pending { anchors: count }
    }

    fn click_select(&mut self, set: SelectionSet, view_point: Point) -> Outcome {
        let Some(id) = self.hit_shape(view_point) else {
            return Outcome::Ignored;
        };

        match self.selection.toggle(set, id) {
            Toggle::Added => {
                self.restyle(id);
                log::debug!("🔍 {:?} set += {}", set, id);
                Outcome::Selected { id, set }
            }
            Toggle::Removed => {
                self.restyle(id);
                log::debug!("🔍 {:?} set -= {}", set, id);
                Outcome::Deselected { id, set }
            }
            Toggle::Refused => {
                log::debug!("Selection of {} into {:?} refused", id, set);
                Outcome::Ignored
            }
        }
    }

    fn click_cut(&mut self, view: &ViewState, view_point: Point) -> Outcome {
        let norm = match view.to_normalized(view_point) {
            Ok(p) => p,
            Err(e) => {
                log::debug!("Cut anchor ignored: {}", e);
                return Outcome::Ignored;
            }
        };

        self.gesture.anchors.push(norm);
        self.gesture.pointer = None;
        if self.gesture.anchors.len() < 2 {
            // Drops the line left by the previous cut
            self.clear_preview();
            return Outcome::Pending { anchors: 1 };
        }

        let anchors = std::mem::take(&mut self.gesture.anchors);
        self.clear_preview();
        let &[start, end] = anchors.as_slice() else {
            return Outcome::Ignored;
        };

        // The shape under the second click, else under the middle of the
        // line, else under the first click
        let middle = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let target = self
            .hit_shape(view_point)
            .or_else(|| self.hit_shape(view.to_view(middle)))
            .or_else(|| self.hit_shape(view.to_view(start)));
        self.draw_cut_line(view, start, end);
        let Some(id) = target else {
            log::debug!("Cut line hit no shape");
            return Outcome::Ignored;
        };

        self.cut_shape(id, (start, end))
    }

    /// Show the finished cut line until the next click, redraw or mode
    /// switch. Drawn after hit-testing so the line never shadows the target.
    fn draw_cut_line(&mut self, view: &ViewState, start: Point, end: Point) {
        let geometry = ViewGeometry::Polyline(vec![view.to_view(start), view.to_view(end)]);
        let style = Style::outline(self.styles.cut_line, self.styles.line_width);
        self.gesture.preview = Some(self.canvas.create_shape(None, &geometry, &style));
    }

    fn cut_shape(&mut self, id: Uuid, line: (Point, Point)) -> Outcome {
        let shape = match self.store.get(id) {
            Ok((shape, _)) => shape.clone(),
            Err(e) => {
                log::warn!("Cut target out of sync: {}", e);
                self.forget(id);
                return Outcome::Ignored;
            }
        };
        if !shape.encloses_area() {
            return Outcome::Unchanged(id);
        }

        let outline = shape.outline(self.preferences.oval_steps);
        match boolean_ops::cut(&outline, line) {
            Ok(pieces) if pieces.len() >= 2 => {
                if let Err(e) = self.remove_annotation(id) {
                    log::warn!("Cut target out of sync: {}", e);
                    return Outcome::Ignored;
                }
                let ids: Vec<Uuid> = pieces
                    .into_iter()
                    .map(|points| self.add_shape(Shape::Polygon { points }))
                    .collect();
                log::info!("✂️ Cut {} into {} pieces", id, ids.len());
                Outcome::Cut {
                    original: id,
                    pieces: ids,
                }
            }
            Ok(_) => Outcome::Unchanged(id),
            Err(e) => {
                log::warn!("Cut failed: {}", e);
                Outcome::Rejected(e)
            }
        }
    }

    fn move_target_to(&mut self, view: &ViewState, view_point: Point) -> Outcome {
        let Some(id) = self.selection.move_target() else {
            return Outcome::Ignored;
        };
        let Ok(center) = view.to_normalized(view_point) else {
            return Outcome::Ignored;
        };

        let moved = match self.store.get(id) {
            Ok((shape, _)) => shape.recentered(center),
            Err(e) => {
                log::warn!("Move target out of sync: {}", e);
                self.forget(id);
                return Outcome::Ignored;
            }
        };
        if let Err(e) = self.store.edit(id, moved) {
            log::warn!("Move failed: {}", e);
            return Outcome::Ignored;
        }

        self.draw_annotation(id);
        Outcome::Moved(id)
    }

    fn commit_polygon(&mut self) -> Outcome {
        if self.shape_kind != ShapeKind::Polygon {
            return Outcome::Ignored;
        }
        let anchors = std::mem::take(&mut self.gesture.anchors);
        self.gesture.pointer = None;
        self.clear_preview();

        match anchors.len() {
            0 => Outcome::Ignored,
            1 => Outcome::Discarded,
            _ => self.commit_shape(Shape::Polygon { points: anchors }),
        }
    }

    fn commit_delete(&mut self) -> Outcome {
        let ids = self.selection.take_delete();
        if ids.is_empty() {
            return Outcome::Ignored;
        }

        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            match self.remove_annotation(id) {
                Ok(_) => deleted.push(id),
                Err(e) => {
                    log::warn!("Skipping delete: {}", e);
                    self.forget(id);
                }
            }
        }

        log::info!("🗑️ Deleted {} annotations", deleted.len());
        Outcome::Deleted(deleted)
    }

    fn commit_combine(&mut self) -> Outcome {
        let ids = self.selection.combine_set().to_vec();
        if ids.len() < 2 {
            log::debug!("Combine needs at least 2 shapes, {} selected", ids.len());
            return Outcome::Ignored;
        }

        let mut outlines = Vec::with_capacity(ids.len());
        for &id in &ids {
            match self.store.get(id) {
                Ok((shape, _)) => outlines.push(shape.outline(self.preferences.oval_steps)),
                Err(e) => {
                    log::warn!("Combine set out of sync: {}", e);
                    self.forget(id);
                    return Outcome::Ignored;
                }
            }
        }

        match boolean_ops::combine(&outlines) {
            Ok(points) => {
                for &id in &ids {
                    if let Err(e) = self.remove_annotation(id) {
                        log::warn!("Combine input out of sync: {}", e);
                    }
                }
                self.selection.clear_combine();
                let created = self.add_shape(Shape::Polygon { points });
                log::info!("🔗 Combined {} annotations into {}", ids.len(), created);
                Outcome::Combined {
                    removed: ids,
                    created,
                }
            }
            Err(e) => {
                log::warn!("Combine failed: {}", e);
                for &id in &ids {
                    self.restyle(id);
                }
                Outcome::Rejected(e)
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Drop the gesture in progress. An open polygon with at least two
    /// anchors is kept as a shape.
    fn flush(&mut self) -> Outcome {
        let anchors = std::mem::take(&mut self.gesture.anchors);
        self.gesture.pointer = None;
        self.clear_preview();

        if self.mode == Mode::Create && self.shape_kind == ShapeKind::Polygon && anchors.len() >= 2
        {
            return self.commit_shape(Shape::Polygon { points: anchors });
        }
        if anchors.is_empty() {
            Outcome::Ignored
        } else {
            log::debug!("Discarded {} pending anchors", anchors.len());
            Outcome::Discarded
        }
    }

    fn commit_shape(&mut self, shape: Shape) -> Outcome {
        let kind = shape.kind();
        let id = self.add_shape(shape);
        log::info!("✅ Created {} annotation {}", kind, id);
        Outcome::Created(id)
    }

    fn add_shape(&mut self, shape: Shape) -> Uuid {
        let id = self.store.add(shape, None, None);
        self.draw_annotation(id);
        id
    }

    fn remove_annotation(&mut self, id: Uuid) -> Result<Annotation, StoreError> {
        let removed = self.store.delete(id)?;
        self.forget(id);
        Ok(removed)
    }

    /// Drop every reference to `id` outside the store.
    fn forget(&mut self, id: Uuid) {
        if let Some(handle) = self.handles.remove(&id) {
            self.canvas.delete_shape(handle);
        }
        self.selection.remove(id);
    }

    fn hit_shape(&self, view_point: Point) -> Option<Uuid> {
        let handle = self.canvas.hit_test(view_point)?;
        self.handles
            .iter()
            .find(|(_, h)| **h == handle)
            .map(|(id, _)| *id)
    }

    fn install_pyramid(&mut self, pyramid: ImagePyramid) {
        self.flush();
        let view = ViewState::fit(pyramid.dimensions(), self.canvas_size)
            .with_levels(pyramid.levels())
            .with_max_scale(self.preferences.max_scale);
        log::info!(
            "🖼️ Image {:?} at scale {:.3}",
            pyramid.dimensions(),
            view.scale()
        );
        self.view = Some(view);
        self.pyramid = Some(pyramid);
        self.refresh();
    }

    fn refresh(&mut self) {
        let Some(view) = self.view else {
            return;
        };

        if let Some(pyramid) = &self.pyramid {
            let (w, h) = self.canvas_size;
            let viewport = Bounds::new(Point::default(), Point::new(f64::from(w), f64::from(h)));
            if let Some(tile) = pyramid.view_tile(&view, viewport) {
                self.canvas.draw_image(&tile);
            }
        }

        let stale: Vec<Uuid> = self
            .handles
            .keys()
            .filter(|id| !self.store.contains(**id))
            .copied()
            .collect();
        for id in stale {
            self.forget(id);
        }

        for id in self.store.ids() {
            self.draw_annotation(id);
        }
        self.draw_preview();
    }

    fn draw_annotation(&mut self, id: Uuid) {
        let Some(view) = self.view else {
            return;
        };
        let Some(annotation) = self.store.annotation(id) else {
            return;
        };
        let kind = annotation.kind();
        let geometry = view_geometry(&annotation.shape, &view);
        let style = self.style_for(id);

        let handle = match self.handles.get(&id).copied() {
            Some(old) => {
                let new = self.canvas.update_shape(old, &geometry);
                if new != old {
                    self.canvas.set_style(new, &style);
                }
                new
            }
            None => self.canvas.create_shape(Some(kind), &geometry, &style),
        };
        self.handles.insert(id, handle);
    }

    fn restyle(&mut self, id: Uuid) {
        if let Some(handle) = self.handles.get(&id).copied() {
            let style = self.style_for(id);
            self.canvas.set_style(handle, &style);
        }
    }

    fn style_for(&self, id: Uuid) -> Style {
        let color = match self.selection.set_of(id) {
            Some(SelectionSet::Move) => self.styles.move_target,
            Some(SelectionSet::Delete) => self.styles.delete,
            Some(SelectionSet::Combine) => self.styles.combine,
            None => self.styles.normal,
        };
        Style::outline(color, self.styles.line_width).with_visible(self.visible)
    }

    /// Geometry of the live preview: the shape being drawn up to the
    /// pointer, or the cut line.
    fn preview_geometry(&self, view: &ViewState) -> Option<(Option<ShapeKind>, ViewGeometry, [u8; 3])> {
        let anchors = &self.gesture.anchors;
        let first = *anchors.first()?;

        match self.mode {
            Mode::Create if self.shape_kind == ShapeKind::Polygon => {
                let points = anchors
                    .iter()
                    .chain(self.gesture.pointer.iter())
                    .map(|p| view.to_view(*p))
                    .collect();
                Some((
                    Some(ShapeKind::Polygon),
                    ViewGeometry::Polyline(points),
                    self.styles.preview,
                ))
            }
            Mode::Create => {
                let shape = Shape::from_anchors(self.shape_kind, &[first, self.gesture.pointer?])?;
                Some((
                    Some(self.shape_kind),
                    view_geometry(&shape, view),
                    self.styles.preview,
                ))
            }
            Mode::Cut => {
                let pointer = self.gesture.pointer?;
                Some((
                    None,
                    ViewGeometry::Polyline(vec![view.to_view(first), view.to_view(pointer)]),
                    self.styles.cut_line,
                ))
            }
            Mode::Move | Mode::Delete | Mode::Combine => None,
        }
    }

    fn draw_preview(&mut self) {
        let Some(view) = self.view else {
            return;
        };

        match self.preview_geometry(&view) {
            Some((kind, geometry, color)) => {
                let handle = match self.gesture.preview {
                    Some(old) => self.canvas.update_shape(old, &geometry),
                    None => {
                        let style = Style::outline(color, self.styles.line_width);
                        self.canvas.create_shape(kind, &geometry, &style)
                    }
                };
                self.gesture.preview = Some(handle);
            }
            None => self.clear_preview(),
        }
    }

    fn clear_preview(&mut self) {
        if let Some(handle) = self.gesture.preview.take() {
            self.canvas.delete_shape(handle);
        }
    }
}

/// Map a normalized shape into view space.
fn view_geometry(shape: &Shape, view: &ViewState) -> ViewGeometry {
    let to_view_bounds =
        |b: Bounds| Bounds::new(view.to_view(b.top_left), view.to_view(b.bottom_right));

    match shape {
        Shape::Ellipse { .. } | Shape::Circle { .. } => {
            ViewGeometry::Oval(to_view_bounds(shape.bounds()))
        }
        Shape::Rectangle { .. } => ViewGeometry::Rectangle(to_view_bounds(shape.bounds())),
        Shape::Polygon { points } => {
            ViewGeometry::Polygon(points.iter().map(|p| view.to_view(*p)).collect())
        }
    }
}
