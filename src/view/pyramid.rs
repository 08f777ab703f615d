//! Multi-resolution image pyramid.
//!
//! Level 0 is the source image; every further level halves the previous
//! one. Redraws crop the visible part of the level that matches the current
//! zoom and resize only that crop to its on-screen size.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::model::Bounds;
use crate::view::transform::{CropBox, ViewState};

/// Default threshold below which halving stops.
pub const DEFAULT_MIN_DIMENSION: u32 = 256;

/// Pixel dimensions of pyramid level `level` for an image of `size`.
pub fn level_dimensions(size: (u32, u32), level: usize) -> (u32, u32) {
    let shift = u32::try_from(level).unwrap_or(u32::MAX);
    let (w, h) = size;
    (
        w.checked_shr(shift).unwrap_or(0).max(1),
        h.checked_shr(shift).unwrap_or(0).max(1),
    )
}

/// A cropped and resized piece of the image, ready to be drawn.
#[derive(Debug, Clone)]
pub struct ImageTile {
    pub image: RgbaImage,
    /// Pyramid level the pixels were taken from.
    pub level: usize,
    /// View-space box the tile covers.
    pub placement: Bounds,
}

/// Progressively halved copies of one image.
#[derive(Debug, Clone)]
pub struct ImagePyramid {
    levels: Vec<RgbaImage>,
}

impl ImagePyramid {
    /// Build the pyramid, halving until the smallest dimension drops below
    /// `min_dimension`.
    pub fn build(image: RgbaImage, min_dimension: u32) -> Self {
        let threshold = min_dimension.max(1);
        let mut levels = vec![image];

        while let Some(last) = levels.last() {
            let (w, h) = last.dimensions();
            let smallest = w.min(h);
            if smallest < threshold || smallest < 2 {
                break;
            }
            let next = imageops::resize(last, w / 2, h / 2, FilterType::Triangle);
            levels.push(next);
        }

        log::info!(
            "Built image pyramid with {} levels from {:?}",
            levels.len(),
            levels[0].dimensions()
        );
        Self { levels }
    }

    pub fn from_dynamic(image: DynamicImage, min_dimension: u32) -> Self {
        Self::build(image.to_rgba8(), min_dimension)
    }

    /// Decode an image file and build its pyramid.
    pub fn open(path: &Path, min_dimension: u32) -> Result<Self, image::ImageError> {
        log::info!("Loading image: {:?}", path);
        let image = image::open(path)?;
        Ok(Self::from_dynamic(image, min_dimension))
    }

    /// Number of levels, at least 1.
    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, index: usize) -> Option<&RgbaImage> {
        self.levels.get(index)
    }

    /// Dimensions of the source image.
    pub fn dimensions(&self) -> (u32, u32) {
        self.levels[0].dimensions()
    }

    /// The visible part of the image at the view's pyramid level, resized to
    /// its on-screen size. `None` when nothing of the image is visible.
    pub fn view_tile(&self, view: &ViewState, viewport: Bounds) -> Option<ImageTile> {
        let region = view.visible_region(viewport)?;
        let source = self.level(region.level)?;

        let CropBox {
            x,
            y,
            width,
            height,
        } = region.crop;
        let cropped = imageops::crop_imm(source, x, y, width, height).to_image();

        let out_w = region.placement.width().round().max(1.0) as u32;
        let out_h = region.placement.height().round().max(1.0) as u32;
        let image = if cropped.dimensions() == (out_w, out_h) {
            cropped
        } else {
            imageops::resize(&cropped, out_w, out_h, FilterType::Lanczos3)
        };

        Some(ImageTile {
            image,
            level: region.level,
            placement: region.placement,
        })
    }
}
