//! Document region templates and pixel-space resolution
//!
//! A region template maps semantic field names ("name", "photo", ...) to
//! normalized bounding boxes expressed as fractions of image width/height,
//! so one template generalizes across capture resolutions. Resolution binds
//! a template to a concrete image's dimensions, producing absolute pixel
//! rectangles.

use image::RgbImage;
use std::collections::BTreeMap;

/// A bounding box in normalized coordinates, each corner a fraction of the
/// image dimensions in `[0, 1]` with `x1 < x2` and `y1 < y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl NormalizedRect {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Per-document-type mapping from semantic field name to normalized box.
///
/// Built once at verifier construction and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RegionTemplate {
    entries: Vec<(&'static str, NormalizedRect)>,
}

impl RegionTemplate {
    pub fn new(entries: Vec<(&'static str, NormalizedRect)>) -> Self {
        Self { entries }
    }

    /// Iterate over (field name, normalized box) pairs in template order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, NormalizedRect)> + '_ {
        self.entries.iter().copied()
    }

    /// Look up a single field's normalized box.
    pub fn get(&self, field: &str) -> Option<NormalizedRect> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, rect)| *rect)
    }
}

/// A field name bound to an absolute pixel rectangle.
///
/// Invariant: `0 <= px1 < px2 <= width` and `0 <= py1 < py2 <= height` for
/// the image it was resolved against. Rectangles that would violate this
/// are never constructed; the field resolves to `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRegion {
    pub px1: u32,
    pub py1: u32,
    pub px2: u32,
    pub py2: u32,
}

impl ResolvedRegion {
    pub fn width(&self) -> u32 {
        self.px2 - self.px1
    }

    pub fn height(&self) -> u32 {
        self.py2 - self.py1
    }
}

/// Resolve a template against concrete image dimensions.
///
/// Each corner is scaled and rounded. A rectangle whose bottom-right corner
/// lands outside the actual image (template authored for a different aspect
/// ratio) or that rounds to an empty area is reported unavailable rather
/// than clamped; clamping would silently corrupt downstream measurements.
pub fn resolve(
    template: &RegionTemplate,
    width: u32,
    height: u32,
) -> BTreeMap<&'static str, Option<ResolvedRegion>> {
    let mut resolved = BTreeMap::new();

    for (field, rect) in template.entries() {
        let px1 = (width as f64 * rect.x1).round() as i64;
        let py1 = (height as f64 * rect.y1).round() as i64;
        let px2 = (width as f64 * rect.x2).round() as i64;
        let py2 = (height as f64 * rect.y2).round() as i64;

        let region = if px1 >= 0
            && py1 >= 0
            && px1 < px2
            && py1 < py2
            && px2 <= width as i64
            && py2 <= height as i64
        {
            Some(ResolvedRegion {
                px1: px1 as u32,
                py1: py1 as u32,
                px2: px2 as u32,
                py2: py2 as u32,
            })
        } else {
            None
        };

        resolved.insert(field, region);
    }

    resolved
}

/// Copy a resolved region out of the image into its own buffer.
pub fn crop(image: &RgbImage, region: ResolvedRegion) -> RgbImage {
    image::imageops::crop_imm(image, region.px1, region.py1, region.width(), region.height())
        .to_image()
}
