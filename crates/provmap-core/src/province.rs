//! Province - a region of one map identified by its color

use crate::color::Color;
use crate::point::Pixel;

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bounds {
    /// Left x coordinate
    pub x: u32,
    /// Top y coordinate
    pub y: u32,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

impl Bounds {
    /// Create a new rectangle
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// Whether `pixel` lies inside the rectangle.
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.x >= self.x && pixel.x < self.right() && pixel.y >= self.y && pixel.y < self.bottom()
    }
}

/// A province declared in a definition table.
///
/// Pixels are registered once during the image scan; after that the
/// province is read-only. Interior and border pixels are disjoint because
/// the classifier assigns each pixel exactly one class.
#[derive(Debug, Clone, PartialEq)]
pub struct Province {
    id: u32,
    color: Color,
    name: String,
    interior_pixels: Vec<Pixel>,
    border_pixels: Vec<Pixel>,
}

impl Province {
    /// Create a province with no pixels.
    pub fn new(id: u32, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            color,
            name: name.into(),
            interior_pixels: Vec::new(),
            border_pixels: Vec::new(),
        }
    }

    /// Province id
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Declared color
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Declared name (may be empty)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixels whose four neighbors all share this province's color
    pub fn interior_pixels(&self) -> &[Pixel] {
        &self.interior_pixels
    }

    /// Pixels touching another color or the image edge
    pub fn border_pixels(&self) -> &[Pixel] {
        &self.border_pixels
    }

    /// All pixels, interior first.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.interior_pixels
            .iter()
            .chain(self.border_pixels.iter())
            .copied()
    }

    /// Total number of registered pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.interior_pixels.len() + self.border_pixels.len()
    }

    /// Whether the province appears on the bitmap at all.
    #[inline]
    pub fn has_pixels(&self) -> bool {
        self.pixel_count() > 0
    }

    pub(crate) fn push_interior(&mut self, pixel: Pixel) {
        self.interior_pixels.push(pixel);
    }

    pub(crate) fn push_border(&mut self, pixel: Pixel) {
        self.border_pixels.push(pixel);
    }

    pub(crate) fn clear_pixels(&mut self) {
        self.interior_pixels.clear();
        self.border_pixels.clear();
    }

    /// Bounding rectangle of the registered pixels.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut it = self.pixels();
        let first = it.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in it {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Bounds::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    /// Mean pixel position.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let n = self.pixel_count();
        if n == 0 {
            return None;
        }
        let (sx, sy) = self
            .pixels()
            .fold((0u64, 0u64), |(sx, sy), p| (sx + p.x as u64, sy + p.y as u64));
        Some((sx as f64 / n as f64, sy as f64 / n as f64))
    }
}
