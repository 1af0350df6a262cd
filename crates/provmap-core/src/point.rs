//! Pixel coordinates, map sides and point correspondences

use std::fmt;

/// Which of the two maps a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// The map being converted from
    Source,
    /// The map being converted to
    Target,
}

impl Side {
    /// Both sides, source first.
    pub const BOTH: [Side; 2] = [Side::Source, Side::Target];

    /// The other side.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Source => Side::Target,
            Side::Target => Side::Source,
        }
    }

    /// Lowercase name used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An integer image coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pixel {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
}

impl Pixel {
    /// Create a new pixel coordinate
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Pixel {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A correspondence between a source pixel and a target pixel.
///
/// Either side may be missing while the user has placed a point on one
/// map and not yet on the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointPair {
    /// Pixel on the source map
    pub source: Option<Pixel>,
    /// Pixel on the target map
    pub target: Option<Pixel>,
}

impl PointPair {
    /// Create a pair from both (optional) sides.
    pub fn new(source: Option<Pixel>, target: Option<Pixel>) -> Self {
        Self { source, target }
    }

    /// Create a complete pair.
    pub fn complete(source: Pixel, target: Pixel) -> Self {
        Self::new(Some(source), Some(target))
    }

    /// Create a pair placed on one side only.
    pub fn half(side: Side, pixel: Pixel) -> Self {
        let mut pair = Self::default();
        pair.set(side, Some(pixel));
        pair
    }

    /// Get the pixel on `side`.
    #[inline]
    pub fn get(&self, side: Side) -> Option<Pixel> {
        match side {
            Side::Source => self.source,
            Side::Target => self.target,
        }
    }

    /// Replace the pixel on `side`.
    pub fn set(&mut self, side: Side, pixel: Option<Pixel>) {
        match side {
            Side::Source => self.source = pixel,
            Side::Target => self.target = pixel,
        }
    }

    /// Both sides are placed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }

    /// Neither side is placed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.target.is_none()
    }

    /// `(source, target)` if both sides are placed.
    pub fn as_complete(&self) -> Option<(Pixel, Pixel)> {
        Some((self.source?, self.target?))
    }
}
