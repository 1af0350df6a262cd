//! Planar geometry primitives
//!
//! Points use `f64` map coordinates, so an interpolated position may fall
//! between pixels.

use provmap_core::Pixel;

/// Tolerance for point-in-triangle tests, in barycentric units
pub(crate) const CONTAINMENT_TOLERANCE: f64 = 1e-9;

/// A 2D point with floating-point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance
    pub fn distance_squared(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Nearest pixel, clamped at zero
    pub fn to_pixel(self) -> Pixel {
        Pixel::new(self.x.round().max(0.0) as u32, self.y.round().max(0.0) as u32)
    }
}

impl From<Pixel> for Point {
    fn from(p: Pixel) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// Twice the signed area of `abc`; positive when counter-clockwise in a
/// y-up frame.
#[inline]
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Unsigned area of triangle `abc`
pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    orient(a, b, c).abs() * 0.5
}

/// Barycentric weights of `p` in triangle `t`, `None` for a degenerate
/// triangle.
pub fn barycentric(p: Point, t: [Point; 3]) -> Option<[f64; 3]> {
    let [a, b, c] = t;
    let denom = orient(a, b, c);
    if denom == 0.0 {
        return None;
    }
    let u = orient(p, b, c) / denom;
    let v = orient(a, p, c) / denom;
    let w = 1.0 - u - v;
    Some([u, v, w])
}

/// Whether all weights are non-negative within tolerance
#[inline]
pub(crate) fn inside(weights: [f64; 3]) -> bool {
    weights.iter().all(|&w| w >= -CONTAINMENT_TOLERANCE)
}

/// Weighted sum of three points
pub fn combine(t: [Point; 3], weights: [f64; 3]) -> Point {
    Point::new(
        t[0].x * weights[0] + t[1].x * weights[1] + t[2].x * weights[2],
        t[0].y * weights[0] + t[1].y * weights[1] + t[2].y * weights[2],
    )
}

/// Whether `p` lies strictly inside the circumcircle of `abc`.
///
/// `abc` may have either orientation.
pub(crate) fn in_circumcircle(a: Point, b: Point, c: Point, p: Point) -> bool {
    let (ax, ay) = (a.x - p.x, a.y - p.y);
    let (bx, by) = (b.x - p.x, b.y - p.y);
    let (cx, cy) = (c.x - p.x, c.y - p.y);
    let det = (ax * ax + ay * ay) * (bx * cy - cx * by) - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay);
    if orient(a, b, c) > 0.0 { det > 0.0 } else { det < 0.0 }
}
