//! Triangle meshes over point correspondences
//!
//! A [`TriangleMesh`] is a Delaunay triangulation of the complete point
//! pairs, computed on one side (the anchor). The same triangles, taken
//! over the counterpart side's coordinates, define a piecewise-affine map
//! from the anchor map to the other map: a query point's barycentric
//! weights in its anchor triangle are reapplied to the counterpart
//! triangle.
//!
//! # Example
//!
//! ```
//! use provmap_core::{Pixel, PointPair, Side};
//! use provmap_triangulate::{Point, Triangulator};
//!
//! let points = [
//!     PointPair::complete(Pixel::new(0, 0), Pixel::new(0, 0)),
//!     PointPair::complete(Pixel::new(10, 0), Pixel::new(20, 0)),
//!     PointPair::complete(Pixel::new(0, 10), Pixel::new(0, 20)),
//! ];
//! let triangulator = Triangulator::default();
//! let mesh = triangulator.build(&points, Side::Source).unwrap();
//! let p = triangulator.interpolate(&mesh, Point::new(2.0, 3.0)).unwrap();
//! assert!((p.x - 4.0).abs() < 1e-9 && (p.y - 6.0).abs() < 1e-9);
//! ```

use crate::delaunay;
use crate::error::{TriangulationError, TriangulationResult};
use crate::geometry::{Point, barycentric, combine, inside, orient, triangle_area};
use provmap_core::{Pixel, PointPair, Side};
use std::collections::HashSet;

/// Minimum anchor triangle area, in square pixels, for a sane mesh
pub const DEFAULT_SANITY_EPSILON: f64 = 1e-3;

/// A triangulation of point pairs; never edited, only rebuilt.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    anchor: Side,
    /// Triangles as indices into the original point list, counter-clockwise
    /// on the anchor side
    triangles: Vec<[usize; 3]>,
    /// `(anchor, counterpart)` coordinates per original point index; `None`
    /// for pairs left out of the mesh
    vertices: Vec<Option<(Point, Point)>>,
}

impl TriangleMesh {
    /// Side whose coordinates were triangulated
    pub fn anchor(&self) -> Side {
        self.anchor
    }

    /// Triangles as point-list indices
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Number of triangles
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// No triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Original indices of the points used as vertices
    pub fn vertex_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
    }

    /// Coordinates of point `index` on `side`, if it is a mesh vertex
    pub fn vertex(&self, index: usize, side: Side) -> Option<Point> {
        let (anchor, counterpart) = (*self.vertices.get(index)?)?;
        Some(if side == self.anchor { anchor } else { counterpart })
    }

    fn corners(&self, triangle: usize, side: Side) -> [Point; 3] {
        let pick = |i: usize| self.vertex(i, side).unwrap_or_default();
        let t = self.triangles[triangle];
        [pick(t[0]), pick(t[1]), pick(t[2])]
    }

    /// Triangle corners on `side`
    pub fn triangle_points(&self, triangle: usize, side: Side) -> Option<[Point; 3]> {
        (triangle < self.triangles.len()).then(|| self.corners(triangle, side))
    }
}

/// Builds meshes and maps points through them.
#[derive(Debug, Clone, Copy)]
pub struct Triangulator {
    epsilon: f64,
}

impl Default for Triangulator {
    fn default() -> Self {
        Self::new(DEFAULT_SANITY_EPSILON)
    }
}

impl Triangulator {
    /// Create a triangulator with the given sanity threshold
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Sanity threshold, in square pixels
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Triangulate the complete pairs of `points` on the `anchor` side.
    ///
    /// Incomplete pairs are ignored; of several pairs sharing an anchor
    /// pixel only the first is used. Triangle indices refer to positions
    /// in `points`.
    ///
    /// # Errors
    ///
    /// [`TriangulationError::InsufficientPoints`] with fewer than three
    /// usable pairs, [`TriangulationError::DegenerateMesh`] when they are
    /// collinear.
    pub fn build(&self, points: &[PointPair], anchor: Side) -> TriangulationResult<TriangleMesh> {
        let mut seen: HashSet<Pixel> = HashSet::new();
        let mut originals: Vec<usize> = Vec::new();
        let mut anchor_points: Vec<Point> = Vec::new();
        let mut vertices: Vec<Option<(Point, Point)>> = vec![None; points.len()];

        for (index, pair) in points.iter().enumerate() {
            let (Some(a), Some(c)) = (pair.get(anchor), pair.get(anchor.opposite())) else {
                continue;
            };
            if !seen.insert(a) {
                log::debug!("skipping duplicate {anchor} point {a} at index {index}");
                continue;
            }
            originals.push(index);
            anchor_points.push(a.into());
            vertices[index] = Some((a.into(), c.into()));
        }

        if anchor_points.len() < 3 {
            return Err(TriangulationError::InsufficientPoints {
                usable: anchor_points.len(),
            });
        }
        if all_collinear(&anchor_points) {
            return Err(TriangulationError::DegenerateMesh);
        }

        let triangles: Vec<[usize; 3]> = delaunay::triangulate(&anchor_points)
            .into_iter()
            .map(|t| [originals[t[0]], originals[t[1]], originals[t[2]]])
            .collect();
        if triangles.is_empty() {
            return Err(TriangulationError::DegenerateMesh);
        }

        log::debug!(
            "triangulated {} {anchor} points into {} triangles",
            anchor_points.len(),
            triangles.len()
        );
        Ok(TriangleMesh {
            anchor,
            triangles,
            vertices,
        })
    }

    /// First triangle containing `query` (anchor coordinates), edges
    /// included.
    pub fn locate(&self, mesh: &TriangleMesh, query: Point) -> Option<usize> {
        (0..mesh.triangles.len()).find(|&t| {
            barycentric(query, mesh.corners(t, mesh.anchor)).is_some_and(inside)
        })
    }

    /// Map an anchor-side point onto the counterpart side.
    ///
    /// # Errors
    ///
    /// [`TriangulationError::NoEnclosingTriangle`] outside the mesh hull.
    pub fn interpolate(&self, mesh: &TriangleMesh, query: Point) -> TriangulationResult<Point> {
        let triangle = self
            .locate(mesh, query)
            .ok_or(TriangulationError::NoEnclosingTriangle {
                x: query.x,
                y: query.y,
            })?;
        let weights = barycentric(query, mesh.corners(triangle, mesh.anchor)).ok_or(
            TriangulationError::NoEnclosingTriangle {
                x: query.x,
                y: query.y,
            },
        )?;
        Ok(combine(
            mesh.corners(triangle, mesh.anchor.opposite()),
            weights,
        ))
    }

    /// Like [`interpolate`](Self::interpolate), but outside the hull the
    /// query is translated by the offset of the nearest mesh vertex.
    pub fn interpolate_or_nearest(&self, mesh: &TriangleMesh, query: Point) -> Option<Point> {
        if let Ok(p) = self.interpolate(mesh, query) {
            return Some(p);
        }
        let (anchor, counterpart) = mesh
            .vertices
            .iter()
            .flatten()
            .min_by(|(a, _), (b, _)| {
                a.distance_squared(query)
                    .total_cmp(&b.distance_squared(query))
            })?;
        Some(Point::new(
            counterpart.x + (query.x - anchor.x),
            counterpart.y + (query.y - anchor.y),
        ))
    }

    /// Whether every anchor triangle has at least `epsilon` area.
    pub fn is_sane(&self, mesh: &TriangleMesh) -> bool {
        (0..mesh.triangles.len()).all(|t| {
            let [a, b, c] = mesh.corners(t, mesh.anchor);
            triangle_area(a, b, c) >= self.epsilon
        })
    }

    /// Triangles whose orientation on the counterpart side is flipped or
    /// flat, i.e. where the mapping folds over itself.
    pub fn folded_triangles(&self, mesh: &TriangleMesh) -> Vec<usize> {
        (0..mesh.triangles.len())
            .filter(|&t| {
                let [a, b, c] = mesh.corners(t, mesh.anchor);
                let [p, q, r] = mesh.corners(t, mesh.anchor.opposite());
                orient(a, b, c).signum() != orient(p, q, r).signum()
                    || triangle_area(p, q, r) < self.epsilon
            })
            .collect()
    }
}

/// Whether all points lie on one line.
fn all_collinear(points: &[Point]) -> bool {
    let first = points[0];
    let Some(far) = points
        .iter()
        .copied()
        .max_by(|a, b| {
            a.distance_squared(first)
                .total_cmp(&b.distance_squared(first))
        })
    else {
        return true;
    };
    points.iter().all(|&p| orient(first, far, p) == 0.0)
}
