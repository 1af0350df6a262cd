//! Mesh cache keyed by point revision
//!
//! The shell asks for a mesh on every redraw; the mesh only changes when a
//! point is placed, moved or removed, or when the anchor side changes.

use crate::error::TriangulationResult;
use crate::mesh::{TriangleMesh, Triangulator};
use provmap_core::{PointPair, Side};

/// Holds the last built mesh (or build error) with the key it was built for.
#[derive(Debug, Default)]
pub struct MeshCache {
    entry: Option<(u64, Side, TriangulationResult<TriangleMesh>)>,
    builds: usize,
}

impl MeshCache {
    /// An empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The mesh for `points` at `revision`, rebuilt only when the revision
    /// or the anchor differs from the cached one.
    pub fn mesh(
        &mut self,
        triangulator: &Triangulator,
        points: &[PointPair],
        revision: u64,
        anchor: Side,
    ) -> TriangulationResult<&TriangleMesh> {
        let fresh = matches!(
            &self.entry,
            Some((r, s, _)) if *r == revision && *s == anchor
        );
        if !fresh {
            self.entry = None;
            self.builds += 1;
            log::debug!("rebuilding {anchor} mesh at point revision {revision}");
        }
        let (_, _, result) = self
            .entry
            .get_or_insert_with(|| (revision, anchor, triangulator.build(points, anchor)));
        result.as_ref().map_err(Clone::clone)
    }

    /// Drop the cached mesh.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Number of builds performed so far
    pub fn builds(&self) -> usize {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provmap_core::Pixel;

    fn square() -> Vec<PointPair> {
        [(0, 0), (8, 0), (8, 8), (0, 8)]
            .into_iter()
            .map(|(x, y)| PointPair::complete(Pixel::new(x, y), Pixel::new(x * 2, y * 2)))
            .collect()
    }

    #[test]
    fn test_cache_reuses_mesh() {
        let t = Triangulator::default();
        let points = square();
        let mut cache = MeshCache::new();

        assert_eq!(cache.mesh(&t, &points, 4, Side::Source).unwrap().len(), 2);
        assert!(cache.mesh(&t, &points, 4, Side::Source).is_ok());
        assert_eq!(cache.builds(), 1);

        assert_eq!(cache.mesh(&t, &points, 4, Side::Target).unwrap().anchor(), Side::Target);
        assert_eq!(cache.builds(), 2);

        cache.mesh(&t, &points[..2], 5, Side::Target).unwrap_err();
        cache.mesh(&t, &points[..2], 5, Side::Target).unwrap_err();
        assert_eq!(cache.builds(), 3);

        cache.invalidate();
        assert!(cache.mesh(&t, &points, 5, Side::Target).is_ok());
        assert_eq!(cache.builds(), 4);
    }
}
