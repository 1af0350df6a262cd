//! provmap-triangulate - Interpolation between two maps
//!
//! Given point pairs placed on the source and target maps, this crate
//! derives a piecewise-affine correspondence between the maps:
//!
//! - [`Triangulator::build`] - Delaunay mesh over the complete pairs
//! - [`Triangulator::interpolate`] - Map a point through the mesh
//! - [`Triangulator::is_sane`] / [`Triangulator::folded_triangles`] - Mesh checks
//! - [`MeshCache`] - Rebuild only when the points change

mod cache;
mod delaunay;
mod error;
pub mod geometry;
mod mesh;

pub use cache::MeshCache;
pub use error::{TriangulationError, TriangulationResult};
pub use geometry::{Point, barycentric, orient, triangle_area};
pub use mesh::{DEFAULT_SANITY_EPSILON, TriangleMesh, Triangulator};
