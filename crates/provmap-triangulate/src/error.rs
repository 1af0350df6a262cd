//! Error types for provmap-triangulate

use thiserror::Error;

/// Errors that can occur while building or querying a mesh
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriangulationError {
    /// Fewer than three distinct complete point pairs
    #[error("need at least 3 complete point pairs, have {usable}")]
    InsufficientPoints { usable: usize },

    /// All usable points lie on one line
    #[error("points are collinear, no triangle can be formed")]
    DegenerateMesh,

    /// The query lies outside every triangle
    #[error("no triangle encloses ({x}, {y})")]
    NoEnclosingTriangle { x: f64, y: f64 },
}

/// Result type for triangulation operations
pub type TriangulationResult<T> = Result<T, TriangulationError>;
