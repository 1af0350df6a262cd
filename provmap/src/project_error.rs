//! Error types for the provmap session

use provmap_core::Side;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or driving a project
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Definitions or classification failed
    #[error("core error: {0}")]
    Core(#[from] provmap_core::Error),

    /// A province bitmap could not be read
    #[error("image error: {0}")]
    Image(#[from] provmap_io::IoError),

    /// A definition table yielded no province
    #[error("{side} definitions at {} declare no usable province", path.display())]
    NoProvinces { side: Side, path: PathBuf },

    /// A link or point mutation was rejected
    #[error("link error: {0}")]
    Link(#[from] provmap_link::LinkError),

    /// No mesh could be built or queried
    #[error("triangulation error: {0}")]
    Triangulation(#[from] provmap_triangulate::TriangulationError),

    /// The configuration could not be (de)serialized
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for session operations
pub type ProjectResult<T> = Result<T, ProjectError>;
