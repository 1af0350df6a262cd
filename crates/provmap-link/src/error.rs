//! Error types for provmap-link

use crate::link::LinkId;
use provmap_core::{Pixel, Side};
use thiserror::Error;

/// provmap-link error type
#[derive(Error, Debug)]
pub enum LinkError {
    /// A mapping row could not be parsed (non-fatal, reported)
    #[error("malformed mapping row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A mapping row names a province missing from the definitions
    /// (non-fatal, reported)
    #[error("line {line}: {side} province '{reference}' is not defined")]
    UnresolvedProvince {
        line: usize,
        side: Side,
        reference: String,
    },

    /// The province is already claimed by a link on that side
    #[error("{side} province {id} is already linked by link {link}")]
    ProvinceAlreadyLinked { side: Side, id: u32, link: LinkId },

    /// The mutation would break a structural rule of the link graph
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// No link with this id in the version
    #[error("link {0} not found")]
    LinkNotFound(LinkId),

    /// Point index beyond the point list
    #[error("point index {index} out of range (len {len})")]
    PointIndexOutOfRange { index: usize, len: usize },

    /// Point outside the image of its side
    #[error("{side} point {pixel} outside {width}x{height} image")]
    PointOutOfBounds {
        side: Side,
        pixel: Pixel,
        width: u32,
        height: u32,
    },

    /// Version index beyond the version list
    #[error("version index {index} out of range (len {len})")]
    VersionOutOfRange { index: usize, len: usize },

    /// A version name that would not reload as a header
    #[error("invalid version name '{name}': {reason}")]
    InvalidVersionName { name: String, reason: &'static str },

    /// The only remaining version cannot be deleted
    #[error("cannot delete the last version")]
    LastVersion,

    /// Error from provmap-core
    #[error("core error: {0}")]
    Core(#[from] provmap_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for provmap-link operations
pub type LinkResult<T> = Result<T, LinkError>;
