//! Error types for provmap-core
//!
//! Provides a unified error type for definition loading, pixel buffers
//! and classification. Per-row problems are collected into load reports
//! rather than aborting the load; only the variants documented as fatal
//! stop a load.

use crate::color::Color;
use thiserror::Error;

/// provmap-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Pixel buffer length does not match the declared dimensions
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Coordinate outside the image
    #[error("pixel ({x}, {y}) outside {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The coordinate already belongs to a province or the unmapped set
    #[error("pixel ({x}, {y}) is already registered")]
    DuplicatePixel { x: u32, y: u32 },

    /// A definition row could not be parsed (non-fatal, reported)
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Two provinces declare the same color (fatal)
    #[error("duplicate color {color}: provinces {first} and {second}")]
    DuplicateColor { color: Color, first: u32, second: u32 },

    /// Two rows declare the same province id (fatal)
    #[error("duplicate province id {id} at line {line}")]
    DuplicateId { id: u32, line: usize },

    /// Pixels whose color matches no declared province
    #[error("{count} pixels in {colors} colors match no declared province")]
    OrphanPixels { count: usize, colors: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input could not be decoded
    #[error("decode error: {0}")]
    DecodeError(String),
}

impl Error {
    /// Whether this error aborts a whole load rather than a single row.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::MalformedRow { .. } | Error::OrphanPixels { .. })
    }
}

/// Result type alias for provmap-core operations
pub type Result<T> = std::result::Result<T, Error>;
