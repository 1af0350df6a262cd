//! Province bitmap I/O errors

use crate::format::ImageFormat;
use thiserror::Error;

/// Error type for reading and writing province bitmaps.
#[derive(Error, Debug)]
pub enum IoError {
    /// Filesystem error, or the data ended early
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header matches neither BMP nor PNG
    #[error("not a BMP or PNG file")]
    UnknownFormat,

    /// The format is known but its codec was compiled out
    #[error("{0:?} support not enabled")]
    Disabled(ImageFormat),

    /// A variant of a known format this reader does not decode
    #[error("unsupported {0}")]
    Unsupported(String),

    /// The data is structurally invalid
    #[error("invalid image data: {0}")]
    InvalidData(String),

    /// The PNG decoder rejected the data
    #[error("decode error: {0}")]
    Decode(String),

    /// The PNG encoder failed
    #[error("encode error: {0}")]
    Encode(String),

    /// The decoded dimensions do not form a valid image
    #[error("core error: {0}")]
    Core(#[from] provmap_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
