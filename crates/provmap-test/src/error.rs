//! Error types for the test harness

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading fixtures or writing check outputs
#[derive(Debug, Error)]
pub enum TestError {
    /// A fixture image could not be decoded
    #[error("cannot read fixture {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: provmap_io::IoError,
    },

    /// A check output image could not be written
    #[error("cannot write {}: {source}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: provmap_io::IoError,
    },

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations
pub type TestResult<T> = Result<T, TestError>;
