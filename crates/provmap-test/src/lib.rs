//! provmap-test - Regression test framework for the province mapper
//!
//! This crate provides a regression test framework supporting three modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! It also builds the small synthetic maps the tests share, so every
//! crate exercises the same fixtures.
//!
//! # Usage
//!
//! ```ignore
//! use provmap_test::{RegParams, RegTestMode};
//!
//! let mut rp = RegParams::new("classify");
//! rp.compare_values(16.0, report.border as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"
//! - `RUST_LOG`: log filter for [`init_logging`]

mod error;
pub mod fixtures;
mod params;

pub use error::{TestError, TestResult};
pub use params::{Failure, RegParams, RegTestMode};

use provmap_core::RgbImage;
use std::path::{Path, PathBuf};

/// Route `log` output to the test harness once per process.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

/// Decode an image from `tests/data`.
pub fn load_test_image(name: &str) -> TestResult<RgbImage> {
    let path = test_data_path(name);
    provmap_io::read_image(&path).map_err(|source| TestError::ImageRead { path, source })
}

/// Read a text table from `tests/data`, decoded like the table readers do.
pub fn load_test_text(name: &str) -> TestResult<String> {
    let data = std::fs::read(test_data_path(name))?;
    Ok(provmap_core::decode_text(&data))
}

fn workspace_root() -> &'static Path {
    // crates/provmap-test -> workspace root
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../.."))
}

/// Path of a fixture under `tests/data`
pub fn test_data_path(name: &str) -> PathBuf {
    workspace_root().join("tests").join("data").join(name)
}

/// Directory of golden files
pub fn golden_dir() -> PathBuf {
    workspace_root().join("tests").join("golden")
}

/// Directory of check outputs
pub fn regout_dir() -> PathBuf {
    workspace_root().join("tests").join("regout")
}
