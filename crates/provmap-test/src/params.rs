//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::{golden_dir, regout_dir};
use provmap_core::RgbImage;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Regression test mode, read from `REGTEST_MODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Write every checked output as the new golden file
    Generate,
    /// Check outputs against golden files (default)
    #[default]
    Compare,
    /// Run without checking outputs
    Display,
}

impl RegTestMode {
    /// Mode named by `value`; anything unrecognized is [`RegTestMode::Compare`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }

    /// Mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        std::env::var("REGTEST_MODE")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// One failed check
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Check number within the test, starting at 1
    pub index: usize,
    /// What differed
    pub detail: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "check {}: {}", self.index, self.detail)
    }
}

/// State of one regression test.
///
/// Every `compare_*` / `*_and_check` call is one numbered check. Failures
/// are collected rather than panicking so a test reports all of them;
/// [`RegParams::cleanup`] gives the verdict.
pub struct RegParams {
    /// Name of the test (e.g. "classify_grid")
    pub test_name: String,
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    failures: Vec<Failure>,
}

impl RegParams {
    /// Start a test. Initializes logging and the output directories.
    pub fn new(test_name: &str) -> Self {
        crate::init_logging();
        let mode = RegTestMode::from_env();
        for dir in [golden_dir(), regout_dir()] {
            if let Err(e) = fs::create_dir_all(&dir) {
                log::warn!("cannot create {}: {e}", dir.display());
            }
        }
        log::info!("{test_name}_reg: {mode:?}");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            failures: Vec::new(),
        }
    }

    /// Number of checks run so far
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether outputs are only displayed
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn next(&mut self) -> usize {
        self.index += 1;
        self.index
    }

    fn fail(&mut self, detail: String) -> bool {
        let failure = Failure {
            index: self.index,
            detail,
        };
        log::error!("{}_reg {failure}", self.test_name);
        self.failures.push(failure);
        false
    }

    /// Check that `actual` is within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.next();
        let diff = (expected - actual).abs();
        if diff > delta {
            return self.fail(format!(
                "expected {expected}, got {actual} (off by {diff}, allowed {delta})"
            ));
        }
        true
    }

    /// Check a condition.
    pub fn compare_bool(&mut self, expected: bool, actual: bool) -> bool {
        self.next();
        if expected != actual {
            return self.fail(format!("expected {expected}, got {actual}"));
        }
        true
    }

    /// Check two maps for identical pixels.
    pub fn compare_images(&mut self, expected: &RgbImage, actual: &RgbImage) -> bool {
        self.next();
        if expected.dimensions() != actual.dimensions() {
            return self.fail(format!(
                "size {:?} != {:?}",
                expected.dimensions(),
                actual.dimensions()
            ));
        }
        let width = expected.width() as usize;
        let mut differing = expected
            .data()
            .chunks_exact(3)
            .zip(actual.data().chunks_exact(3))
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i);
        let Some(first) = differing.next() else {
            return true;
        };
        let count = 1 + differing.count();
        self.fail(format!(
            "{count} pixels differ, first at ({}, {})",
            first % width,
            first / width
        ))
    }

    /// Check two byte strings (usually table text) for equality.
    pub fn compare_strings(&mut self, expected: &[u8], actual: &[u8]) -> bool {
        self.next();
        if expected == actual {
            return true;
        }
        let expected = String::from_utf8_lossy(expected);
        let actual = String::from_utf8_lossy(actual);
        let line = expected
            .lines()
            .zip(actual.lines())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| expected.lines().count().min(actual.lines().count()));
        self.fail(format!(
            "text differs at line {}\n--- expected ---\n{expected}\n--- actual ---\n{actual}",
            line + 1
        ))
    }

    /// Write `image` as BMP under regout and check it against its golden file.
    pub fn write_image_and_check(&mut self, image: &RgbImage) -> TestResult<()> {
        let path = self.output_path("bmp");
        provmap_io::write_image_file(image, &path).map_err(|source| TestError::ImageWrite {
            path: path.clone(),
            source,
        })?;
        self.check_golden(&path, "bmp")
    }

    /// Write `data` under regout with extension `ext` and check it against
    /// its golden file.
    pub fn write_data_and_check(&mut self, data: &[u8], ext: &str) -> TestResult<()> {
        let path = self.output_path(ext);
        fs::write(&path, data)?;
        self.check_golden(&path, ext)
    }

    fn output_path(&mut self, ext: &str) -> PathBuf {
        let index = self.next();
        regout_dir().join(format!("{}.{index:02}.{ext}", self.test_name))
    }

    fn golden_path(&self, ext: &str) -> PathBuf {
        golden_dir().join(format!("{}_golden.{:02}.{ext}", self.test_name, self.index))
    }

    /// Generate copies the output to golden; compare seeds a missing
    /// golden file and otherwise diffs. Images that decode to the same
    /// pixels count as equal even when their bytes differ.
    fn check_golden(&mut self, output: &Path, ext: &str) -> TestResult<()> {
        let golden = self.golden_path(ext);
        match self.mode {
            RegTestMode::Display => {}
            RegTestMode::Generate => {
                fs::copy(output, &golden)?;
                log::info!("generated {}", golden.display());
            }
            RegTestMode::Compare if !golden.exists() => {
                fs::copy(output, &golden)?;
                log::info!("seeded missing golden file {}", golden.display());
            }
            RegTestMode::Compare => {
                if fs::read(output)? != fs::read(&golden)? && !same_pixels(output, &golden) {
                    self.fail(format!(
                        "{} differs from {}",
                        output.display(),
                        golden.display()
                    ));
                }
            }
        }
        Ok(())
    }

    /// Report the result. Returns `true` if every check passed.
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            log::info!("{}_reg: {} checks passed", self.test_name, self.index);
            return true;
        }
        eprintln!(
            "FAILURE: {}_reg ({} of {} checks)",
            self.test_name,
            self.failures.len(),
            self.index
        );
        for failure in &self.failures {
            eprintln!("  {failure}");
        }
        false
    }

    /// No check has failed so far
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failed checks so far
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }
}

fn same_pixels(a: &Path, b: &Path) -> bool {
    match (provmap_io::read_image(a), provmap_io::read_image(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
