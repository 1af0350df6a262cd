//! Pixel classification
//!
//! Decides for every pixel whether it is a *border* pixel or an
//! *interior* pixel and hands it to a [`PixelSink`]:
//!
//! - interior: all four axis-adjacent neighbors exist and share the
//!   pixel's exact color
//! - border: at least one neighbor differs; neighbors outside the image
//!   count as different, so every edge pixel is a border pixel
//!
//! The scan is a single row-major pass with O(1) neighbor lookups and no
//! copies of the buffer. Each row reads only itself and its two adjacent
//! rows, so [`classify_rows`] can be called on disjoint row ranges and the
//! resulting reports combined with [`ClassificationReport::merge`].

use crate::color::Color;
use crate::definitions::ProvinceDefinitions;
use crate::error::{Error, Result};
use crate::image::RgbImage;
use crate::point::Pixel;
use std::collections::HashMap;
use std::ops::Range;

/// Classification of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelClass {
    /// All four neighbors share the pixel's color
    Interior,
    /// Some neighbor differs or lies outside the image
    Border,
}

/// Receiver of classified pixels.
pub trait PixelSink {
    /// Accept a pixel. Returns `false` if the color belongs to no known
    /// region, which makes the pixel an orphan.
    fn accept(&mut self, pixel: Pixel, color: Color, class: PixelClass) -> bool;
}

impl PixelSink for ProvinceDefinitions {
    fn accept(&mut self, pixel: Pixel, color: Color, class: PixelClass) -> bool {
        self.register(pixel, color, class == PixelClass::Border)
    }
}

/// Counts of a classification pass.
///
/// Every scanned pixel lands in exactly one of `interior`, `border` or
/// `orphan`; orphans are not split by class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationReport {
    /// Interior pixels accepted by the sink
    pub interior: usize,
    /// Border pixels accepted by the sink
    pub border: usize,
    /// Pixels whose color the sink rejected
    pub orphan: usize,
    /// Orphan pixel count per color
    pub orphan_colors: HashMap<Color, usize>,
}

impl ClassificationReport {
    /// Total number of pixels scanned
    pub fn total(&self) -> usize {
        self.interior + self.border + self.orphan
    }

    /// No orphan pixels were found.
    pub fn is_clean(&self) -> bool {
        self.orphan == 0
    }

    /// Fold the counts of another (disjoint) pass into this one.
    pub fn merge(&mut self, other: ClassificationReport) {
        self.interior += other.interior;
        self.border += other.border;
        self.orphan += other.orphan;
        for (color, n) in other.orphan_colors {
            *self.orphan_colors.entry(color).or_insert(0) += n;
        }
    }

    /// Turn orphans into an error, for callers that treat them as fatal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrphanPixels`] if any orphan was found.
    pub fn check_orphans(&self) -> Result<()> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(Error::OrphanPixels {
                count: self.orphan,
                colors: self.orphan_colors.len(),
            })
        }
    }

    fn record(&mut self, color: Color, class: PixelClass, accepted: bool) {
        if !accepted {
            self.orphan += 1;
            *self.orphan_colors.entry(color).or_insert(0) += 1;
            return;
        }
        match class {
            PixelClass::Interior => self.interior += 1,
            PixelClass::Border => self.border += 1,
        }
    }
}

/// Whether the pixel at `(x, y)` is a border pixel.
///
/// # Panics
///
/// Panics if the coordinates are outside the image.
pub fn is_border_pixel(image: &RgbImage, x: u32, y: u32) -> bool {
    let (w, h) = image.dimensions();
    if x == 0 || y == 0 || x + 1 >= w || y + 1 >= h {
        return true;
    }
    let c = image.color_at(x, y);
    image.color_at(x - 1, y) != c
        || image.color_at(x + 1, y) != c
        || image.color_at(x, y - 1) != c
        || image.color_at(x, y + 1) != c
}

/// Classify every pixel lazily, row-major.
pub fn classify(image: &RgbImage) -> impl Iterator<Item = (Pixel, PixelClass, Color)> + '_ {
    let (w, h) = image.dimensions();
    (0..h).flat_map(move |y| {
        (0..w).map(move |x| {
            let class = if is_border_pixel(image, x, y) {
                PixelClass::Border
            } else {
                PixelClass::Interior
            };
            (Pixel::new(x, y), class, image.color_at(x, y))
        })
    })
}

/// Classify one row into `sink`, adding to `report`.
///
/// Rows past the bottom of the image are ignored.
pub fn classify_row<S: PixelSink + ?Sized>(
    image: &RgbImage,
    y: u32,
    sink: &mut S,
    report: &mut ClassificationReport,
) {
    let Some(row) = image.row(y) else {
        return;
    };
    let above = y.checked_sub(1).and_then(|yy| image.row(yy));
    let below = image.row(y + 1);
    let w = image.width() as usize;

    for x in 0..w {
        let i = x * 3;
        let px = &row[i..i + 3];
        let interior = x > 0
            && x + 1 < w
            && &row[i - 3..i] == px
            && &row[i + 3..i + 6] == px
            && same_at(above, i, px)
            && same_at(below, i, px);
        let class = if interior {
            PixelClass::Interior
        } else {
            PixelClass::Border
        };
        let color = Color::new(px[0], px[1], px[2]);
        let accepted = sink.accept(Pixel::new(x as u32, y), color, class);
        report.record(color, class, accepted);
    }
}

#[inline]
fn same_at(row: Option<&[u8]>, i: usize, px: &[u8]) -> bool {
    row.is_some_and(|r| &r[i..i + 3] == px)
}

/// Classify a range of rows into `sink`.
pub fn classify_rows<S: PixelSink + ?Sized>(
    image: &RgbImage,
    rows: Range<u32>,
    sink: &mut S,
) -> ClassificationReport {
    let mut report = ClassificationReport::default();
    let end = rows.end.min(image.height());
    for y in rows.start..end {
        classify_row(image, y, sink, &mut report);
    }
    report
}

/// Classify the whole image into `sink`.
pub fn classify_image<S: PixelSink + ?Sized>(image: &RgbImage, sink: &mut S) -> ClassificationReport {
    classify_rows(image, 0..image.height(), sink)
}

impl ProvinceDefinitions {
    /// Register every pixel of `image` into its province.
    ///
    /// Previously registered pixels are discarded first, so registering
    /// the same image twice yields the same state. Orphan pixels are
    /// recorded in [`ProvinceDefinitions::unmapped_pixels`] and summarized
    /// in the report; they never abort the scan.
    pub fn register_image(&mut self, image: &RgbImage) -> ClassificationReport {
        self.clear_pixels();
        let report = classify_image(image, self);
        log::info!(
            "registered {}x{} pixels: {} interior, {} border",
            image.width(),
            image.height(),
            report.interior,
            report.border
        );
        if !report.is_clean() {
            log::warn!(
                "{} pixels in {} colors match no declared province",
                report.orphan,
                report.orphan_colors.len()
            );
            for (color, n) in &report.orphan_colors {
                log::debug!("unmapped color {color}: {n} pixels");
            }
        }
        report
    }
}
