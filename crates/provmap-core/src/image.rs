//! RgbImage - flat row-major RGB pixel buffer
//!
//! The province bitmaps are consumed once per side at load time. The
//! buffer stores three bytes per pixel, rows top to bottom, with no row
//! padding:
//!
//! ```text
//! offset(x, y) = (y * width + x) * 3
//! ```

use crate::color::Color;
use crate::error::{Error, Result};
use crate::point::Pixel;

/// An 8-bit RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbImage {
    /// Create a black image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = Self::buffer_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Wrap an existing buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `data` is not exactly
    /// `width * height * 3` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::buffer_len(width, height)?;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn buffer_len(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or(Error::InvalidDimension { width, height })
    }

    /// Image width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGB bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image, returning its buffer
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Whether `pixel` lies inside the image.
    #[inline]
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.x < self.width && pixel.y < self.height
    }

    /// Whether signed coordinates lie inside the image.
    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Color at `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.color_at(x, y))
    }

    /// Color at `(x, y)` without the bounds check on coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[inline]
    pub fn color_at(&self, x: u32, y: u32) -> Color {
        let i = self.offset(x, y);
        Color::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    /// Set the color at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] outside the image.
    pub fn set_rgb(&mut self, x: u32, y: u32, color: Color) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&color.to_array());
        Ok(())
    }

    /// Fill the whole image with one color.
    pub fn fill(&mut self, color: Color) {
        for px in self.data.chunks_exact_mut(3) {
            px.copy_from_slice(&color.to_array());
        }
    }

    /// Fill a rectangle, clipped to the image.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for yy in y..y_end {
            for xx in x..x_end {
                let i = self.offset(xx, yy);
                self.data[i..i + 3].copy_from_slice(&color.to_array());
            }
        }
    }

    /// One row of RGB bytes.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = self.offset(0, y);
        Some(&self.data[start..start + self.width as usize * 3])
    }
}
