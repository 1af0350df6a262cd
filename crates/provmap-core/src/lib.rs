//! provmap-core - Basic data structures for province mapping
//!
//! This crate provides the fundamental data structures shared by the
//! other province mapper crates:
//!
//! - [`Color`] - Exact 3-channel color, the join key between pixels and provinces
//! - [`Pixel`] / [`Side`] / [`PointPair`] - Image coordinates and point correspondences
//! - [`RgbImage`] - Flat row-major RGB pixel buffer
//! - [`Province`] - A region with its interior and border pixels
//! - [`ProvinceDefinitions`] - All provinces of one map side with color/id indices
//! - [`classify`] - Border/interior pixel classification
//!
//! # Example
//!
//! ```
//! use provmap_core::{Color, ProvinceDefinitions, RgbImage};
//!
//! let (mut defs, report) = ProvinceDefinitions::load_definitions("1;Red;255;0;0\n").unwrap();
//! assert!(report.is_clean());
//!
//! let mut image = RgbImage::new(2, 2).unwrap();
//! image.fill(Color::new(255, 0, 0));
//! let classification = defs.register_image(&image);
//! assert_eq!(classification.border, 4);
//! assert_eq!(defs.province(1).unwrap().pixel_count(), 4);
//! ```

pub mod classify;
pub mod color;
pub mod definitions;
pub mod error;
pub mod image;
pub mod point;
pub mod province;
pub mod text;

pub use classify::{
    ClassificationReport, PixelClass, PixelSink, classify, classify_image, classify_row,
    classify_rows, is_border_pixel,
};
pub use color::Color;
pub use definitions::{DefinitionReport, ProvinceDefinitions};
pub use error::{Error, Result};
pub use image::RgbImage;
pub use point::{Pixel, PointPair, Side};
pub use province::{Bounds, Province};
pub use text::decode_text;
