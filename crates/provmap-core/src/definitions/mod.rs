//! ProvinceDefinitions - every province of one map side
//!
//! Built once from a definition table (see [`serial`]) and populated by
//! the image scan (see [`crate::classify`]). Lookups by color and by id
//! go through hash indices rebuilt on load, so both are O(1).
//!
//! Pixels whose color matches no declared province are not an error at
//! registration time: they are collected in a side channel so that the
//! scan always completes over the whole image, and surfaced afterwards
//! as a summary.

pub mod serial;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::image::RgbImage;
use crate::point::Pixel;
use crate::province::Province;
use std::collections::HashMap;

pub use serial::DefinitionReport;

/// All provinces declared for one map side.
#[derive(Debug, Clone, Default)]
pub struct ProvinceDefinitions {
    provinces: Vec<Province>,
    by_color: HashMap<Color, usize>,
    by_id: HashMap<u32, usize>,
    unmapped: Vec<Pixel>,
}

impl ProvinceDefinitions {
    /// Create an empty set of definitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from provinces, failing on the first duplicate color or id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColor`] or [`Error::DuplicateId`].
    pub fn from_provinces(provinces: impl IntoIterator<Item = Province>) -> Result<Self> {
        let mut defs = Self::new();
        for (i, province) in provinces.into_iter().enumerate() {
            defs.insert(province, i + 1)?;
        }
        Ok(defs)
    }

    /// Add a province, keeping both indices unique.
    ///
    /// `line` is only used for error reporting.
    pub(crate) fn insert(&mut self, province: Province, line: usize) -> Result<()> {
        if let Some(&existing) = self.by_color.get(&province.color()) {
            return Err(Error::DuplicateColor {
                color: province.color(),
                first: self.provinces[existing].id(),
                second: province.id(),
            });
        }
        if self.by_id.contains_key(&province.id()) {
            return Err(Error::DuplicateId {
                id: province.id(),
                line,
            });
        }
        let index = self.provinces.len();
        self.by_color.insert(province.color(), index);
        self.by_id.insert(province.id(), index);
        self.provinces.push(province);
        Ok(())
    }

    /// Number of provinces
    #[inline]
    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }

    /// Provinces in declaration order
    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    /// Iterate over provinces in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, Province> {
        self.provinces.iter()
    }

    /// Province with the given id
    pub fn province(&self, id: u32) -> Option<&Province> {
        self.by_id.get(&id).map(|&i| &self.provinces[i])
    }

    /// Whether a province with this id is declared
    pub fn contains_id(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Province declared with exactly this color
    pub fn province_by_color(&self, color: Color) -> Option<&Province> {
        self.by_color.get(&color).map(|&i| &self.provinces[i])
    }

    /// First province declared with this name.
    ///
    /// Names are not required to be unique; this is a linear scan used
    /// when resolving textual references.
    pub fn province_by_name(&self, name: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.name() == name)
    }

    /// Province under `pixel` on `image`.
    pub fn province_at(&self, image: &RgbImage, pixel: Pixel) -> Option<&Province> {
        let color = image.get_rgb(pixel.x, pixel.y)?;
        self.province_by_color(color)
    }

    /// Register an interior pixel by hand.
    ///
    /// Returns `Ok(false)` (and records the pixel as unmapped) if the color
    /// matches no declared province. Each coordinate is checked against
    /// every registered pixel, so this is linear in the pixels held;
    /// [`Self::register_image`] is the bulk path.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicatePixel`] if the coordinate is already registered,
    /// as interior, border or unmapped.
    pub fn register_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> Result<bool> {
        self.register_checked(Pixel::new(x, y), Color::new(r, g, b), false)
    }

    /// Register a border pixel by hand. See [`Self::register_pixel`].
    ///
    /// # Errors
    ///
    /// [`Error::DuplicatePixel`] if the coordinate is already registered.
    pub fn register_border_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> Result<bool> {
        self.register_checked(Pixel::new(x, y), Color::new(r, g, b), true)
    }

    /// Whether `pixel` is held by any province or the unmapped set
    pub fn is_registered(&self, pixel: Pixel) -> bool {
        self.unmapped.contains(&pixel)
            || self.provinces.iter().any(|p| {
                p.interior_pixels().contains(&pixel) || p.border_pixels().contains(&pixel)
            })
    }

    fn register_checked(&mut self, pixel: Pixel, color: Color, border: bool) -> Result<bool> {
        if self.is_registered(pixel) {
            return Err(Error::DuplicatePixel {
                x: pixel.x,
                y: pixel.y,
            });
        }
        Ok(self.register(pixel, color, border))
    }

    /// Route one pixel by color. The image scan visits each coordinate
    /// once, so no duplicate check happens here.
    pub(crate) fn register(&mut self, pixel: Pixel, color: Color, border: bool) -> bool {
        match self.by_color.get(&color) {
            Some(&index) => {
                let province = &mut self.provinces[index];
                if border {
                    province.push_border(pixel);
                } else {
                    province.push_interior(pixel);
                }
                true
            }
            None => {
                self.unmapped.push(pixel);
                false
            }
        }
    }

    /// Pixels registered with a color that no province declares
    pub fn unmapped_pixels(&self) -> &[Pixel] {
        &self.unmapped
    }

    /// Forget all registered pixels, keeping the declarations.
    pub fn clear_pixels(&mut self) {
        for province in &mut self.provinces {
            province.clear_pixels();
        }
        self.unmapped.clear();
    }

    /// Declared provinces that received no pixels.
    pub fn provinces_without_pixels(&self) -> impl Iterator<Item = &Province> {
        self.provinces.iter().filter(|p| !p.has_pixels())
    }
}

impl<'a> IntoIterator for &'a ProvinceDefinitions {
    type Item = &'a Province;
    type IntoIter = std::slice::Iter<'a, Province>;

    fn into_iter(self) -> Self::IntoIter {
        self.provinces.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_provinces() -> ProvinceDefinitions {
        ProvinceDefinitions::from_provinces([
            Province::new(1, "Red", Color::new(255, 0, 0)),
            Province::new(2, "Blue", Color::new(0, 0, 255)),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookups() {
        let defs = two_provinces();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs.province(2).unwrap().name(), "Blue");
        assert_eq!(
            defs.province_by_color(Color::new(255, 0, 0)).unwrap().id(),
            1
        );
        assert_eq!(defs.province_by_name("Blue").unwrap().id(), 2);
        assert!(defs.province(3).is_none());
    }

    #[test]
    fn test_duplicate_color_rejected() {
        let err = ProvinceDefinitions::from_provinces([
            Province::new(1, "A", Color::new(1, 1, 1)),
            Province::new(2, "B", Color::new(1, 1, 1)),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateColor {
                first: 1,
                second: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = ProvinceDefinitions::from_provinces([
            Province::new(1, "A", Color::new(1, 1, 1)),
            Province::new(1, "B", Color::new(2, 2, 2)),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateId { id: 1, .. }));
    }

    #[test]
    fn test_register_routes_by_color() {
        let mut defs = two_provinces();
        assert!(defs.register_pixel(0, 0, 255, 0, 0).unwrap());
        assert!(defs.register_border_pixel(1, 0, 255, 0, 0).unwrap());
        assert!(!defs.register_pixel(2, 0, 9, 9, 9).unwrap());

        let red = defs.province(1).unwrap();
        assert_eq!(red.interior_pixels(), &[Pixel::new(0, 0)]);
        assert_eq!(red.border_pixels(), &[Pixel::new(1, 0)]);
        assert_eq!(defs.unmapped_pixels(), &[Pixel::new(2, 0)]);
        assert_eq!(defs.provinces_without_pixels().count(), 1);

        defs.clear_pixels();
        assert_eq!(defs.province(1).unwrap().pixel_count(), 0);
        assert!(defs.unmapped_pixels().is_empty());
    }

    #[test]
    fn test_register_rejects_known_coordinate() {
        let mut defs = two_provinces();
        assert!(defs.register_pixel(3, 4, 255, 0, 0).unwrap());
        assert!(!defs.register_pixel(5, 5, 9, 9, 9).unwrap());

        // same spot again, as border, or under another province's color
        for result in [
            defs.register_pixel(3, 4, 255, 0, 0),
            defs.register_border_pixel(3, 4, 255, 0, 0),
            defs.register_pixel(3, 4, 0, 0, 255),
            defs.register_border_pixel(5, 5, 0, 0, 255),
        ] {
            assert!(matches!(result, Err(Error::DuplicatePixel { .. })));
        }

        assert_eq!(defs.province(1).unwrap().pixel_count(), 1);
        assert_eq!(defs.province(2).unwrap().pixel_count(), 0);
        assert_eq!(defs.unmapped_pixels().len(), 1);
        assert!(defs.is_registered(Pixel::new(3, 4)));
        assert!(!defs.is_registered(Pixel::new(4, 3)));
    }
}
