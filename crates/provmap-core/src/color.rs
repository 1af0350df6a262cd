//! Color - exact 3-channel RGB value
//!
//! Colors identify provinces: the definition table declares one color per
//! province and every pixel of that color in the bitmap belongs to it.
//! Equality is exact per channel; there is no tolerance.

use std::fmt;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Color {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
}

impl Color {
    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into `0x00RRGGBB`.
    #[inline]
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Unpack from `0x00RRGGBB`; the high byte is ignored.
    #[inline]
    pub fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// Build from the first three bytes of an RGB triple.
    #[inline]
    pub fn from_slice(rgb: &[u8]) -> Option<Self> {
        match rgb {
            [r, g, b, ..] => Some(Self::new(*r, *g, *b)),
            _ => None,
        }
    }

    /// Channels as an array.
    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.r, self.g, self.b)
    }
}
