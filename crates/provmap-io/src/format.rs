//! Image format detection by header bytes or file extension

use crate::{IoError, IoResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header length needed to tell the formats apart
const SNIFF_LEN: u64 = 8;

/// Supported province map formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Windows bitmap
    Bmp,
    /// Portable Network Graphics
    Png,
}

impl ImageFormat {
    /// Conventional file extension
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Bmp => "bmp",
            ImageFormat::Png => "png",
        }
    }

    /// Format implied by a path's extension, if recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        [ImageFormat::Bmp, ImageFormat::Png]
            .into_iter()
            .find(|f| ext.eq_ignore_ascii_case(f.extension()))
    }
}

/// Detect the format of a file from its first bytes.
pub fn detect_format<P: AsRef<Path>>(path: P) -> IoResult<ImageFormat> {
    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the format of in-memory data from its first bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<ImageFormat> {
    match data {
        [b'B', b'M', ..] => Ok(ImageFormat::Bmp),
        [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', ..] => Ok(ImageFormat::Png),
        _ if data.len() < 2 => Err(IoError::InvalidData(format!(
            "{} bytes is too short for an image header",
            data.len()
        ))),
        _ => Err(IoError::UnknownFormat),
    }
}
