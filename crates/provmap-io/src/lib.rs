//! provmap-io - Province bitmap I/O
//!
//! Decodes province maps into [`RgbImage`] buffers and writes them back.
//! Province maps must be lossless, so only BMP and PNG are supported:
//!
//! - **BMP** - 1/4/8-bit palettized and 24/32-bit uncompressed (feature `bmp`)
//! - **PNG** - every color type, 8 or 16 bits (feature `png-format`)
//!
//! Every decoded image is flattened to 8-bit RGB; alpha is dropped.

#[cfg(feature = "bmp")]
pub mod bmp;
mod error;
pub mod format;
#[cfg(feature = "png-format")]
pub mod png;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format, detect_format_from_bytes};

use provmap_core::RgbImage;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Read an image from a file, detecting the format from its header.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<RgbImage> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    let file = File::open(path)?;
    let image = read_image_format(BufReader::new(file), format)?;
    log::debug!(
        "decoded {} as {:?} ({}x{})",
        path.display(),
        format,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Read an image from memory, detecting the format from its header.
pub fn read_image_mem(data: &[u8]) -> IoResult<RgbImage> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(Cursor::new(data), format)
}

fn read_image_format<R: std::io::BufRead + std::io::Seek>(
    reader: R,
    format: ImageFormat,
) -> IoResult<RgbImage> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::read_bmp(reader),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(reader),
        #[allow(unreachable_patterns)]
        other => Err(IoError::Disabled(other)),
    }
}

/// Write an image in the given format.
pub fn write_image<W: Write>(image: &RgbImage, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::write_bmp(image, writer),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(image, writer),
        #[allow(unreachable_patterns)]
        other => {
            let _ = (image, writer);
            Err(IoError::Disabled(other))
        }
    }
}

/// Write an image to a file, choosing the format from the extension
/// (BMP when the extension is missing or unknown).
pub fn write_image_file<P: AsRef<Path>>(image: &RgbImage, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Bmp);
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_image(image, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}
