//! PNG image format support

use crate::{IoError, IoResult};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use provmap_core::{Color, RgbImage};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
///
/// Grayscale is expanded to gray RGB, palettes are resolved, 16-bit samples
/// keep their high byte and alpha is discarded.
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<RgbImage> {
    let mut decoder = Decoder::new(reader);
    // Palettes and packed samples are resolved below
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::Decode(format!("PNG decode error: {}", e)))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;

    let palette: Vec<Color> = match (color_type, info.palette.as_ref()) {
        (ColorType::Indexed, Some(palette)) => {
            let palette_bytes: &[u8] = palette;
            palette_bytes
                .chunks_exact(3)
                .map(|c| Color::new(c[0], c[1], c[2]))
                .collect()
        }
        (ColorType::Indexed, None) => {
            return Err(IoError::InvalidData(
                "indexed PNG without palette".to_string(),
            ));
        }
        _ => Vec::new(),
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::Decode("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::Decode(format!("PNG frame error: {}", e)))?;

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];

    let bits = bit_depth as u32;

    // Sub-byte sample at position x of a packed row
    let packed = |row: &[u8], x: u32| -> u8 {
        let per_byte = 8 / bits;
        let byte = row[(x / per_byte) as usize];
        let shift = 8 - bits * (x % per_byte + 1);
        (byte >> shift) & ((1u16 << bits) - 1) as u8
    };

    let mut image = RgbImage::new(width, height)?;

    for y in 0..height {
        let row_start = y as usize * bytes_per_row;
        let row = &data[row_start..row_start + bytes_per_row];

        for x in 0..width {
            let xi = x as usize;
            let color = match color_type {
                ColorType::Indexed => {
                    let index = if bits == 8 { row[xi] } else { packed(row, x) };
                    palette.get(index as usize).copied().ok_or_else(|| {
                        IoError::InvalidData(format!("palette index {} out of range", index))
                    })?
                }
                ColorType::Grayscale => {
                    let g = match bits {
                        16 => row[xi * 2],
                        8 => row[xi],
                        _ => {
                            let max = (1u16 << bits) - 1;
                            ((packed(row, x) as u16 * 255) / max) as u8
                        }
                    };
                    Color::new(g, g, g)
                }
                ColorType::GrayscaleAlpha => {
                    let samples = if bits == 16 { 4 } else { 2 };
                    let g = row[xi * samples];
                    Color::new(g, g, g)
                }
                ColorType::Rgb | ColorType::Rgba => {
                    let channels = if color_type == ColorType::Rgb { 3 } else { 4 };
                    let step = if bits == 16 { 2 } else { 1 };
                    let idx = xi * channels * step;
                    Color::new(row[idx], row[idx + step], row[idx + 2 * step])
                }
                #[allow(unreachable_patterns)]
                other => {
                    return Err(IoError::Unsupported(format!("PNG color type {other:?}")));
                }
            };
            image.set_rgb(x, y, color)?;
        }
    }

    Ok(image)
}

/// Write an 8-bit RGB PNG image
pub fn write_png<W: Write>(image: &RgbImage, writer: W) -> IoResult<()> {
    let (width, height) = image.dimensions();

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::Encode(format!("PNG header error: {}", e)))?;

    writer
        .write_image_data(image.data())
        .map_err(|e| IoError::Encode(format!("PNG write error: {}", e)))?;

    Ok(())
}
