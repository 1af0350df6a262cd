//! BMP image format support
//!
//! Reads uncompressed Windows Bitmap files of any common depth into RGB and
//! writes 24-bit bottom-up bitmaps.

use crate::{IoError, IoResult};
use provmap_core::{Color, RgbImage};
use std::io::{Read, Write};

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn le_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

/// Read a BMP image
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<RgbImage> {
    let mut file_header = [0u8; BMP_FILE_HEADER_SIZE];
    reader.read_exact(&mut file_header)?;

    if &file_header[0..2] != b"BM" {
        return Err(IoError::InvalidData("not a BMP file".to_string()));
    }

    let pixel_offset = le_u32(&file_header[10..14]) as usize;

    // Read info header (minimum 40 bytes)
    let mut info_header = [0u8; 40];
    reader.read_exact(&mut info_header)?;

    let header_size = le_u32(&info_header[0..4]);
    if header_size < BMP_INFO_HEADER_SIZE {
        return Err(IoError::InvalidData(format!(
            "unsupported BMP header size: {}",
            header_size
        )));
    }

    let width = le_i32(&info_header[4..8]);
    let height = le_i32(&info_header[8..12]);

    let planes = le_u16(&info_header[12..14]);
    if planes != 1 {
        return Err(IoError::InvalidData(format!(
            "unsupported number of planes: {}",
            planes
        )));
    }

    let bits_per_pixel = le_u16(&info_header[14..16]);
    let compression = le_u32(&info_header[16..20]);
    let colors_used = le_u32(&info_header[32..36]) as usize;

    // BI_RGB, or BI_BITFIELDS with the standard masks
    if compression != 0 && compression != 3 {
        return Err(IoError::Unsupported(format!("BMP compression {compression}")));
    }

    if !matches!(bits_per_pixel, 1 | 4 | 8 | 24 | 32) {
        return Err(IoError::Unsupported(format!("BMP bit depth {bits_per_pixel}")));
    }

    let width = width.unsigned_abs();
    let top_down = height < 0;
    let height = height.unsigned_abs();

    let extra_header = header_size as usize - BMP_INFO_HEADER_SIZE as usize;
    if extra_header > 0 {
        let mut skip = vec![0u8; extra_header];
        reader.read_exact(&mut skip)?;
    }
    let mut consumed = BMP_FILE_HEADER_SIZE + header_size as usize;

    // Palette for 1, 4 and 8 bit images, stored as BGRA quads
    let palette: Vec<Color> = if bits_per_pixel <= 8 {
        let max_colors = 1usize << bits_per_pixel;
        let num_colors = if colors_used == 0 || colors_used > max_colors {
            max_colors
        } else {
            colors_used
        };
        let mut raw = vec![0u8; num_colors * 4];
        reader.read_exact(&mut raw)?;
        consumed += raw.len();
        raw.chunks_exact(4)
            .map(|q| Color::new(q[2], q[1], q[0]))
            .collect()
    } else {
        Vec::new()
    };

    if pixel_offset > consumed {
        let mut skip = vec![0u8; pixel_offset - consumed];
        reader.read_exact(&mut skip)?;
    }

    let mut image = RgbImage::new(width, height)?;

    let lookup = |index: u8| -> IoResult<Color> {
        palette.get(index as usize).copied().ok_or_else(|| {
            IoError::InvalidData(format!("palette index {} out of range", index))
        })
    };

    // BMP rows are 4-byte aligned
    let row_stride = (width as usize * bits_per_pixel as usize).div_ceil(32) * 4;
    let mut row_buffer = vec![0u8; row_stride];

    for row in 0..height {
        reader.read_exact(&mut row_buffer)?;

        let y = if top_down { row } else { height - 1 - row };

        for x in 0..width {
            let color = match bits_per_pixel {
                1 => {
                    let byte_idx = (x / 8) as usize;
                    let bit_idx = 7 - (x % 8);
                    lookup((row_buffer[byte_idx] >> bit_idx) & 1)?
                }
                4 => {
                    let byte_idx = (x / 2) as usize;
                    let val = if x % 2 == 0 {
                        (row_buffer[byte_idx] >> 4) & 0xF
                    } else {
                        row_buffer[byte_idx] & 0xF
                    };
                    lookup(val)?
                }
                8 => lookup(row_buffer[x as usize])?,
                24 => {
                    let idx = (x as usize) * 3;
                    Color::new(row_buffer[idx + 2], row_buffer[idx + 1], row_buffer[idx])
                }
                _ => {
                    let idx = (x as usize) * 4;
                    Color::new(row_buffer[idx + 2], row_buffer[idx + 1], row_buffer[idx])
                }
            };
            image.set_rgb(x, y, color)?;
        }
    }

    Ok(image)
}

/// Write a 24-bit BMP image
pub fn write_bmp<W: Write>(image: &RgbImage, mut writer: W) -> IoResult<()> {
    let (width, height) = image.dimensions();
    let bits_per_pixel: u16 = 24;

    let row_stride = (width as usize * bits_per_pixel as usize).div_ceil(32) * 4;
    let pixel_data_size = row_stride * height as usize;

    let pixel_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
    let file_size = pixel_offset + pixel_data_size;

    // File header
    writer.write_all(b"BM")?;
    writer.write_all(&(file_size as u32).to_le_bytes())?;
    writer.write_all(&[0u8; 4])?; // Reserved
    writer.write_all(&(pixel_offset as u32).to_le_bytes())?;

    // Info header
    writer.write_all(&BMP_INFO_HEADER_SIZE.to_le_bytes())?;
    writer.write_all(&(width as i32).to_le_bytes())?;
    writer.write_all(&(height as i32).to_le_bytes())?; // Bottom-up
    writer.write_all(&1u16.to_le_bytes())?; // Planes
    writer.write_all(&bits_per_pixel.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?; // Compression
    writer.write_all(&(pixel_data_size as u32).to_le_bytes())?;
    writer.write_all(&0i32.to_le_bytes())?; // X pixels per meter
    writer.write_all(&0i32.to_le_bytes())?; // Y pixels per meter
    writer.write_all(&0u32.to_le_bytes())?; // Colors used
    writer.write_all(&0u32.to_le_bytes())?; // Important colors

    let mut row_buffer = vec![0u8; row_stride];

    for row in 0..height {
        let y = height - 1 - row;
        let src = image
            .row(y)
            .ok_or_else(|| IoError::Encode(format!("row {} out of range", y)))?;

        for (dst, rgb) in row_buffer.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
            dst[0] = rgb[2];
            dst[1] = rgb[1];
            dst[2] = rgb[0];
        }

        writer.write_all(&row_buffer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(width: i32, height: i32, bpp: u16, palette: &[[u8; 4]], data_len: usize) -> Vec<u8> {
        let offset = 14 + 40 + palette.len() * 4;
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&((offset + data_len) as u32).to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&bpp.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data_len as u32).to_le_bytes());
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        for quad in palette {
            out.extend_from_slice(quad);
        }
        out
    }

    #[test]
    fn test_bmp_roundtrip_24bit() {
        let mut image = RgbImage::new(5, 3).unwrap();
        image.set_rgb(0, 0, Color::new(255, 0, 0)).unwrap();
        image.set_rgb(1, 1, Color::new(0, 255, 0)).unwrap();
        image.set_rgb(4, 2, Color::new(0, 0, 255)).unwrap();

        let mut buffer = Vec::new();
        write_bmp(&image, &mut buffer).unwrap();
        // 5 px * 3 bytes = 15, padded to 16
        assert_eq!(buffer.len(), 54 + 16 * 3);

        let decoded = read_bmp(std::io::Cursor::new(buffer)).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_bmp_read_8bit_palette() {
        // 2x1 bottom-up, palette with two entries
        let palette = [[0, 0, 255, 0], [255, 0, 0, 0]];
        let mut data = header(2, 1, 8, &palette, 4);
        data.extend_from_slice(&[1, 0, 0, 0]);

        let image = read_bmp(std::io::Cursor::new(data)).unwrap();
        assert_eq!(image.color_at(0, 0), Color::new(0, 0, 255));
        assert_eq!(image.color_at(1, 0), Color::new(255, 0, 0));
    }

    #[test]
    fn test_bmp_read_1bit_top_down() {
        let palette = [[0, 0, 0, 0], [255, 255, 255, 0]];
        // 3x2 top-down: row 0 = 1,0,1 ; row 1 = 0,1,0
        let mut data = header(3, -2, 1, &palette, 8);
        data.extend_from_slice(&[0b1010_0000, 0, 0, 0]);
        data.extend_from_slice(&[0b0100_0000, 0, 0, 0]);

        let image = read_bmp(std::io::Cursor::new(data)).unwrap();
        let white = Color::new(255, 255, 255);
        let black = Color::new(0, 0, 0);
        assert_eq!(image.color_at(0, 0), white);
        assert_eq!(image.color_at(1, 0), black);
        assert_eq!(image.color_at(2, 0), white);
        assert_eq!(image.color_at(1, 1), white);
    }

    #[test]
    fn test_bmp_palette_index_out_of_range() {
        let palette = [[0, 0, 0, 0]];
        let mut data = header(1, 1, 8, &palette, 4);
        data.extend_from_slice(&[7, 0, 0, 0]);
        assert!(matches!(
            read_bmp(std::io::Cursor::new(data)),
            Err(IoError::InvalidData(_))
        ));
    }

    #[test]
    fn test_bmp_rejects_rle() {
        let mut data = header(1, 1, 8, &[], 0);
        data[30] = 1; // BI_RLE8
        assert!(matches!(
            read_bmp(std::io::Cursor::new(data)),
            Err(IoError::Unsupported(_))
        ));
    }
}
