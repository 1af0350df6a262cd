//! Text input helpers shared by the table readers
//!
//! Definition and mapping tables are frequently saved by game tools in
//! Windows-1252. Input that is not valid UTF-8 is decoded as Latin-1 so
//! that province names survive instead of failing the whole load.

use crate::error::{Error, Result};
use std::io::Read;

/// Maximum input size in bytes.
pub const MAX_INPUT_SIZE: usize = 256_000_000;

/// Decode bytes as UTF-8, falling back to Latin-1.
pub fn decode_text(data: &[u8]) -> String {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => data.iter().map(|&b| b as char).collect(),
    }
}

/// Read from a reader with a size limit.
pub fn read_limited(reader: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take((MAX_INPUT_SIZE + 1) as u64)
        .read_to_end(&mut buf)?;
    if buf.len() > MAX_INPUT_SIZE {
        return Err(Error::DecodeError(format!(
            "input too large: exceeds maximum allowed size of {MAX_INPUT_SIZE} bytes"
        )));
    }
    Ok(buf)
}
