//! Reading definition tables
//!
//! # Format
//!
//! ```text
//! province;name;red;green;blue;x
//! 1;Stockholm;128;34;64;x
//! 2;Östergötland;0;36;128;x
//! ```
//!
//! Fields are separated by `;`; anything after the blue component is
//! ignored. Blank lines and lines starting with `#` are skipped, as is a
//! first line whose id field is not a number (a header).
//!
//! A row that fails to parse is skipped and recorded in the
//! [`DefinitionReport`]. Duplicate colors and duplicate ids abort the
//! load: no definitions are returned in that case.

use crate::color::Color;
use crate::definitions::ProvinceDefinitions;
use crate::error::{Error, Result};
use crate::province::Province;
use crate::text::{decode_text, read_limited};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Field separator
const SEPARATOR: char = ';';

/// Minimum number of fields: id, name, r, g, b
const MIN_FIELDS: usize = 5;

/// Non-fatal outcome of a definition load.
#[derive(Debug, Default)]
pub struct DefinitionReport {
    /// Rows turned into provinces
    pub loaded: usize,
    /// Rows skipped as [`Error::MalformedRow`]
    pub malformed: Vec<Error>,
}

impl DefinitionReport {
    /// No row was skipped.
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }
}

impl ProvinceDefinitions {
    /// Parse a definition table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColor`] or [`Error::DuplicateId`]; both
    /// abort the whole load.
    pub fn load_definitions(text: &str) -> Result<(Self, DefinitionReport)> {
        let mut defs = ProvinceDefinitions::new();
        let mut report = DefinitionReport::default();
        let mut seen_data = false;

        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let first_row = !seen_data;
            seen_data = true;

            match parse_row(trimmed, line_no) {
                Ok(province) => {
                    defs.insert(province, line_no)?;
                    report.loaded += 1;
                }
                Err(_) if first_row && !starts_with_digit(trimmed) => {
                    log::debug!("skipping definition header: {trimmed}");
                }
                Err(e) => {
                    log::warn!("{e}");
                    report.malformed.push(e);
                }
            }
        }

        log::info!(
            "loaded {} provinces ({} malformed rows skipped)",
            report.loaded,
            report.malformed.len()
        );
        Ok((defs, report))
    }

    /// Parse a definition table from raw bytes (UTF-8 or Latin-1).
    pub fn load_definitions_bytes(data: &[u8]) -> Result<(Self, DefinitionReport)> {
        Self::load_definitions(&decode_text(data))
    }

    /// Parse a definition table from a reader.
    pub fn load_definitions_reader(reader: &mut impl Read) -> Result<(Self, DefinitionReport)> {
        let buf = read_limited(reader)?;
        Self::load_definitions_bytes(&buf)
    }

    /// Parse a definition table from a file.
    pub fn load_definitions_file(path: impl AsRef<Path>) -> Result<(Self, DefinitionReport)> {
        let file = File::open(path.as_ref())?;
        Self::load_definitions_reader(&mut BufReader::new(file))
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

fn starts_with_digit(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Parse one `id;name;r;g;b;...` row.
fn parse_row(line: &str, line_no: usize) -> Result<Province> {
    let fields: Vec<&str> = line.split(SEPARATOR).map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return Err(malformed(
            line_no,
            format!(
                "expected at least {MIN_FIELDS} fields, found {}",
                fields.len()
            ),
        ));
    }

    let id = fields[0]
        .parse::<u32>()
        .map_err(|e| malformed(line_no, format!("invalid province id '{}': {e}", fields[0])))?;
    let name = fields[1];
    let r = parse_component(fields[2], "red", line_no)?;
    let g = parse_component(fields[3], "green", line_no)?;
    let b = parse_component(fields[4], "blue", line_no)?;

    Ok(Province::new(id, name, Color::new(r, g, b)))
}

fn parse_component(field: &str, channel: &str, line_no: usize) -> Result<u8> {
    field
        .parse::<u8>()
        .map_err(|e| malformed(line_no, format!("invalid {channel} component '{field}': {e}")))
}

fn malformed(line: usize, reason: String) -> Error {
    Error::MalformedRow { line, reason }
}
