//! Mapping table format
//!
//! # Format
//!
//! ```text
//! # comment line (ignored)
//! [version 0.0.0]
//! 1 = 2
//! 1,3 = 4 # coastal provinces
//! = 7
//! "Upper Egypt" = 9
//! point 10,20 -> 30,40
//! point 12,22 -> _
//! ```
//!
//! `[version NAME]` starts a version; rows before the first header belong
//! to a version named [`DEFAULT_VERSION_NAME`]. A link row lists source
//! references, `=`, target references and an optional `#` comment. A
//! reference is a decimal province id, a bare province name or a
//! double-quoted name. Either side may be empty, but not both.
//!
//! Saved tables reference provinces by id only, comma separated without
//! spaces.

use crate::error::LinkError;
use crate::link::Link;
use crate::version::LinkMappingVersion;
use provmap_core::{Pixel, PointPair, ProvinceDefinitions, Side};
use std::fmt::Write as _;

/// Name of the version holding rows that precede any header
pub const DEFAULT_VERSION_NAME: &str = "0.0.0";

const VERSION_PREFIX: &str = "[version";
const POINT_PREFIX: &str = "point ";
const POINT_ARROW: &str = "->";
const MISSING_POINT: &str = "_";

/// Non-fatal outcome of a mapping load.
#[derive(Debug, Default)]
pub struct MappingReport {
    /// Versions created
    pub versions: usize,
    /// Link rows turned into links
    pub links: usize,
    /// Point rows loaded
    pub points: usize,
    /// Rows skipped, as [`LinkError::MalformedRow`],
    /// [`LinkError::UnresolvedProvince`] or
    /// [`LinkError::ProvinceAlreadyLinked`]
    pub skipped: Vec<LinkError>,
}

impl MappingReport {
    /// No row was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// One parsed line of a mapping table
#[derive(Debug, PartialEq)]
pub(crate) enum Row<'a> {
    Version(&'a str),
    Link {
        source: Vec<Reference<'a>>,
        target: Vec<Reference<'a>>,
        comment: Option<&'a str>,
    },
    Point(PointPair),
}

/// How a link row names a province
#[derive(Debug, PartialEq)]
pub(crate) enum Reference<'a> {
    Id(u32),
    Name(&'a str),
}

impl Reference<'_> {
    fn resolve(&self, defs: &ProvinceDefinitions) -> Option<u32> {
        match *self {
            Reference::Id(id) => defs.contains_id(id).then_some(id),
            Reference::Name(name) => defs.province_by_name(name).map(|p| p.id()),
        }
    }

    fn text(&self) -> String {
        match self {
            Reference::Id(id) => id.to_string(),
            Reference::Name(name) => (*name).to_string(),
        }
    }
}

/// Build versions from a mapping table, resolving references against both
/// definition sets. Bad rows are skipped into the report.
pub(crate) fn parse_versions(
    text: &str,
    source_defs: &ProvinceDefinitions,
    target_defs: &ProvinceDefinitions,
) -> (Vec<LinkMappingVersion>, MappingReport) {
    let mut versions: Vec<LinkMappingVersion> = Vec::new();
    let mut report = MappingReport::default();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let row = match parse_row(line, line_no) {
            Ok(Some(row)) => row,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("{e}");
                report.skipped.push(e);
                continue;
            }
        };

        if let Row::Version(name) = row {
            versions.push(LinkMappingVersion::new(name));
            continue;
        }
        if versions.is_empty() {
            versions.push(LinkMappingVersion::new(DEFAULT_VERSION_NAME));
        }
        let Some(version) = versions.last_mut() else {
            continue;
        };

        let outcome = match row {
            Row::Link {
                source,
                target,
                comment,
            } => apply_link(version, line_no, &source, &target, comment, source_defs, target_defs)
                .map(|()| report.links += 1),
            Row::Point(pair) => version
                .add_point_pair(pair.source, pair.target)
                .map(|_| report.points += 1),
            Row::Version(_) => Ok(()),
        };
        if let Err(e) = outcome {
            log::warn!("line {line_no}: {e}");
            report.skipped.push(e);
        }
    }

    report.versions = versions.len();
    (versions, report)
}

fn apply_link(
    version: &mut LinkMappingVersion,
    line_no: usize,
    source: &[Reference<'_>],
    target: &[Reference<'_>],
    comment: Option<&str>,
    source_defs: &ProvinceDefinitions,
    target_defs: &ProvinceDefinitions,
) -> Result<(), LinkError> {
    let source_ids = resolve_all(source, Side::Source, source_defs, line_no)?;
    let target_ids = resolve_all(target, Side::Target, target_defs, line_no)?;
    let id = version.add_link(source_ids, target_ids)?;
    if comment.is_some() {
        version.set_comment(id, comment.map(str::to_string))?;
    }
    Ok(())
}

fn resolve_all(
    refs: &[Reference<'_>],
    side: Side,
    defs: &ProvinceDefinitions,
    line: usize,
) -> Result<Vec<u32>, LinkError> {
    refs.iter()
        .map(|r| {
            r.resolve(defs).ok_or_else(|| LinkError::UnresolvedProvince {
                line,
                side,
                reference: r.text(),
            })
        })
        .collect()
}

// ============================================================================
// Row parsing
// ============================================================================

fn malformed(line: usize, reason: impl Into<String>) -> LinkError {
    LinkError::MalformedRow {
        line,
        reason: reason.into(),
    }
}

/// Parse one line; `None` for blank and comment lines.
pub(crate) fn parse_row(line: &str, line_no: usize) -> Result<Option<Row<'_>>, LinkError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    if let Some(rest) = trimmed.strip_prefix(VERSION_PREFIX) {
        let name = rest
            .strip_suffix(']')
            .ok_or_else(|| malformed(line_no, "version header is missing ']'"))?
            .trim();
        if name.is_empty() {
            return Err(malformed(line_no, "version header without a name"));
        }
        return Ok(Some(Row::Version(name)));
    }

    if let Some(rest) = trimmed.strip_prefix(POINT_PREFIX) {
        return parse_point(rest, line_no).map(|p| Some(Row::Point(p)));
    }

    parse_link(trimmed, line_no).map(Some)
}

/// Split `text` at every unquoted occurrence of `sep`.
fn split_unquoted(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Split a link row at its first unquoted `#`.
///
/// The comment is free text; quotes inside it are not balanced.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => {
                let comment = line[i + 1..].trim();
                return (&line[..i], (!comment.is_empty()).then_some(comment));
            }
            _ => {}
        }
    }
    (line, None)
}

fn parse_link(line: &str, line_no: usize) -> Result<Row<'_>, LinkError> {
    let (body, comment) = split_comment(line);
    if body.matches('"').count() % 2 != 0 {
        return Err(malformed(line_no, "unbalanced quotes"));
    }

    let sides = split_unquoted(body, '=');
    let [source, target] = sides.as_slice() else {
        return Err(malformed(
            line_no,
            format!("expected exactly one '=', found {}", sides.len() - 1),
        ));
    };

    let source = parse_references(source, line_no)?;
    let target = parse_references(target, line_no)?;
    if source.is_empty() && target.is_empty() {
        return Err(malformed(line_no, "link without provinces"));
    }

    Ok(Row::Link {
        source,
        target,
        comment,
    })
}

fn parse_references(side: &str, line_no: usize) -> Result<Vec<Reference<'_>>, LinkError> {
    if side.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_unquoted(side, ',')
        .into_iter()
        .map(|token| parse_reference(token.trim(), line_no))
        .collect()
}

fn parse_reference(token: &str, line_no: usize) -> Result<Reference<'_>, LinkError> {
    if token.is_empty() {
        return Err(malformed(line_no, "empty province reference"));
    }
    if let Some(quoted) = token.strip_prefix('"') {
        let name = quoted
            .strip_suffix('"')
            .ok_or_else(|| malformed(line_no, format!("bad quoted name {token}")))?;
        return Ok(Reference::Name(name));
    }
    if token.contains('"') {
        return Err(malformed(line_no, format!("stray quote in {token}")));
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return token
            .parse::<u32>()
            .map(Reference::Id)
            .map_err(|e| malformed(line_no, format!("invalid province id '{token}': {e}")));
    }
    Ok(Reference::Name(token))
}

fn parse_point(rest: &str, line_no: usize) -> Result<PointPair, LinkError> {
    let Some((source, target)) = rest.split_once(POINT_ARROW) else {
        return Err(malformed(line_no, format!("point row without '{POINT_ARROW}'")));
    };
    let source = parse_pixel(source.trim(), line_no)?;
    let target = parse_pixel(target.trim(), line_no)?;
    if source.is_none() && target.is_none() {
        return Err(malformed(line_no, "point row with both sides missing"));
    }
    Ok(PointPair::new(source, target))
}

fn parse_pixel(text: &str, line_no: usize) -> Result<Option<Pixel>, LinkError> {
    if text == MISSING_POINT {
        return Ok(None);
    }
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| malformed(line_no, format!("invalid point '{text}'")))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| malformed(line_no, format!("invalid coordinate '{v}': {e}")))
    };
    Ok(Some(Pixel::new(coord(x)?, coord(y)?)))
}

// ============================================================================
// Writing
// ============================================================================

fn join_ids<'a>(ids: impl IntoIterator<Item = &'a u32>) -> String {
    ids.into_iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn write_pixel(out: &mut String, pixel: Option<Pixel>) {
    match pixel {
        Some(p) => {
            let _ = write!(out, "{},{}", p.x, p.y);
        }
        None => out.push_str(MISSING_POINT),
    }
}

/// One link in canonical form, without line terminator
pub fn format_link(link: &Link) -> String {
    let mut line = format!(
        "{} = {}",
        join_ids(link.source_provinces()),
        join_ids(link.target_provinces())
    )
    .trim()
    .to_string();
    if let Some(comment) = link.comment() {
        line.push_str(" # ");
        line.push_str(comment);
    }
    line
}

/// One point pair in canonical form, without line terminator
pub fn format_point(pair: &PointPair) -> String {
    let mut line = String::from(POINT_PREFIX);
    write_pixel(&mut line, pair.source);
    line.push(' ');
    line.push_str(POINT_ARROW);
    line.push(' ');
    write_pixel(&mut line, pair.target);
    line
}

/// Rows of one version: links, then points.
pub(crate) fn write_version_rows(version: &LinkMappingVersion, out: &mut String) {
    for link in version.links() {
        out.push_str(&format_link(link));
        out.push('\n');
    }
    for pair in version.points() {
        out.push_str(&format_point(pair));
        out.push('\n');
    }
}

/// Trimmed `name` if it can be written as a version header and read back.
pub(crate) fn check_version_name(name: &str) -> Result<&str, LinkError> {
    let trimmed = name.trim();
    let reason = if trimmed.is_empty() {
        "empty name"
    } else if trimmed.contains(['\r', '\n']) {
        "line break in name"
    } else if trimmed.contains(']') {
        "']' in name"
    } else {
        return Ok(trimmed);
    };
    Err(LinkError::InvalidVersionName {
        name: name.to_string(),
        reason,
    })
}

/// Version header line, without line terminator
pub(crate) fn format_header(version: &LinkMappingVersion) -> String {
    format!("{VERSION_PREFIX} {}]", version.name())
}
