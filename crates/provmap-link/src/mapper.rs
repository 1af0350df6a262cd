//! Versioned link mapper
//!
//! [`LinkMapper`] holds an ordered list of [`LinkMappingVersion`]s and the
//! index of the active one. There is always at least one version.

use crate::error::{LinkError, LinkResult};
use crate::serial::{self, DEFAULT_VERSION_NAME, MappingReport};
use crate::version::LinkMappingVersion;
use provmap_core::{ProvinceDefinitions, Side, decode_text};
use std::fs;
use std::path::Path;

/// Suffix appended to the name of a branched version
const COPY_SUFFIX: &str = " copy";

/// The set of mapping versions with one active version.
#[derive(Debug, Clone)]
pub struct LinkMapper {
    versions: Vec<LinkMappingVersion>,
    active: usize,
    /// Image dimensions of each side, copied into every version
    bounds: [Option<(u32, u32)>; 2],
}

impl Default for LinkMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkMapper {
    /// A mapper holding one empty version named [`DEFAULT_VERSION_NAME`].
    pub fn new() -> Self {
        Self {
            versions: vec![LinkMappingVersion::new(DEFAULT_VERSION_NAME)],
            active: 0,
            bounds: [None, None],
        }
    }

    /// Parse a mapping table against both definition sets.
    ///
    /// Rows with unknown references, already-linked provinces or syntax
    /// errors are skipped and listed in the report. The first version is
    /// active.
    pub fn load_mappings(
        text: &str,
        source_defs: &ProvinceDefinitions,
        target_defs: &ProvinceDefinitions,
    ) -> (Self, MappingReport) {
        let (versions, report) = serial::parse_versions(text, source_defs, target_defs);
        let mapper = if versions.is_empty() {
            Self::new()
        } else {
            Self {
                versions,
                active: 0,
                bounds: [None, None],
            }
        };

        log::info!(
            "loaded {} links and {} points in {} versions ({} rows skipped)",
            report.links,
            report.points,
            mapper.versions.len(),
            report.skipped.len()
        );
        (mapper, report)
    }

    /// Read a mapping table from a file.
    pub fn load_mappings_file(
        path: impl AsRef<Path>,
        source_defs: &ProvinceDefinitions,
        target_defs: &ProvinceDefinitions,
    ) -> LinkResult<(Self, MappingReport)> {
        let data = fs::read(path.as_ref())?;
        Ok(Self::load_mappings(
            &decode_text(&data),
            source_defs,
            target_defs,
        ))
    }

    /// Write every version to a file.
    pub fn save_mappings_file(&self, path: impl AsRef<Path>) -> LinkResult<()> {
        let path = path.as_ref();
        fs::write(path, self.save_all())?;
        log::info!(
            "saved {} versions to {}",
            self.versions.len(),
            path.display()
        );
        Ok(())
    }

    /// Rows of one version in canonical form, without its header.
    pub fn save_mappings(&self, index: usize) -> LinkResult<String> {
        let version = self.version(index).ok_or(LinkError::VersionOutOfRange {
            index,
            len: self.versions.len(),
        })?;
        let mut out = String::new();
        serial::write_version_rows(version, &mut out);
        Ok(out)
    }

    /// Every version with its header, in order.
    pub fn save_all(&self) -> String {
        let mut out = String::new();
        for version in &self.versions {
            out.push_str(&serial::format_header(version));
            out.push('\n');
            serial::write_version_rows(version, &mut out);
        }
        out
    }

    // ------------------------------------------------------------------
    // Version access
    // ------------------------------------------------------------------

    /// The active version
    pub fn active_version(&self) -> &LinkMappingVersion {
        &self.versions[self.active]
    }

    /// The active version, for mutation
    pub fn active_version_mut(&mut self) -> &mut LinkMappingVersion {
        &mut self.versions[self.active]
    }

    /// Index of the active version
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// All versions
    pub fn versions(&self) -> &[LinkMappingVersion] {
        &self.versions
    }

    /// Version at `index`
    pub fn version(&self, index: usize) -> Option<&LinkMappingVersion> {
        self.versions.get(index)
    }

    fn check_index(&self, index: usize) -> LinkResult<()> {
        if index >= self.versions.len() {
            return Err(LinkError::VersionOutOfRange {
                index,
                len: self.versions.len(),
            });
        }
        Ok(())
    }

    fn push_active(&mut self, mut version: LinkMappingVersion) -> usize {
        for side in Side::BOTH {
            version.set_image_bounds(side, self.bounds_of(side));
        }
        self.versions.push(version);
        self.active = self.versions.len() - 1;
        self.active
    }

    fn bounds_of(&self, side: Side) -> Option<(u32, u32)> {
        match side {
            Side::Source => self.bounds[0],
            Side::Target => self.bounds[1],
        }
    }

    /// Branch a copy of version `base`, append it and make it active.
    pub fn add_version(&mut self, base: usize) -> LinkResult<usize> {
        self.check_index(base)?;
        let mut copy = self.versions[base].clone();
        let name = format!("{}{COPY_SUFFIX}", copy.name());
        copy.set_name(name);
        let index = self.push_active(copy);
        log::debug!("branched version {base} as {index}");
        Ok(index)
    }

    /// Append an empty version and make it active.
    ///
    /// # Errors
    ///
    /// [`LinkError::InvalidVersionName`] for an empty name or one holding
    /// `]` or a line break.
    pub fn new_version(&mut self, name: &str) -> LinkResult<usize> {
        let name = serial::check_version_name(name)?;
        Ok(self.push_active(LinkMappingVersion::new(name)))
    }

    /// Make version `index` active.
    pub fn switch_version(&mut self, index: usize) -> LinkResult<()> {
        self.check_index(index)?;
        self.active = index;
        log::debug!("switched to version {index}");
        Ok(())
    }

    /// Delete the active version; the previous one becomes active.
    pub fn delete_active_version(&mut self) -> LinkResult<LinkMappingVersion> {
        if self.versions.len() == 1 {
            return Err(LinkError::LastVersion);
        }
        let removed = self.versions.remove(self.active);
        self.active = self.active.saturating_sub(1);
        Ok(removed)
    }

    /// Rename the active version.
    ///
    /// # Errors
    ///
    /// [`LinkError::InvalidVersionName`], as for [`Self::new_version`].
    pub fn rename_active_version(&mut self, name: &str) -> LinkResult<()> {
        let name = serial::check_version_name(name)?;
        self.active_version_mut().set_name(name);
        Ok(())
    }

    /// Record the image dimensions of both sides in every version.
    ///
    /// Point pairs outside the new bounds are removed from their version
    /// and returned as [`LinkError::PointOutOfBounds`].
    pub fn set_image_bounds(&mut self, source: (u32, u32), target: (u32, u32)) -> Vec<LinkError> {
        self.bounds = [Some(source), Some(target)];
        let mut dropped = Vec::new();
        for version in &mut self.versions {
            dropped.extend(version.set_image_bounds(Side::Source, Some(source)));
            dropped.extend(version.set_image_bounds(Side::Target, Some(target)));
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provmap_core::Pixel;

    fn defs(text: &str) -> ProvinceDefinitions {
        ProvinceDefinitions::load_definitions(text).unwrap().0
    }

    fn two_sides() -> (ProvinceDefinitions, ProvinceDefinitions) {
        (
            defs("1;Alpha;1;0;0\n2;Beta;2;0;0\n3;Gamma;3;0;0\n"),
            defs("1;Uno;0;1;0\n2;Dos;0;2;0\n4;Upper Egypt;0;4;0\n"),
        )
    }

    #[test]
    fn test_new_mapper() {
        let mapper = LinkMapper::new();
        assert_eq!(mapper.versions().len(), 1);
        assert_eq!(mapper.active_version().name(), DEFAULT_VERSION_NAME);
    }

    #[test]
    fn test_load_without_header() {
        let (src, tgt) = two_sides();
        let (mapper, report) = LinkMapper::load_mappings("1 = 2\nBeta = \"Upper Egypt\"\n", &src, &tgt);
        assert!(report.is_clean());
        assert_eq!(report.links, 2);
        assert_eq!(mapper.versions().len(), 1);
        let v = mapper.active_version();
        assert_eq!(v.name(), DEFAULT_VERSION_NAME);
        assert_eq!(v.link_for_province(Side::Target, 4).unwrap().source_provinces().len(), 1);
        assert!(v.is_linked(Side::Source, 2));
    }

    #[test]
    fn test_load_skips_bad_rows() {
        let (src, tgt) = two_sides();
        let text = "[version a]\n1 = 1\n9 = 2\n1 = 2\n2 = 2 = 2\n3 = 2\n";
        let (mapper, report) = LinkMapper::load_mappings(text, &src, &tgt);
        assert_eq!(report.links, 2);
        assert_eq!(report.skipped.len(), 3);
        assert!(matches!(
            report.skipped[0],
            LinkError::UnresolvedProvince { line: 3, side: Side::Source, .. }
        ));
        assert!(matches!(
            report.skipped[1],
            LinkError::ProvinceAlreadyLinked { side: Side::Source, id: 1, .. }
        ));
        assert!(matches!(report.skipped[2], LinkError::MalformedRow { line: 5, .. }));
        assert_eq!(mapper.active_version().link_count(), 2);
    }

    #[test]
    fn test_versions_lifecycle() {
        let (src, tgt) = two_sides();
        let (mut mapper, _) =
            LinkMapper::load_mappings("[version base]\n1 = 1\n[version other]\n2 = 2\n", &src, &tgt);
        assert_eq!(mapper.versions().len(), 2);
        assert_eq!(mapper.active_index(), 0);

        let copy = mapper.add_version(0).unwrap();
        assert_eq!(copy, 2);
        assert_eq!(mapper.active_index(), 2);
        assert_eq!(mapper.active_version().name(), "base copy");
        mapper.active_version_mut().add_link([3], []).unwrap();
        assert_eq!(mapper.version(0).unwrap().link_count(), 1);
        assert_eq!(mapper.active_version().link_count(), 2);

        assert!(matches!(
            mapper.switch_version(7),
            Err(LinkError::VersionOutOfRange { index: 7, len: 3 })
        ));
        assert_eq!(mapper.active_index(), 2);

        mapper.rename_active_version("draft").unwrap();
        assert!(mapper.rename_active_version(" ").is_err());
        assert_eq!(mapper.version(2).unwrap().name(), "draft");
        mapper.delete_active_version().unwrap();
        assert_eq!(mapper.active_index(), 1);
        mapper.switch_version(0).unwrap();
        mapper.delete_active_version().unwrap();
        assert_eq!(mapper.active_version().name(), "other");
        assert!(matches!(
            mapper.delete_active_version(),
            Err(LinkError::LastVersion)
        ));
    }

    #[test]
    fn test_image_bounds_reach_new_versions() {
        let mut mapper = LinkMapper::new();
        mapper.set_image_bounds((4, 4), (8, 8));
        mapper.new_version("second").unwrap();
        let v = mapper.active_version_mut();
        assert_eq!(v.image_bounds(Side::Target), Some((8, 8)));
        assert!(v.add_point(Side::Source, Pixel::new(4, 0)).is_err());
        assert!(v.add_point(Side::Target, Pixel::new(4, 0)).is_ok());
    }

    #[test]
    fn test_bounds_drop_stray_points() {
        let (src, tgt) = two_sides();
        let text = "point 999,999 -> 0,0\npoint 1,1 -> 2,2\npoint 3,3 -> 4,9\n";
        let (mut mapper, report) = LinkMapper::load_mappings(text, &src, &tgt);
        assert!(report.is_clean());
        let revision = mapper.active_version().points_revision();

        let dropped = mapper.set_image_bounds((4, 4), (8, 8));
        assert_eq!(dropped.len(), 2);
        assert!(matches!(
            dropped[0],
            LinkError::PointOutOfBounds { side: Side::Source, width: 4, .. }
        ));
        assert!(matches!(
            dropped[1],
            LinkError::PointOutOfBounds { side: Side::Target, height: 8, .. }
        ));
        let v = mapper.active_version();
        assert_eq!(v.points().len(), 1);
        assert_eq!(v.points()[0].source, Some(Pixel::new(1, 1)));
        assert!(v.points_revision() > revision);
        assert!(mapper.set_image_bounds((4, 4), (8, 8)).is_empty());
    }

    #[test]
    fn test_version_names_survive_reload() {
        let (src, tgt) = two_sides();
        let mut mapper = LinkMapper::new();
        mapper.active_version_mut().add_link([1], [1]).unwrap();
        for bad in ["", "  ", "x]", "a\nb"] {
            assert!(matches!(
                mapper.new_version(bad),
                Err(LinkError::InvalidVersionName { .. })
            ));
        }
        assert_eq!(mapper.versions().len(), 1);

        mapper.new_version(" next ").unwrap();
        mapper.active_version_mut().add_link([2], [2]).unwrap();
        let saved = mapper.save_all();
        assert_eq!(saved, "[version 0.0.0]\n1 = 1\n[version next]\n2 = 2\n");
        let (reloaded, report) = LinkMapper::load_mappings(&saved, &src, &tgt);
        assert!(report.is_clean());
        assert_eq!(reloaded.versions().len(), 2);
        assert_eq!(reloaded.version(1).unwrap().name(), "next");
    }

    #[test]
    fn test_save_roundtrip() {
        let (src, tgt) = two_sides();
        let text = "[version 0.0.0]\n1,3 = 1 # coast\n= 4\n2 =\npoint 10,20 -> 30,40\npoint 12,22 -> _\n[version next]\n1 = 2\n";
        let (mapper, report) = LinkMapper::load_mappings(text, &src, &tgt);
        assert!(report.is_clean(), "{:?}", report.skipped);
        assert_eq!(report.points, 2);
        assert_eq!(mapper.save_all(), text);
        assert_eq!(mapper.save_mappings(1).unwrap(), "1 = 2\n");
        assert!(mapper.save_mappings(2).is_err());
    }
}
