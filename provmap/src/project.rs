//! Headless mapping session
//!
//! A [`Project`] owns both map sides (definitions plus province bitmap),
//! the versioned link mapper and the mesh cache. It is what a shell drives:
//! look up provinces under the cursor, place points, ask for the mesh.

use crate::config::Configuration;
use crate::project_error::{ProjectError, ProjectResult};
use provmap_core::{
    ClassificationReport, DefinitionReport, Pixel, Province, ProvinceDefinitions, RgbImage, Side,
};
use provmap_link::{LinkError, LinkMapper, LinkMappingVersion, MappingReport};
use provmap_triangulate::{MeshCache, Point, TriangleMesh, Triangulator};

/// One map: its province table and the bitmap registered into it.
#[derive(Debug)]
pub struct MapSide {
    definitions: ProvinceDefinitions,
    image: RgbImage,
}

impl MapSide {
    /// Register `image` into `definitions`.
    pub fn new(
        mut definitions: ProvinceDefinitions,
        image: RgbImage,
    ) -> (Self, ClassificationReport) {
        let report = definitions.register_image(&image);
        (Self { definitions, image }, report)
    }

    /// Province table
    pub fn definitions(&self) -> &ProvinceDefinitions {
        &self.definitions
    }

    /// Province bitmap
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

/// Everything non-fatal that happened while loading a project.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Definition rows skipped, per side
    pub definitions: [DefinitionReport; 2],
    /// Pixel classification summary, per side
    pub classification: [ClassificationReport; 2],
    /// Mapping rows skipped; `None` when no mapping file existed
    pub mapping: Option<MappingReport>,
    /// Point pairs removed for lying outside their image, as
    /// [`LinkError::PointOutOfBounds`]
    pub dropped_points: Vec<LinkError>,
}

impl LoadReport {
    /// Nothing was skipped and every pixel found its province.
    pub fn is_clean(&self) -> bool {
        self.definitions.iter().all(DefinitionReport::is_clean)
            && self.classification.iter().all(ClassificationReport::is_clean)
            && self.mapping.as_ref().is_none_or(MappingReport::is_clean)
            && self.dropped_points.is_empty()
    }
}

/// Result of [`Project::place_point`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPoint {
    /// Index of the pair the point went into
    pub index: usize,
    /// Counterpart filled in by interpolation, if any
    pub completed: Option<Pixel>,
}

/// A loaded source/target pair of maps with their link mapper.
#[derive(Debug)]
pub struct Project {
    config: Configuration,
    sides: [MapSide; 2],
    mapper: LinkMapper,
    triangulator: Triangulator,
    cache: MeshCache,
    report: LoadReport,
}

fn slot(side: Side) -> usize {
    match side {
        Side::Source => 0,
        Side::Target => 1,
    }
}

fn load_side(
    config: &Configuration,
    side: Side,
) -> ProjectResult<(MapSide, DefinitionReport, ClassificationReport)> {
    let path = config.definitions_path(side);
    let (defs, def_report) = ProvinceDefinitions::load_definitions_file(&path)?;
    if defs.is_empty() {
        return Err(ProjectError::NoProvinces { side, path });
    }
    let image = provmap_io::read_image(config.image_path(side))?;
    let (map, class_report) = MapSide::new(defs, image);
    if config.strict_orphans {
        class_report.check_orphans()?;
    }
    log::info!(
        "{side} map: {} provinces, {}x{} pixels",
        map.definitions.len(),
        map.image.width(),
        map.image.height()
    );
    Ok((map, def_report, class_report))
}

impl Project {
    /// Load definitions, bitmaps and (if present) the mapping table named
    /// by `config`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable files, with [`ProjectError::NoProvinces`] on a
    /// definition table with no usable row, and on orphan pixels when
    /// `strict_orphans` is set. A missing mapping file starts an empty
    /// mapper. Point pairs outside either image are dropped into
    /// [`LoadReport::dropped_points`].
    pub fn load(config: &Configuration) -> ProjectResult<Self> {
        let (source, source_defs, source_class) = load_side(config, Side::Source)?;
        let (target, target_defs, target_class) = load_side(config, Side::Target)?;

        let (mapper, mapping) = if config.mapping_file.exists() {
            let (mapper, report) = LinkMapper::load_mappings_file(
                &config.mapping_file,
                &source.definitions,
                &target.definitions,
            )?;
            (mapper, Some(report))
        } else {
            log::info!(
                "no mapping file at {}, starting empty",
                config.mapping_file.display()
            );
            (LinkMapper::new(), None)
        };

        let mut project = Self::from_parts(config.clone(), source, target, mapper);
        project.report.definitions = [source_defs, target_defs];
        project.report.classification = [source_class, target_class];
        project.report.mapping = mapping;
        Ok(project)
    }

    /// Assemble a project from already loaded parts.
    ///
    /// The mapper takes both image sizes as point bounds; pairs outside
    /// them land in the report's `dropped_points`.
    pub fn from_parts(
        config: Configuration,
        source: MapSide,
        target: MapSide,
        mut mapper: LinkMapper,
    ) -> Self {
        let dropped_points =
            mapper.set_image_bounds(source.image.dimensions(), target.image.dimensions());
        let triangulator = Triangulator::new(config.sanity_epsilon);
        Self {
            config,
            sides: [source, target],
            mapper,
            triangulator,
            cache: MeshCache::new(),
            report: LoadReport {
                dropped_points,
                ..LoadReport::default()
            },
        }
    }

    /// Configuration the project was loaded with
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Toggle interpolation-assisted point placement.
    pub fn set_triangulate(&mut self, enabled: bool) {
        self.config.triangulate = enabled;
    }

    /// Non-fatal load findings
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// One map side
    pub fn side(&self, side: Side) -> &MapSide {
        &self.sides[slot(side)]
    }

    /// Province table of `side`
    pub fn definitions(&self, side: Side) -> &ProvinceDefinitions {
        &self.sides[slot(side)].definitions
    }

    /// The link mapper
    pub fn mapper(&self) -> &LinkMapper {
        &self.mapper
    }

    /// The active mapping version
    pub fn active_version(&self) -> &LinkMappingVersion {
        self.mapper.active_version()
    }

    /// The active mapping version, for link and point edits
    pub fn active_version_mut(&mut self) -> &mut LinkMappingVersion {
        self.mapper.active_version_mut()
    }

    /// The triangulator used for meshes and completion
    pub fn triangulator(&self) -> &Triangulator {
        &self.triangulator
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Activate another version.
    pub fn switch_version(&mut self, index: usize) -> ProjectResult<()> {
        self.mapper.switch_version(index)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Branch a copy of version `base` and activate it.
    pub fn add_version(&mut self, base: usize) -> ProjectResult<usize> {
        let index = self.mapper.add_version(base)?;
        self.cache.invalidate();
        Ok(index)
    }

    /// Delete the active version.
    pub fn delete_active_version(&mut self) -> ProjectResult<LinkMappingVersion> {
        let removed = self.mapper.delete_active_version()?;
        self.cache.invalidate();
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Province under `pixel` on `side`.
    pub fn province_at(&self, side: Side, pixel: Pixel) -> Option<&Province> {
        let map = &self.sides[slot(side)];
        map.definitions.province_at(&map.image, pixel)
    }

    /// Provinces on `side` that the active version leaves unlinked
    pub fn unmapped_provinces(&self, side: Side) -> impl Iterator<Item = &Province> + '_ {
        self.mapper
            .active_version()
            .unmapped_provinces(side, &self.sides[slot(side)].definitions)
    }

    /// Mesh over the active version's complete pairs, anchored on `anchor`.
    pub fn mesh(&mut self, anchor: Side) -> ProjectResult<&TriangleMesh> {
        let version = self.mapper.active_version();
        let mesh = self.cache.mesh(
            &self.triangulator,
            version.points(),
            version.points_revision(),
            anchor,
        )?;
        Ok(mesh)
    }

    /// Whether a mesh can be built on `anchor` and none of its triangles
    /// is degenerate.
    pub fn triangulation_sane(&mut self, anchor: Side) -> bool {
        let version = self.mapper.active_version();
        match self.cache.mesh(
            &self.triangulator,
            version.points(),
            version.points_revision(),
            anchor,
        ) {
            Ok(mesh) => self.triangulator.is_sane(mesh),
            Err(_) => false,
        }
    }

    /// Map `pixel` on `side` onto the other side through the mesh.
    pub fn interpolate(&mut self, side: Side, pixel: Pixel) -> ProjectResult<Pixel> {
        let version = self.mapper.active_version();
        let mesh = self.cache.mesh(
            &self.triangulator,
            version.points(),
            version.points_revision(),
            side,
        )?;
        Ok(self.triangulator.interpolate(mesh, Point::from(pixel))?.to_pixel())
    }

    /// Counterpart guess for a new point, when the mesh allows one and it
    /// lands on the other image.
    fn guess_counterpart(&mut self, side: Side, pixel: Pixel) -> Option<Pixel> {
        let version = self.mapper.active_version();
        let mesh = self
            .cache
            .mesh(
                &self.triangulator,
                version.points(),
                version.points_revision(),
                side,
            )
            .ok()?;
        if !self.triangulator.is_sane(mesh) {
            log::debug!("{side} mesh is not sane, no completion");
            return None;
        }
        let guess = self
            .triangulator
            .interpolate_or_nearest(mesh, Point::from(pixel))?;
        if guess.x < 0.0 || guess.y < 0.0 {
            return None;
        }
        let guess = guess.to_pixel();
        self.sides[slot(side.opposite())]
            .image
            .contains(guess)
            .then_some(guess)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Place a point on `side`.
    ///
    /// With triangulation enabled, a point that starts a new pair gets its
    /// counterpart interpolated from the existing pairs.
    pub fn place_point(&mut self, side: Side, pixel: Pixel) -> ProjectResult<PlacedPoint> {
        let starts_pair = self
            .mapper
            .active_version()
            .points()
            .last()
            .is_none_or(|last| last.get(side).is_some());
        let guess = if self.config.triangulate && starts_pair {
            self.guess_counterpart(side, pixel)
        } else {
            None
        };

        let version = self.mapper.active_version_mut();
        let index = version.add_point(side, pixel)?;
        if let Some(counterpart) = guess {
            version.add_point(side.opposite(), counterpart)?;
            log::debug!("completed point {index} with {counterpart}");
        }
        Ok(PlacedPoint {
            index,
            completed: guess,
        })
    }

    /// Write every version to the configured mapping file.
    pub fn save_mappings(&self) -> ProjectResult<()> {
        self.mapper.save_mappings_file(&self.config.mapping_file)?;
        log::info!("saved mappings to {}", self.config.mapping_file.display());
        Ok(())
    }
}
