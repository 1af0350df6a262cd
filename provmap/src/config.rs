//! Project configuration
//!
//! Stored as JSON. Missing fields take their defaults, so a config file
//! only needs the directories:
//!
//! ```json
//! { "source_dir": "mods/old/map", "target_dir": "mods/new/map" }
//! ```

use crate::project_error::ProjectResult;
use provmap_core::Side;
use provmap_triangulate::DEFAULT_SANITY_EPSILON;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the two maps live and how the session treats them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Directory holding the source map files
    pub source_dir: PathBuf,
    /// Directory holding the target map files
    pub target_dir: PathBuf,
    /// Definition table file name inside each map directory
    pub definitions_file: String,
    /// Province bitmap file name inside each map directory
    pub provinces_image: String,
    /// Mapping table path
    pub mapping_file: PathBuf,
    /// Minimum anchor triangle area for a sane mesh
    pub sanity_epsilon: f64,
    /// Treat pixels matching no province as a load error
    pub strict_orphans: bool,
    /// Complete a newly placed point on the other map by interpolation
    pub triangulate: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("source"),
            target_dir: PathBuf::from("target"),
            definitions_file: "definition.csv".to_string(),
            provinces_image: "provinces.bmp".to_string(),
            mapping_file: PathBuf::from("province_mappings.txt"),
            sanity_epsilon: DEFAULT_SANITY_EPSILON,
            strict_orphans: false,
            triangulate: false,
        }
    }
}

impl Configuration {
    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let data = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Read a configuration file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("using default configuration, {}: {e}", path.display());
            Self::default()
        })
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> ProjectResult<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), serialized)?;
        Ok(())
    }

    /// Map directory of `side`
    pub fn map_dir(&self, side: Side) -> &Path {
        match side {
            Side::Source => &self.source_dir,
            Side::Target => &self.target_dir,
        }
    }

    /// Definition table path of `side`
    pub fn definitions_path(&self, side: Side) -> PathBuf {
        self.map_dir(side).join(&self.definitions_file)
    }

    /// Province bitmap path of `side`
    pub fn image_path(&self, side: Side) -> PathBuf {
        self.map_dir(side).join(&self.provinces_image)
    }
}
