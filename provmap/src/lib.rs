//! provmap - Province mapper
//!
//! Links provinces of a source map to provinces of a target map. Each map
//! is a definition table (id, name, color) plus a bitmap where every pixel
//! carries its province color. Point pairs placed on both maps drive a
//! triangulation that maps positions from one map onto the other.
//!
//! # Overview
//!
//! - Province tables, pixel classification and core types (re-exported)
//! - [`io`] - BMP/PNG province bitmaps
//! - [`link`] - Links, mapping versions and the mapping table format
//! - [`triangulate`] - Point-pair meshes and interpolation
//! - [`Configuration`] / [`Project`] - A headless session over two maps
//!
//! # Example
//!
//! ```
//! use provmap::link::LinkMapper;
//! use provmap::ProvinceDefinitions;
//!
//! let (source, _) = ProvinceDefinitions::load_definitions("1;Old;10;0;0\n").unwrap();
//! let (target, _) = ProvinceDefinitions::load_definitions("2;New;20;0;0\n").unwrap();
//! let (mapper, report) = LinkMapper::load_mappings("1 = 2\n", &source, &target);
//! assert!(report.is_clean());
//! assert_eq!(mapper.active_version().link_count(), 1);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use provmap_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use provmap_io as io;
pub use provmap_link as link;
pub use provmap_triangulate as triangulate;

mod config;
mod project;
mod project_error;

pub use config::Configuration;
pub use project_error::{ProjectError, ProjectResult};
pub use project::{LoadReport, MapSide, PlacedPoint, Project};
