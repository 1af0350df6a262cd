//! provmap-link - Province link graph
//!
//! This crate holds the mapping between the provinces of a source map and
//! those of a target map:
//!
//! - [`Link`] - A many-to-many group of source and target provinces
//! - [`LinkMappingVersion`] - One named snapshot of links and point pairs
//! - [`LinkMapper`] - The ordered versions with one active version
//! - [`serial`] - The line-oriented mapping table format
//!
//! # Example
//!
//! ```
//! use provmap_core::{ProvinceDefinitions, Side};
//! use provmap_link::LinkMapper;
//!
//! let (src, _) = ProvinceDefinitions::load_definitions("1;Red;255;0;0\n").unwrap();
//! let (tgt, _) = ProvinceDefinitions::load_definitions("2;Blue;0;0;255\n").unwrap();
//!
//! let (mut mapper, report) = LinkMapper::load_mappings("1 = 2\n", &src, &tgt);
//! assert!(report.is_clean());
//!
//! let version = mapper.active_version_mut();
//! let link = version.link_for_province(Side::Source, 1).unwrap().id();
//! version.remove_link(link).unwrap();
//! assert_eq!(version.link_count(), 0);
//! ```

mod error;
pub mod link;
pub mod mapper;
pub mod serial;
pub mod version;

pub use error::{LinkError, LinkResult};
pub use link::{Link, LinkId};
pub use mapper::LinkMapper;
pub use serial::{DEFAULT_VERSION_NAME, MappingReport, format_link, format_point};
pub use version::{LinkMappingVersion, Toggle};
