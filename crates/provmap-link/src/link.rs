//! Links between source and target provinces

use provmap_core::Side;
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a link, unique within one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A many-to-many association of source provinces with target provinces.
///
/// Ids are kept sorted so that saved tables are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub(crate) id: LinkId,
    pub(crate) source_provinces: BTreeSet<u32>,
    pub(crate) target_provinces: BTreeSet<u32>,
    pub(crate) comment: Option<String>,
}

impl Link {
    pub(crate) fn new(id: LinkId, source: BTreeSet<u32>, target: BTreeSet<u32>) -> Self {
        Self {
            id,
            source_provinces: source,
            target_provinces: target,
            comment: None,
        }
    }

    /// Link id
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Source province ids
    pub fn source_provinces(&self) -> &BTreeSet<u32> {
        &self.source_provinces
    }

    /// Target province ids
    pub fn target_provinces(&self) -> &BTreeSet<u32> {
        &self.target_provinces
    }

    /// Province ids on one side
    pub fn provinces(&self, side: Side) -> &BTreeSet<u32> {
        match side {
            Side::Source => &self.source_provinces,
            Side::Target => &self.target_provinces,
        }
    }

    pub(crate) fn provinces_mut(&mut self, side: Side) -> &mut BTreeSet<u32> {
        match side {
            Side::Source => &mut self.source_provinces,
            Side::Target => &mut self.target_provinces,
        }
    }

    /// Whether the link holds province `id` on `side`.
    pub fn contains(&self, side: Side, id: u32) -> bool {
        self.provinces(side).contains(&id)
    }

    /// Total number of provinces on both sides
    pub fn province_count(&self) -> usize {
        self.source_provinces.len() + self.target_provinces.len()
    }

    /// No province on either side. Never true for a link stored in a version.
    pub fn is_empty(&self) -> bool {
        self.source_provinces.is_empty() && self.target_provinces.is_empty()
    }

    /// Free-form comment
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_accessors() {
        let link = Link::new(
            LinkId(3),
            BTreeSet::from([4, 1]),
            BTreeSet::from([9]),
        );
        assert_eq!(link.id(), LinkId(3));
        assert!(link.contains(Side::Source, 1));
        assert!(!link.contains(Side::Target, 1));
        assert_eq!(link.province_count(), 3);
        assert_eq!(
            link.source_provinces().iter().copied().collect::<Vec<_>>(),
            vec![1, 4]
        );
        assert!(!link.is_empty());
        assert_eq!(link.comment(), None);
        assert_eq!(LinkId(3).to_string(), "#3");
    }
}
