//! One snapshot of the link graph and its point correspondences
//!
//! A [`LinkMappingVersion`] owns its links and points outright; cloning it
//! gives an independent branch. Every mutation checks its preconditions
//! before touching any state, so a rejected mutation leaves the version
//! exactly as it was.
//!
//! Two invariants hold after every successful mutation:
//!
//! - a province id is claimed by at most one link per side
//! - no link is empty on both sides

use crate::error::{LinkError, LinkResult};
use crate::link::{Link, LinkId};
use provmap_core::{Pixel, PointPair, Province, ProvinceDefinitions, Side};
use std::collections::{BTreeSet, HashMap};

/// Outcome of [`LinkMappingVersion::toggle_province`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The province joined the link
    Added,
    /// The province left the link
    Removed,
    /// The province was the last one and the link was deleted
    LinkRemoved,
}

#[inline]
fn slot(side: Side) -> usize {
    match side {
        Side::Source => 0,
        Side::Target => 1,
    }
}

/// A named version of the mapping.
#[derive(Debug, Clone)]
pub struct LinkMappingVersion {
    name: String,
    links: Vec<Link>,
    points: Vec<PointPair>,
    /// Province id -> owning link, per side
    claims: [HashMap<u32, LinkId>; 2],
    next_link_id: u32,
    /// Image dimensions per side, when known
    bounds: [Option<(u32, u32)>; 2],
    points_revision: u64,
}

impl LinkMappingVersion {
    /// Create an empty version
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
            points: Vec::new(),
            claims: [HashMap::new(), HashMap::new()],
            next_link_id: 1,
            bounds: [None, None],
            points_revision: 0,
        }
    }

    /// Version name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// All links in insertion order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Look up a link by id
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    fn link_index(&self, id: LinkId) -> LinkResult<usize> {
        self.links
            .iter()
            .position(|l| l.id == id)
            .ok_or(LinkError::LinkNotFound(id))
    }

    /// The link claiming province `id` on `side`, if any
    pub fn link_for_province(&self, side: Side, id: u32) -> Option<&Link> {
        let link_id = self.claims[slot(side)].get(&id)?;
        self.link(*link_id)
    }

    /// Whether province `id` is claimed on `side`
    pub fn is_linked(&self, side: Side, id: u32) -> bool {
        self.claims[slot(side)].contains_key(&id)
    }

    /// Provinces of `defs` that no link claims on `side`, in declaration order
    pub fn unmapped_provinces<'a>(
        &'a self,
        side: Side,
        defs: &'a ProvinceDefinitions,
    ) -> impl Iterator<Item = &'a Province> + 'a {
        defs.iter().filter(move |p| !self.is_linked(side, p.id()))
    }

    fn fresh_id(&mut self) -> LinkId {
        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;
        id
    }

    fn check_unclaimed(&self, side: Side, ids: &BTreeSet<u32>) -> LinkResult<()> {
        for &id in ids {
            if let Some(&link) = self.claims[slot(side)].get(&id) {
                return Err(LinkError::ProvinceAlreadyLinked { side, id, link });
            }
        }
        Ok(())
    }

    fn claim(&mut self, link: &Link) {
        for side in Side::BOTH {
            for &id in link.provinces(side) {
                self.claims[slot(side)].insert(id, link.id);
            }
        }
    }

    fn release(&mut self, link: &Link) {
        for side in Side::BOTH {
            for id in link.provinces(side) {
                self.claims[slot(side)].remove(id);
            }
        }
    }

    /// Create a link between the given provinces.
    ///
    /// # Errors
    ///
    /// [`LinkError::InvariantViolation`] if both sides are empty,
    /// [`LinkError::ProvinceAlreadyLinked`] if any province is already
    /// claimed on its side.
    pub fn add_link(
        &mut self,
        source_ids: impl IntoIterator<Item = u32>,
        target_ids: impl IntoIterator<Item = u32>,
    ) -> LinkResult<LinkId> {
        let source: BTreeSet<u32> = source_ids.into_iter().collect();
        let target: BTreeSet<u32> = target_ids.into_iter().collect();

        if source.is_empty() && target.is_empty() {
            return Err(LinkError::InvariantViolation(
                "a link needs at least one province".to_string(),
            ));
        }
        self.check_unclaimed(Side::Source, &source)?;
        self.check_unclaimed(Side::Target, &target)?;

        let id = self.fresh_id();
        let link = Link::new(id, source, target);
        self.claim(&link);
        log::debug!("{}: added link {}", self.name, id);
        self.links.push(link);
        Ok(id)
    }

    /// Remove a link and release its provinces.
    pub fn remove_link(&mut self, id: LinkId) -> LinkResult<Link> {
        let index = self.link_index(id)?;
        let link = self.links.remove(index);
        self.release(&link);
        log::debug!("{}: removed link {}", self.name, id);
        Ok(link)
    }

    /// Move every province of `b` into `a` and delete `b`.
    ///
    /// Comments are joined with `"; "`. Returns `a`.
    pub fn merge_links(&mut self, a: LinkId, b: LinkId) -> LinkResult<LinkId> {
        if a == b {
            return Err(LinkError::InvariantViolation(format!(
                "cannot merge link {a} with itself"
            )));
        }
        self.link_index(a)?;
        let b_index = self.link_index(b)?;

        let absorbed = self.links.remove(b_index);
        let a_index = self.link_index(a)?;
        let target = &mut self.links[a_index];
        for side in Side::BOTH {
            target
                .provinces_mut(side)
                .extend(absorbed.provinces(side).iter().copied());
        }
        target.comment = match (target.comment.take(), absorbed.comment.clone()) {
            (Some(x), Some(y)) => Some(format!("{x}; {y}")),
            (x, y) => x.or(y),
        };

        for side in Side::BOTH {
            for &id in absorbed.provinces(side) {
                self.claims[slot(side)].insert(id, a);
            }
        }
        log::debug!("{}: merged link {} into {}", self.name, b, a);
        Ok(a)
    }

    /// Split a link in two.
    ///
    /// `keep_source` and `keep_target` stay in `id`; the remaining provinces
    /// move to a fresh link inserted right after it, whose id is returned.
    ///
    /// # Errors
    ///
    /// [`LinkError::InvariantViolation`] if a kept id is not part of the
    /// link, or if either resulting link would have no provinces.
    pub fn split_link(
        &mut self,
        id: LinkId,
        keep_source: impl IntoIterator<Item = u32>,
        keep_target: impl IntoIterator<Item = u32>,
    ) -> LinkResult<LinkId> {
        let index = self.link_index(id)?;
        let keep = [
            keep_source.into_iter().collect::<BTreeSet<u32>>(),
            keep_target.into_iter().collect::<BTreeSet<u32>>(),
        ];

        let link = &self.links[index];
        for side in Side::BOTH {
            if let Some(stray) = keep[slot(side)]
                .iter()
                .find(|p| !link.contains(side, **p))
            {
                return Err(LinkError::InvariantViolation(format!(
                    "{side} province {stray} is not part of link {id}"
                )));
            }
        }

        let rest: [BTreeSet<u32>; 2] = [
            link.source_provinces
                .difference(&keep[0])
                .copied()
                .collect(),
            link.target_provinces
                .difference(&keep[1])
                .copied()
                .collect(),
        ];
        if keep.iter().all(BTreeSet::is_empty) {
            return Err(LinkError::InvariantViolation(format!(
                "split would leave link {id} without provinces"
            )));
        }
        if rest.iter().all(BTreeSet::is_empty) {
            return Err(LinkError::InvariantViolation(format!(
                "split of link {id} would create a link without provinces"
            )));
        }

        let [keep_source, keep_target] = keep;
        let [rest_source, rest_target] = rest;
        let new_id = self.fresh_id();
        let new_link = Link::new(new_id, rest_source, rest_target);

        let link = &mut self.links[index];
        link.source_provinces = keep_source;
        link.target_provinces = keep_target;
        self.claim(&new_link);
        self.links.insert(index + 1, new_link);
        log::debug!("{}: split link {} off {}", self.name, new_id, id);
        Ok(new_id)
    }

    /// Add or remove one province from a link.
    ///
    /// Removing the last province deletes the link.
    ///
    /// # Errors
    ///
    /// [`LinkError::ProvinceAlreadyLinked`] if another link owns the province.
    pub fn toggle_province(&mut self, link: LinkId, side: Side, id: u32) -> LinkResult<Toggle> {
        let index = self.link_index(link)?;
        let owner = self.claims[slot(side)].get(&id).copied();
        match owner {
            Some(owner) if owner != link => {
                Err(LinkError::ProvinceAlreadyLinked {
                    side,
                    id,
                    link: owner,
                })
            }
            Some(_) => {
                if self.links[index].province_count() == 1 {
                    self.remove_link(link)?;
                    return Ok(Toggle::LinkRemoved);
                }
                self.links[index].provinces_mut(side).remove(&id);
                self.claims[slot(side)].remove(&id);
                Ok(Toggle::Removed)
            }
            None => {
                self.links[index].provinces_mut(side).insert(id);
                self.claims[slot(side)].insert(id, link);
                Ok(Toggle::Added)
            }
        }
    }

    /// Replace a link's comment. An empty comment clears it.
    ///
    /// Line breaks become spaces so the comment stays on its row.
    pub fn set_comment(&mut self, link: LinkId, comment: Option<String>) -> LinkResult<()> {
        let index = self.link_index(link)?;
        self.links[index].comment = comment
            .map(|c| c.replace(['\r', '\n'], " ").trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(())
    }

    /// Re-derive the claim index and compare it with the stored one.
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> LinkResult<()> {
        let mut seen: [HashMap<u32, LinkId>; 2] = [HashMap::new(), HashMap::new()];
        for link in &self.links {
            if link.is_empty() {
                return Err(LinkError::InvariantViolation(format!(
                    "link {} has no provinces",
                    link.id
                )));
            }
            for side in Side::BOTH {
                for &id in link.provinces(side) {
                    if let Some(&other) = seen[slot(side)].get(&id) {
                        return Err(LinkError::InvariantViolation(format!(
                            "{side} province {id} is in links {other} and {}",
                            link.id
                        )));
                    }
                    seen[slot(side)].insert(id, link.id);
                }
            }
        }
        if seen != self.claims {
            return Err(LinkError::InvariantViolation(
                "claim index out of sync with links".to_string(),
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Points
    // ------------------------------------------------------------------

    /// Image dimensions for `side`, when known
    pub fn image_bounds(&self, side: Side) -> Option<(u32, u32)> {
        self.bounds[slot(side)]
    }

    /// Set or clear the image dimensions used to validate points on `side`.
    ///
    /// Pairs whose `side` point falls outside the new bounds are removed
    /// and returned as [`LinkError::PointOutOfBounds`].
    pub fn set_image_bounds(&mut self, side: Side, bounds: Option<(u32, u32)>) -> Vec<LinkError> {
        self.bounds[slot(side)] = bounds;
        let mut dropped = Vec::new();
        for pair in std::mem::take(&mut self.points) {
            match pair.get(side).map(|p| self.check_point(side, p)) {
                Some(Err(e)) => dropped.push(e),
                _ => self.points.push(pair),
            }
        }
        if !dropped.is_empty() {
            log::warn!(
                "{}: dropped {} point pairs outside the {side} image",
                self.name,
                dropped.len()
            );
            self.touch_points();
        }
        dropped
    }

    fn check_point(&self, side: Side, pixel: Pixel) -> LinkResult<()> {
        match self.bounds[slot(side)] {
            Some((width, height)) if pixel.x >= width || pixel.y >= height => {
                Err(LinkError::PointOutOfBounds {
                    side,
                    pixel,
                    width,
                    height,
                })
            }
            _ => Ok(()),
        }
    }

    fn check_index(&self, index: usize) -> LinkResult<()> {
        if index >= self.points.len() {
            return Err(LinkError::PointIndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(())
    }

    fn touch_points(&mut self) {
        self.points_revision += 1;
    }

    /// All point pairs in placement order
    pub fn points(&self) -> &[PointPair] {
        &self.points
    }

    /// Pairs with both sides placed, as `(index, source, target)`
    pub fn complete_pairs(&self) -> impl Iterator<Item = (usize, Pixel, Pixel)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_complete().map(|(s, t)| (i, s, t)))
    }

    /// Counter bumped by every point mutation
    pub fn points_revision(&self) -> u64 {
        self.points_revision
    }

    /// Place one side of a point.
    ///
    /// Completes the last pair when it lacks `side`, otherwise starts a
    /// new half pair. Returns the pair's index.
    pub fn add_point(&mut self, side: Side, pixel: Pixel) -> LinkResult<usize> {
        self.check_point(side, pixel)?;
        let index = match self.points.last_mut() {
            Some(last) if last.get(side).is_none() => {
                last.set(side, Some(pixel));
                self.points.len() - 1
            }
            _ => {
                self.points.push(PointPair::half(side, pixel));
                self.points.len() - 1
            }
        };
        self.touch_points();
        log::debug!("{}: {side} point {pixel} at index {index}", self.name);
        Ok(index)
    }

    /// Append a pair with either side optional.
    pub fn add_point_pair(
        &mut self,
        source: Option<Pixel>,
        target: Option<Pixel>,
    ) -> LinkResult<usize> {
        if source.is_none() && target.is_none() {
            return Err(LinkError::InvariantViolation(
                "a point pair needs at least one side".to_string(),
            ));
        }
        if let Some(p) = source {
            self.check_point(Side::Source, p)?;
        }
        if let Some(p) = target {
            self.check_point(Side::Target, p)?;
        }
        self.points.push(PointPair::new(source, target));
        self.touch_points();
        Ok(self.points.len() - 1)
    }

    /// Move one side of an existing pair.
    pub fn move_point(&mut self, index: usize, side: Side, pixel: Pixel) -> LinkResult<()> {
        self.check_index(index)?;
        self.check_point(side, pixel)?;
        self.points[index].set(side, Some(pixel));
        self.touch_points();
        Ok(())
    }

    /// Remove a pair; later indices shift down by one.
    pub fn remove_point(&mut self, index: usize) -> LinkResult<PointPair> {
        self.check_index(index)?;
        let pair = self.points.remove(index);
        self.touch_points();
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(set: &BTreeSet<u32>) -> Vec<u32> {
        set.iter().copied().collect()
    }

    #[test]
    fn test_add_link_claims() {
        let mut v = LinkMappingVersion::new("test");
        let a = v.add_link([1, 2], [5]).unwrap();
        assert!(v.is_linked(Side::Source, 1));
        assert!(!v.is_linked(Side::Target, 1));
        assert_eq!(v.link_for_province(Side::Target, 5).unwrap().id(), a);

        let err = v.add_link([2], [6]).unwrap_err();
        assert!(matches!(
            err,
            LinkError::ProvinceAlreadyLinked {
                side: Side::Source,
                id: 2,
                ..
            }
        ));
        // rejected mutation leaves no trace
        assert!(!v.is_linked(Side::Target, 6));
        assert_eq!(v.link_count(), 1);
        v.validate().unwrap();
    }

    #[test]
    fn test_add_empty_link_rejected() {
        let mut v = LinkMappingVersion::new("test");
        let err = v.add_link([], []).unwrap_err();
        assert!(matches!(err, LinkError::InvariantViolation(_)));
        assert!(v.add_link([], [3]).is_ok());
    }

    #[test]
    fn test_remove_link() {
        let mut v = LinkMappingVersion::new("test");
        let a = v.add_link([1], [2]).unwrap();
        let removed = v.remove_link(a).unwrap();
        assert_eq!(ids(removed.source_provinces()), vec![1]);
        assert!(!v.is_linked(Side::Source, 1));
        assert!(matches!(v.remove_link(a), Err(LinkError::LinkNotFound(_))));
    }

    #[test]
    fn test_merge_links() {
        let mut v = LinkMappingVersion::new("test");
        let a = v.add_link([1], [10]).unwrap();
        let b = v.add_link([2, 3], []).unwrap();
        v.set_comment(a, Some("north".into())).unwrap();
        v.set_comment(b, Some("south".into())).unwrap();

        assert_eq!(v.merge_links(a, b).unwrap(), a);
        let link = v.link(a).unwrap();
        assert_eq!(ids(link.source_provinces()), vec![1, 2, 3]);
        assert_eq!(link.comment(), Some("north; south"));
        assert!(v.link(b).is_none());
        assert_eq!(v.link_for_province(Side::Source, 3).unwrap().id(), a);
        assert!(v.merge_links(a, a).is_err());
        v.validate().unwrap();
    }

    #[test]
    fn test_split_link() {
        let mut v = LinkMappingVersion::new("test");
        let a = v.add_link([1, 2, 3], [7, 8]).unwrap();
        let b = v.split_link(a, [1], [7]).unwrap();

        assert_eq!(ids(v.link(a).unwrap().source_provinces()), vec![1]);
        assert_eq!(ids(v.link(b).unwrap().source_provinces()), vec![2, 3]);
        assert_eq!(ids(v.link(b).unwrap().target_provinces()), vec![8]);
        assert_eq!(v.links()[1].id(), b);
        assert_eq!(v.link_for_province(Side::Target, 8).unwrap().id(), b);
        v.validate().unwrap();
    }

    #[test]
    fn test_split_link_rejections() {
        let mut v = LinkMappingVersion::new("test");
        let a = v.add_link([1, 2], [7]).unwrap();
        let _other = v.add_link([5], []).unwrap();

        // kept id belongs to another link
        assert!(matches!(
            v.split_link(a, [5], []),
            Err(LinkError::InvariantViolation(_))
        ));
        // nothing kept
        assert!(v.split_link(a, [], []).is_err());
        // nothing moved
        assert!(v.split_link(a, [1, 2], [7]).is_err());
        // one side empty is fine
        assert!(v.split_link(a, [1, 2], []).is_ok());
        v.validate().unwrap();
    }

    #[test]
    fn test_toggle_province() {
        let mut v = LinkMappingVersion::new("test");
        let a = v.add_link([1], []).unwrap();
        let b = v.add_link([2], []).unwrap();

        assert_eq!(v.toggle_province(a, Side::Target, 9).unwrap(), Toggle::Added);
        assert!(matches!(
            v.toggle_province(a, Side::Source, 2),
            Err(LinkError::ProvinceAlreadyLinked { link, .. }) if link == b
        ));
        assert_eq!(v.toggle_province(a, Side::Source, 1).unwrap(), Toggle::Removed);
        assert_eq!(
            v.toggle_province(a, Side::Target, 9).unwrap(),
            Toggle::LinkRemoved
        );
        assert!(v.link(a).is_none());
        v.validate().unwrap();
    }

    #[test]
    fn test_set_comment_blank_clears() {
        let mut v = LinkMappingVersion::new("test");
        let a = v.add_link([1], []).unwrap();
        v.set_comment(a, Some("  hill  ".into())).unwrap();
        assert_eq!(v.link(a).unwrap().comment(), Some("hill"));
        v.set_comment(a, Some("   ".into())).unwrap();
        assert_eq!(v.link(a).unwrap().comment(), None);
    }

    #[test]
    fn test_add_point_completes_half_pair() {
        let mut v = LinkMappingVersion::new("test");
        assert_eq!(v.add_point(Side::Source, Pixel::new(1, 1)).unwrap(), 0);
        assert_eq!(v.add_point(Side::Target, Pixel::new(2, 2)).unwrap(), 0);
        assert!(v.points()[0].is_complete());
        assert_eq!(v.add_point(Side::Target, Pixel::new(3, 3)).unwrap(), 1);
        assert_eq!(v.add_point(Side::Target, Pixel::new(4, 4)).unwrap(), 2);
        assert_eq!(v.add_point(Side::Source, Pixel::new(5, 5)).unwrap(), 2);
        assert_eq!(v.complete_pairs().count(), 2);
        assert_eq!(v.points_revision(), 5);
    }

    #[test]
    fn test_point_bounds_and_indices() {
        let mut v = LinkMappingVersion::new("test");
        v.set_image_bounds(Side::Source, Some((10, 10)));
        assert!(matches!(
            v.add_point(Side::Source, Pixel::new(10, 0)),
            Err(LinkError::PointOutOfBounds { .. })
        ));
        // target bounds unknown
        assert!(v.add_point(Side::Target, Pixel::new(500, 500)).is_ok());
        assert_eq!(v.points_revision(), 1);

        assert!(matches!(
            v.move_point(3, Side::Source, Pixel::new(0, 0)),
            Err(LinkError::PointIndexOutOfRange { index: 3, len: 1 })
        ));
        v.move_point(0, Side::Source, Pixel::new(9, 9)).unwrap();
        assert_eq!(v.points()[0].source, Some(Pixel::new(9, 9)));

        let removed = v.remove_point(0).unwrap();
        assert!(removed.is_complete());
        assert!(v.points().is_empty());
        assert!(v.remove_point(0).is_err());
        assert!(v.add_point_pair(None, None).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut v = LinkMappingVersion::new("base");
        let a = v.add_link([1], [1]).unwrap();
        let mut copy = v.clone();
        copy.remove_link(a).unwrap();
        copy.add_point(Side::Source, Pixel::new(0, 0)).unwrap();
        assert_eq!(v.link_count(), 1);
        assert!(v.points().is_empty());
        assert!(v.is_linked(Side::Source, 1));
    }
}
