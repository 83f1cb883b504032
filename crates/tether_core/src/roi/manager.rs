//! The working region set.

use crate::models::Region;

use super::archive::{ArchiveError, RegionArchive};

/// Ordered, indexable, dynamically growable set of live regions.
///
/// Grows with selection/detection counts; there is no fixed capacity.
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from an ordered region list.
    pub fn from_regions(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Append one region, returning its index.
    pub fn add(&mut self, region: Region) -> usize {
        self.regions.push(region);
        self.regions.len() - 1
    }

    /// Replace the whole working set (detection replaces prior contents).
    pub fn replace_all(&mut self, regions: Vec<Region>) {
        self.regions = regions;
    }

    /// Remove all regions.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Reset the working set from a persisted archive.
    pub fn reload_from(&mut self, archive: &RegionArchive) -> Result<(), ArchiveError> {
        self.regions = archive.load()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rect;
    use tempfile::tempdir;

    fn rect_region(x: u32, y: u32) -> Region {
        Region::from_rect(Rect::new(x, y, 2, 2)).unwrap()
    }

    #[test]
    fn add_returns_index_and_grows() {
        let mut set = RegionSet::new();
        assert_eq!(set.add(rect_region(0, 0)), 0);
        assert_eq!(set.add(rect_region(4, 4)), 1);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().bounds().x, 4);
        assert!(set.get(2).is_none());
    }

    #[test]
    fn replace_all_swaps_contents() {
        let mut set = RegionSet::from_regions(vec![rect_region(0, 0), rect_region(4, 4)]);
        set.replace_all(vec![rect_region(8, 8)]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().bounds().x, 8);
    }

    #[test]
    fn reload_restores_archived_set_exactly() {
        let dir = tempdir().unwrap();
        let archive = RegionArchive::new(dir.path().join("RoiSet.json"));

        let nuclei = vec![rect_region(0, 0), rect_region(10, 10), rect_region(20, 5)];
        archive.save(&nuclei).unwrap();

        let mut set = RegionSet::from_regions(nuclei.clone());

        // Simulate a detection pass trashing the working set.
        set.replace_all(vec![rect_region(2, 2)]);
        set.clear();

        set.reload_from(&archive).unwrap();
        assert_eq!(set.regions(), nuclei.as_slice());
    }
}
