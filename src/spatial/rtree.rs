//! R-tree over laid-out taxon positions using the rstar crate.
//!
//! Provides O(log n) lookups for:
//! - Nearest taxon to a pointer position
//! - Nearest taxon within a hit radius
//! - Taxa inside a selection rectangle

use std::collections::BTreeMap;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::Locations;
use crate::tree::TaxonId;

/// A taxon's anchor point.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonPoint {
    pub taxon_id: TaxonId,
    pub x: f64,
    pub y: f64,
}

impl RTreeObject for TaxonPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for TaxonPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over the taxa of one layout.
///
/// Locations are keyed by both name and id; each taxon is indexed once.
#[derive(Debug, Default)]
pub struct LocationIndex {
    tree: RTree<TaxonPoint>,
}

impl LocationIndex {
    /// Bulk load from a layout's location map.
    pub fn from_locations(locations: &Locations) -> Self {
        let unique: BTreeMap<&TaxonId, (f64, f64)> = locations
            .values()
            .map(|loc| (&loc.taxon_id, (loc.x, loc.y)))
            .collect();
        let points = unique
            .into_iter()
            .map(|(taxon_id, (x, y))| TaxonPoint {
                taxon_id: taxon_id.clone(),
                x,
                y,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    pub fn nearest(&self, x: f64, y: f64) -> Option<&TaxonId> {
        self.tree.nearest_neighbor(&[x, y]).map(|p| &p.taxon_id)
    }

    pub fn nearest_within(&self, x: f64, y: f64, max_distance: f64) -> Option<&TaxonId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|p| p.distance_2(&[x, y]) <= max_distance_sq)
            .map(|p| &p.taxon_id)
    }

    /// Taxa inside the rectangle, sorted by id.
    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<&TaxonId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut found: Vec<&TaxonId> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|p| &p.taxon_id)
            .collect();
        found.sort();
        found
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Location;

    fn locations(points: &[(&str, &str, f64, f64)]) -> Locations {
        let mut map = Locations::new();
        for &(id, name, x, y) in points {
            let location = Location {
                taxon_id: TaxonId::from(id),
                scientific_name: name.to_string(),
                x,
                y,
            };
            map.insert(name.to_lowercase(), location.clone());
            map.insert(id.to_string(), location);
        }
        map
    }

    fn sample() -> LocationIndex {
        LocationIndex::from_locations(&locations(&[
            ("1", "Alpha", 0.0, 0.0),
            ("2", "Beta", 5.0, 5.0),
            ("3", "Gamma", 10.0, 10.0),
        ]))
    }

    #[test]
    fn test_each_taxon_indexed_once() {
        let index = sample();
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert!(LocationIndex::default().is_empty());
    }

    #[test]
    fn test_nearest() {
        let index = sample();
        assert_eq!(index.nearest(0.0, 0.0).map(TaxonId::as_str), Some("1"));
        assert_eq!(index.nearest(6.0, 6.0).map(TaxonId::as_str), Some("2"));
        assert_eq!(index.nearest(11.0, 11.0).map(TaxonId::as_str), Some("3"));
    }

    #[test]
    fn test_nearest_within() {
        let index = sample();
        assert_eq!(index.nearest_within(1.0, 0.0, 2.0).map(TaxonId::as_str), Some("1"));
        assert_eq!(index.nearest_within(2.5, 2.5, 1.0), None);
    }

    #[test]
    fn test_in_rect() {
        let index = sample();
        let found: Vec<&str> = index
            .in_rect(-1.0, -1.0, 6.0, 6.0)
            .into_iter()
            .map(TaxonId::as_str)
            .collect();
        assert_eq!(found, ["1", "2"]);
    }
}
