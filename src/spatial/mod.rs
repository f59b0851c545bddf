//! Spatial indexing for O(log n) hit testing.
//!
//! An R-tree over the anchor point of every laid-out taxon, used by the
//! JavaScript handle for pointer and selection queries.

mod rtree;

pub use rtree::{LocationIndex, TaxonPoint};
