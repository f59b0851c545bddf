//! Taxonomic tree input model.
//!
//! The tree arrives as a flat id → node map plus descriptors naming the
//! traversal root and the fields to encode. Nothing here is mutated by a
//! layout pass.

mod map;
mod node;
pub mod query;

pub use map::{TreeNodeMap, layout_order};
pub use node::{Field, FieldSource, FieldValue, TaxonId, TreeNode};
pub use query::{Bounds, CategoryKey, Lca, Query, ValueBounds};
