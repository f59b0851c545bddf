//! TreeNodeMap - the taxon lookup table a layout pass reads from.
//!
//! The map is keyed by taxon id and owned by the caller. It is not assumed
//! to be acyclic: a child id may point back at an ancestor, or at a taxon
//! that is missing from the map. Traversals must guard against both.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::node::{TaxonId, TreeNode};

/// Mapping from taxon id to node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeNodeMap {
    nodes: HashMap<TaxonId, TreeNode>,
}

impl TreeNodeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Insert a node under its own id, returning any node it replaced.
    pub fn insert(&mut self, node: TreeNode) -> Option<TreeNode> {
        self.nodes.insert(node.taxon_id.clone(), node)
    }

    /// Look up a node.
    pub fn get(&self, id: &TaxonId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// True if the id is present.
    pub fn contains(&self, id: &TaxonId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no nodes are present.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Children of `node` present in the map, in layout order.
    ///
    /// Larger clades first (`count` descending), then `scientific_name`
    /// ascending, then taxon id so ties never depend on input order.
    /// Child ids missing from the map are skipped.
    pub fn sorted_children<'a>(&'a self, node: &TreeNode) -> Vec<&'a TreeNode> {
        let mut children: Vec<&TreeNode> = node
            .children
            .iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
            .collect();
        children.sort_by(|a, b| layout_order(a, b));
        children
    }
}

/// Deterministic sibling ordering.
pub fn layout_order(a: &TreeNode, b: &TreeNode) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.scientific_name.cmp(&b.scientific_name))
        .then_with(|| a.taxon_id.cmp(&b.taxon_id))
}

impl FromIterator<TreeNode> for TreeNodeMap {
    fn from_iter<I: IntoIterator<Item = TreeNode>>(iter: I) -> Self {
        let mut map = TreeNodeMap::new();
        for node in iter {
            map.insert(node);
        }
        map
    }
}
