//! Category bucket encoding for colour-by-category rendering.

use std::collections::HashMap;

use crate::tree::{Bounds, TreeNode};

/// Category key → bucket index, built once per layout call from `Bounds`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    indices: HashMap<String, usize>,
    field: Option<String>,
    /// Number of listed categories, repeats included.
    listed: usize,
    other_index: Option<usize>,
}

impl CategoryMap {
    /// Build the map from legend bounds.
    ///
    /// Returns `None` when the bounds define no categories. When
    /// `showOther` is set the "other" bucket takes the index after the last
    /// listed category.
    pub fn from_bounds(bounds: &Bounds) -> Option<Self> {
        let cats = bounds.cats.as_ref().filter(|cats| !cats.is_empty())?;
        let mut indices = HashMap::with_capacity(cats.len());
        for (i, cat) in cats.iter().enumerate() {
            indices.entry(cat.key.clone()).or_insert(i);
        }
        let other_index = bounds.show_other.unwrap_or(false).then_some(cats.len());
        Some(Self {
            indices,
            field: bounds.cat.clone(),
            listed: cats.len(),
            other_index,
        })
    }

    /// Index of the "other" bucket, if requested.
    pub fn other_index(&self) -> Option<usize> {
        self.other_index
    }

    /// Number of buckets including "other".
    pub fn bucket_count(&self) -> usize {
        self.listed + usize::from(self.other_index.is_some())
    }

    /// Bucket indices for a node.
    pub fn categories(&self, node: &TreeNode) -> Vec<usize> {
        categories_for(node, &self.indices, self.field.as_deref(), self.other_index)
    }
}

/// Bucket indices for a node's category value(s), sorted ascending.
///
/// Values come from `node.fields[category_field].value` (a string or a list
/// of strings) or, when the node has no such field, from `node.cat`. Unknown
/// values map to `other_index` or are dropped when there is no "other"
/// bucket. Repeated buckets are reported once.
pub fn categories_for(
    node: &TreeNode,
    category_map: &HashMap<String, usize>,
    category_field: Option<&str>,
    other_index: Option<usize>,
) -> Vec<usize> {
    let keys: Vec<&str> = category_field
        .and_then(|field| node.field(field))
        .and_then(|f| f.value.as_ref())
        .map(|v| v.keys())
        .unwrap_or_else(|| node.cat.as_deref().into_iter().collect());

    let mut buckets: Vec<usize> = keys
        .into_iter()
        .filter_map(|key| category_map.get(key).copied().or(other_index))
        .collect();
    buckets.sort_unstable();
    buckets.dedup();
    buckets
}
