//! Query and bounds descriptors that accompany a tree.
//!
//! These are produced by the search/report layers and passed through to the
//! layout unchanged:
//! - `Lca`: traversal root, ancestor wrapper id and depth limit
//! - `Bounds`: category legend (keys, labels, "other" bucket)
//! - `ValueBounds`: numeric domain and scale for the value bar
//! - `Query`: field selection for colour and value encoding

use serde::{Deserialize, Serialize};

use super::node::TaxonId;

/// Lowest common ancestor descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lca {
    /// Traversal root.
    #[serde(rename = "taxon_id")]
    pub taxon_id: TaxonId,
    /// Nominal ancestor drawn as the synthetic wrapper.
    #[serde(default)]
    pub parent: Option<TaxonId>,
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub tax_depth: Option<u32>,
}

impl Lca {
    /// Create a descriptor rooted at `taxon_id`.
    pub fn new(taxon_id: impl Into<TaxonId>) -> Self {
        Self {
            taxon_id: taxon_id.into(),
            ..Self::default()
        }
    }

    /// Set the ancestor id and return self.
    pub fn with_parent(mut self, parent: impl Into<TaxonId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the maximum depth and return self.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Declared depth limit: `maxDepth`, falling back to `taxDepth`.
    pub fn declared_depth(&self) -> Option<u32> {
        self.max_depth.or(self.tax_depth)
    }
}

/// One entry of the category legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKey {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl CategoryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
        }
    }
}

/// Category legend bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    /// Field name holding category values. When absent, `node.cat` is used.
    #[serde(default)]
    pub cat: Option<String>,
    #[serde(default)]
    pub cats: Option<Vec<CategoryKey>>,
    #[serde(default)]
    pub show_other: Option<bool>,
}

/// Numeric bounds for the value bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueBounds {
    #[serde(default)]
    pub domain: Option<[f64; 2]>,
    #[serde(default)]
    pub scale: Option<String>,
}

/// Field selection for one axis of the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default)]
    pub y_fields: Vec<String>,
}

impl Query {
    /// Query selecting a single field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            y_fields: vec![name.into()],
        }
    }

    /// The field that drives colour and value encoding.
    pub fn primary_field(&self) -> Option<&str> {
        self.y_fields.first().map(String::as_str)
    }
}
