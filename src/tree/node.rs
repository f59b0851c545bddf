//! Taxon node type and its annotated field values.
//!
//! A node is one taxon in the tree handed over by the caller. Each node has:
//! - A unique taxon identifier (the map key)
//! - A descendant leaf `count` (1 for a leaf)
//! - The identifiers of its children (possibly none)
//! - Optional field values used for colour, value and category encoding

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Taxon identifier.
///
/// Upstream ids are opaque strings (NCBI taxids, GBIF keys, ...), so this
/// wraps a `String` rather than a numeric slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonId(pub String);

impl TaxonId {
    /// Create a new TaxonId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaxonId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaxonId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a field value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    /// Measured on this taxon.
    Direct,
    /// Summarised from descendant taxa.
    Descendant,
    /// Any other upstream source (e.g. "ancestor"); encoded as no source.
    #[serde(other)]
    Other,
}

/// Raw value of a field.
///
/// Upstream fields may carry any JSON value. Only numbers feed value
/// encoding and only strings feed category buckets; everything else is
/// decoded so one odd field never rejects the whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Numeric value, if this is a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// String values usable as category keys. Non-string list entries are
    /// skipped.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            FieldValue::Text(s) => vec![s.as_str()],
            FieldValue::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    FieldValue::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

/// A single annotated field on a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub value: Option<FieldValue>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub source: Option<FieldSource>,
}

impl Field {
    /// Source, with unrecognised sources folded into `None`.
    pub fn known_source(&self) -> Option<FieldSource> {
        match self.source {
            Some(FieldSource::Other) | None => None,
            source => source,
        }
    }
}

/// One taxon in the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub taxon_id: TaxonId,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default)]
    pub taxon_rank: String,
    /// Total number of leaf descendants (1 for a leaf).
    #[serde(default)]
    pub count: u64,
    /// Child ids. Ordered so iteration never depends on hashing.
    #[serde(default)]
    pub children: Option<BTreeSet<TaxonId>>,
    #[serde(default)]
    pub fields: Option<BTreeMap<String, Field>>,
    /// Highlight flag (the taxon matched the current query).
    #[serde(default)]
    pub status: Option<bool>,
    /// Precomputed category, used when no category field is configured.
    #[serde(default)]
    pub cat: Option<String>,
}

impl TreeNode {
    /// Create a leaf node with `count == 1`.
    pub fn leaf(taxon_id: impl Into<TaxonId>, scientific_name: impl Into<String>) -> Self {
        Self {
            taxon_id: taxon_id.into(),
            scientific_name: scientific_name.into(),
            taxon_rank: "species".to_string(),
            count: 1,
            ..Self::default()
        }
    }

    /// Set the children and return self.
    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaxonId>,
    {
        self.children = Some(children.into_iter().map(Into::into).collect());
        self
    }

    /// True when the node has no children recorded.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().is_none_or(BTreeSet::is_empty)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.as_ref()?.get(name)
    }

    /// True when the highlight flag is set.
    #[inline]
    pub fn is_highlighted(&self) -> bool {
        self.status.unwrap_or(false)
    }
}
