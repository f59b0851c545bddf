//! Fill colour encoding from field source and highlight status.
//!
//! The palette is a fixed 3×2 grid: one tone ramp per source (grey when the
//! node has no value for the selected field, green for a directly measured
//! value, orange for a value summarised from descendants) and one tone per
//! status (plain or highlighted). The grid is not configurable.

use serde::Serialize;

use crate::tree::{FieldSource, Query, TreeNode};

/// Grey ramp, lightest first.
pub const GREYS: [&str; 9] = [
    "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696", "#737373", "#525252", "#252525",
    "#000000",
];

/// Green ramp, lightest first.
pub const GREENS: [&str; 9] = [
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c",
    "#00441b",
];

/// Orange ramp, lightest first.
pub const ORANGES: [&str; 9] = [
    "#fff5eb", "#fee6ce", "#fdd0a2", "#fdae6b", "#fd8d3c", "#f16913", "#d94801", "#a63603",
    "#7f2704",
];

/// Fill for the synthetic ancestor wrapper.
pub const BACKGROUND: &str = GREYS[2];
/// Highlight fill for the synthetic ancestor wrapper.
pub const BACKGROUND_HIGHLIGHT: &str = GREYS[1];

const BASE_TONE: usize = 4;
/// Highlighted nodes sit one tone darker than the base fill.
const STATUS_TONE: usize = BASE_TONE + 1;
/// Hover fills sit this many tones lighter than the fill.
const HIGHLIGHT_OFFSET: usize = 1;

/// Colour and value encoding for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeColor {
    pub color: &'static str,
    pub highlight_color: &'static str,
    pub source: Option<FieldSource>,
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NodeColor {
    /// Neutral encoding used for the ancestor wrapper.
    pub fn background() -> Self {
        Self {
            color: BACKGROUND,
            highlight_color: BACKGROUND_HIGHLIGHT,
            source: None,
            value: None,
            min: None,
            max: None,
        }
    }
}

fn ramp(source: Option<FieldSource>) -> &'static [&'static str; 9] {
    match source {
        Some(FieldSource::Direct) => &GREENS,
        Some(FieldSource::Descendant) => &ORANGES,
        Some(FieldSource::Other) | None => &GREYS,
    }
}

/// Encode a node's colour from the first y field and its status.
///
/// `recurse == false` marks the synthetic ancestor wrapper, which always gets
/// the neutral background.
pub fn color_for(node: &TreeNode, query: &Query, recurse: bool) -> NodeColor {
    if !recurse {
        return NodeColor::background();
    }

    let field = query.primary_field().and_then(|name| node.field(name));
    let source = field.and_then(|f| f.known_source());
    let tone = if node.is_highlighted() {
        STATUS_TONE
    } else {
        BASE_TONE
    };
    let ramp = ramp(source);

    NodeColor {
        color: ramp[tone],
        highlight_color: ramp[tone - HIGHLIGHT_OFFSET],
        source,
        value: field.and_then(|f| f.value.as_ref()).and_then(|v| v.as_f64()),
        min: field.and_then(|f| f.min),
        max: field.and_then(|f| f.max),
    }
}
