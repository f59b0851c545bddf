//! Rectangular (dendrogram) layout.
//!
//! Depth runs left to right and leaves are stacked bottom to top in
//! traversal order. Every node gets a horizontal branch from its parent's
//! depth to its own; internal nodes with several children also get a
//! vertical connector joining their outermost children.
//!
//! # Passes
//!
//! 1. **x (pre-order):** `x_start = x(depth)`, `x_end = x(depth + 1)`, with
//!    leaves stretched to `x(max_depth + 1)` so tips line up. The x scale
//!    maps `[-0.5, max_depth + 2]` onto the plot width; the last column holds
//!    tip labels.
//! 2. **y (post-order):** leaves take the next row slot; a parent with one
//!    placed child takes that child's y, a parent with several takes the
//!    midpoint of its lowest and highest child. Rows map to pixels through
//!    an inverted scale so slot 0 is at the bottom.
//! 3. **emit (pre-order):** colour, value bar, categories, label and
//!    location per node.

use serde::Serialize;

use super::path;
use super::{LayoutConfig, LayoutInput, LayoutWarning, Location, Locations, TraversalContext};
use crate::encode::{NodeColor, color_for};
use crate::label::{LabelFitter, TextMeasurer};
use crate::scale::Scale;
use crate::tree::{FieldSource, TaxonId};

/// Scaled value glyph offsets in px from the bar column origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One node of the dendrogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(rename = "taxon_id")]
    pub taxon_id: TaxonId,
    #[serde(rename = "scientific_name")]
    pub scientific_name: String,
    #[serde(rename = "taxon_rank")]
    pub taxon_rank: String,
    pub depth: i32,
    pub count: u64,
    pub x_start: f64,
    pub x_end: f64,
    /// Pixel y of the branch.
    pub y_start: f64,
    /// Pixel extent of the subtree's rows (`y_min < y_max`).
    pub y_min: f64,
    pub y_max: f64,
    pub height: f64,
    pub h_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub label_width: f64,
    pub label_scale: f64,
    pub color: &'static str,
    pub highlight_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<FieldSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar: Option<Bar>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cats: Vec<usize>,
    pub status: bool,
}

/// Rectangular layout output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectGeometry {
    /// Ancestor wrapper first, then taxa in pre-order.
    pub lines: Vec<Line>,
    pub max_depth: u32,
    /// Rightmost extent of branches and labels.
    pub max_width: f64,
    /// Widest leaf label.
    pub max_tip: f64,
    pub plot_height: f64,
    /// Left edge of the value bar column, when bars are drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_x: Option<f64>,
    pub locations: Locations,
    pub warnings: Vec<LayoutWarning>,
}

/// Row slot range of a subtree plus the resolved row position.
#[derive(Debug, Clone, Copy, Default)]
struct RowSpan {
    y: f64,
    lo: usize,
    hi: usize,
}

/// The rectangular layout engine.
pub struct RectangularLayout<'a, M: TextMeasurer> {
    config: &'a LayoutConfig,
    fitter: LabelFitter<'a, M>,
}

impl<'a, M: TextMeasurer> RectangularLayout<'a, M> {
    pub fn new(config: &'a LayoutConfig, measurer: &'a M) -> Self {
        Self {
            config,
            fitter: LabelFitter::new(measurer, config.min_label_scale),
        }
    }

    /// Compute the dendrogram. `None` if the root is missing.
    pub fn compute(&self, input: &LayoutInput<'_>) -> Option<RectGeometry> {
        let ctx = TraversalContext::walk(input)?;
        let config = self.config;
        let max_depth = ctx.max_depth(input.lca);
        let depth_limit = f64::from(max_depth);

        let bar_scale = Scale::from_value_bounds(input.value_bounds, [0.0, config.bar_width]);
        let target_width = if bar_scale.is_some() {
            (config.width - config.bar_width - config.bar_gap).max(1.0)
        } else {
            config.width.max(1.0)
        };
        let x = Scale::linear([-0.5, depth_limit + 2.0], [0.0, target_width]);

        // x pass
        let bands: Vec<(f64, f64)> = ctx
            .visits
            .iter()
            .map(|visit| {
                let depth = f64::from(visit.depth);
                if visit.node.is_none() {
                    (x.apply(-0.5), x.apply(0.0))
                } else if visit.is_data_leaf() {
                    (x.apply(depth), x.apply(depth_limit + 1.0))
                } else {
                    (x.apply(depth), x.apply(depth + 1.0))
                }
            })
            .collect();

        // y pass
        let mut rows = vec![RowSpan::default(); ctx.visits.len()];
        let mut pending: Vec<Vec<f64>> = vec![Vec::new(); ctx.visits.len()];
        let mut next_slot = 0usize;
        for &idx in &ctx.post_order {
            let child_ys = std::mem::take(&mut pending[idx]);
            let visit = &ctx.visits[idx];
            let span = match child_ys.as_slice() {
                [] => {
                    let slot = next_slot;
                    next_slot += 1;
                    RowSpan {
                        y: slot as f64,
                        lo: slot,
                        hi: slot,
                    }
                }
                ys => {
                    let (min, max) = ys
                        .iter()
                        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| {
                            (lo.min(y), hi.max(y))
                        });
                    let lo = visit.children.iter().map(|&c| rows[c].lo).min().unwrap_or(0);
                    let hi = visit.children.iter().map(|&c| rows[c].hi).max().unwrap_or(0);
                    RowSpan {
                        y: (min + max) / 2.0,
                        lo,
                        hi,
                    }
                }
            };
            rows[idx] = span;
            if let Some(parent) = visit.parent {
                pending[parent].push(span.y);
            }
        }

        let total_rows = next_slot.max(1) as f64;
        let plot_height = total_rows * config.row_height();
        let y = Scale::linear([0.0, total_rows], [plot_height, 0.0]);
        let row_y = |row: f64| y.apply(row + 0.5);

        // emit
        let min_internal_band = config.min_internal_label_chars * config.char_width;
        let mut lines = Vec::with_capacity(ctx.visits.len());
        let mut locations = Locations::new();
        let mut max_width: f64 = 0.0;
        let mut max_tip: f64 = 0.0;

        for (idx, visit) in ctx.visits.iter().enumerate() {
            let (x_start, x_end) = bands[idx];
            let span = rows[idx];
            let y_start = row_y(span.y);
            let y_min = y.apply(span.hi as f64 + 1.0);
            let y_max = y.apply(span.lo as f64);

            let v_line = (visit.children.len() > 1).then(|| {
                let (lo, hi) = visit
                    .children
                    .iter()
                    .map(|&c| row_y(rows[c].y))
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                path::v_line(x_end, lo, hi)
            });

            let Some(node) = visit.node else {
                let color = NodeColor::background();
                lines.push(Line {
                    taxon_id: ctx.ancestor_id.clone(),
                    scientific_name: String::new(),
                    taxon_rank: String::new(),
                    depth: visit.depth,
                    count: 0,
                    x_start,
                    x_end,
                    y_start,
                    y_min,
                    y_max,
                    height: y_max - y_min,
                    h_line: path::h_line(x_start, x_end, y_start),
                    v_line,
                    label: None,
                    label_width: 0.0,
                    label_scale: 1.0,
                    color: color.color,
                    highlight_color: color.highlight_color,
                    source: None,
                    value: None,
                    bar: None,
                    cats: Vec::new(),
                    status: false,
                });
                continue;
            };

            let color = color_for(node, input.y_query, true);
            let bar = bar_scale.as_ref().zip(color.value).map(|(scale, value)| Bar {
                value: scale.apply(value),
                min: color.min.map(|v| scale.apply(v)),
                max: color.max.map(|v| scale.apply(v)),
            });

            let is_leaf = visit.children.is_empty();
            let fitted = if is_leaf {
                self.fitter
                    .fit(&node.scientific_name, &node.taxon_rank, target_width - x_start)
            } else if x_end - x_start > min_internal_band {
                self.fitter
                    .fit(&node.scientific_name, &node.taxon_rank, x_end - x_start)
            } else {
                None
            };
            let (label, label_width, label_scale) = match fitted {
                Some(f) => (Some(f.text), f.width, f.scale),
                None => (None, 0.0, 1.0),
            };
            if is_leaf {
                max_tip = max_tip.max(label_width);
            }
            max_width = max_width.max(x_end).max(x_start + label_width);

            TraversalContext::locate(
                &mut locations,
                Location {
                    taxon_id: node.taxon_id.clone(),
                    scientific_name: node.scientific_name.clone(),
                    x: x_end,
                    y: y_start,
                },
            );

            lines.push(Line {
                taxon_id: node.taxon_id.clone(),
                scientific_name: node.scientific_name.clone(),
                taxon_rank: node.taxon_rank.clone(),
                depth: visit.depth,
                count: node.count,
                x_start,
                x_end,
                y_start,
                y_min,
                y_max,
                height: y_max - y_min,
                h_line: path::h_line(x_start, x_end, y_start),
                v_line,
                label,
                label_width,
                label_scale,
                color: color.color,
                highlight_color: color.highlight_color,
                source: color.source,
                value: color.value,
                bar,
                cats: ctx.categories_for(node),
                status: node.is_highlighted(),
            });
        }

        let bar_x = bar_scale.map(|_| target_width + config.bar_gap);
        if let Some(bar_x) = bar_x {
            max_width = max_width.max(bar_x + config.bar_width);
        }

        tracing::debug!(
            lines = lines.len(),
            rows = next_slot,
            skipped = ctx.warnings.len(),
            "rectangular layout complete"
        );

        Some(RectGeometry {
            lines,
            max_depth,
            max_width,
            max_tip,
            plot_height,
            bar_x,
            locations,
            warnings: ctx.warnings,
        })
    }
}
