//! Radial (sunburst) layout.
//!
//! Angle encodes each taxon's share of the root's descendant leaves and
//! radius encodes depth:
//! - `angle = linear([0, root_count] → [-π, π])` over a running count, so
//!   siblings take contiguous, non-overlapping wedges of their parent
//! - `radius = power(1)([-0.5, max_depth + 1] → [0, radius])`; a taxon at
//!   depth `d` spans `[r(d), r(d + 1)]` and leaves run out to the rim
//!
//! A wedge covering the whole circle is narrowed by `seam_epsilon` so its
//! start and end stay distinguishable. Each arc has a companion highlight
//! arc with the same angles reaching the rim.

use std::f64::consts::PI;

use serde::Serialize;

use super::path;
use super::{LayoutConfig, LayoutInput, LayoutWarning, Location, Locations, TraversalContext};
use crate::encode::{NodeColor, color_for};
use crate::label::{FittedLabel, LabelFitter, TextMeasurer};
use crate::scale::Scale;
use crate::tree::{FieldSource, TaxonId, TreeNode};

/// One wedge of the sunburst.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    #[serde(rename = "taxon_id")]
    pub taxon_id: TaxonId,
    #[serde(rename = "scientific_name")]
    pub scientific_name: String,
    #[serde(rename = "taxon_rank")]
    pub taxon_rank: String,
    pub depth: i32,
    pub count: u64,
    /// Running leaf count at the wedge's start.
    pub start: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub arc: String,
    pub highlight: String,
    pub color: &'static str,
    pub highlight_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<FieldSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cats: Vec<usize>,
    pub status: bool,
}

/// Path a ring label follows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelPath {
    /// Along the wedge at its mid radius.
    Arc(String),
    /// Along a radius through the wedge's mid angle.
    RadialPath(String),
}

/// A fitted ring label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(rename = "taxon_id")]
    pub taxon_id: TaxonId,
    /// Text to draw (possibly abbreviated or truncated).
    #[serde(rename = "scientific_name")]
    pub scientific_name: String,
    #[serde(flatten)]
    pub path: LabelPath,
    pub width: f64,
    pub label_scale: f64,
}

/// Radial layout output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingGeometry {
    /// Ancestor wrapper first, then taxa in pre-order.
    pub arcs: Vec<Arc>,
    pub labels: Vec<Label>,
    pub max_depth: u32,
    pub radius: f64,
    pub locations: Locations,
    pub warnings: Vec<LayoutWarning>,
}

/// The radial layout engine.
pub struct RadialLayout<'a, M: TextMeasurer> {
    config: &'a LayoutConfig,
    fitter: LabelFitter<'a, M>,
}

impl<'a, M: TextMeasurer> RadialLayout<'a, M> {
    pub fn new(config: &'a LayoutConfig, measurer: &'a M) -> Self {
        Self {
            config,
            fitter: LabelFitter::new(measurer, config.min_label_scale),
        }
    }

    /// Compute the sunburst. `None` if the root is missing.
    pub fn compute(&self, input: &LayoutInput<'_>) -> Option<RingGeometry> {
        let ctx = TraversalContext::walk(input)?;
        let config = self.config;
        let max_depth = ctx.max_depth(input.lca);
        let depth_limit = f64::from(max_depth);
        let rim = config.radius;

        // Visit 1 is always the root.
        let root_count = (ctx.visits[1].count() as f64).max(1.0);
        let angle = Scale::linear([0.0, root_count], [-PI, PI]);
        let radius = Scale::power(1.0, [-0.5, depth_limit + 1.0], [0.0, rim]);
        let seam = config.seam_epsilon * PI;

        // Running count start of every wedge, parents before children.
        let mut starts = vec![0.0_f64; ctx.visits.len()];
        for (idx, visit) in ctx.visits.iter().enumerate() {
            let mut running = starts[idx];
            for &child in &visit.children {
                starts[child] = running;
                running += ctx.visits[child].count() as f64;
            }
        }

        let mut arcs = Vec::with_capacity(ctx.visits.len());
        let mut labels = Vec::new();
        let mut locations = Locations::new();

        for (idx, visit) in ctx.visits.iter().enumerate() {
            let span = match visit.node {
                Some(node) => node.count as f64,
                None => root_count,
            };
            let start = starts[idx];
            let mut start_angle = angle.apply(start);
            let mut end_angle = angle.apply(start + span);
            if span >= root_count {
                start_angle += seam;
                end_angle -= seam;
            }

            let depth = f64::from(visit.depth);
            let (inner, outer) = match visit.node {
                None => (radius.apply(-0.5), radius.apply(0.0)),
                Some(_) if visit.is_data_leaf() => {
                    (radius.apply(depth), radius.apply(depth_limit + 1.0))
                }
                Some(_) => (radius.apply(depth), radius.apply(depth + 1.0)),
            };

            let arc_path = path::annulus_sector(inner, outer, start_angle, end_angle);
            let highlight = path::annulus_sector(inner, rim, start_angle, end_angle);

            let Some(node) = visit.node else {
                let color = NodeColor::background();
                arcs.push(Arc {
                    taxon_id: ctx.ancestor_id.clone(),
                    scientific_name: String::new(),
                    taxon_rank: String::new(),
                    depth: visit.depth,
                    count: 0,
                    start,
                    start_angle,
                    end_angle,
                    inner_radius: inner,
                    outer_radius: outer,
                    arc: arc_path,
                    highlight,
                    color: color.color,
                    highlight_color: color.highlight_color,
                    source: None,
                    value: None,
                    cats: Vec::new(),
                    status: false,
                });
                continue;
            };

            let mid_radius = (inner + outer) / 2.0;
            let mid_angle = (start_angle + end_angle) / 2.0;
            if let Some(label) =
                self.place_label(node, inner, outer, start_angle, end_angle)
            {
                labels.push(label);
            }

            let (cx, cy) = path::polar(mid_radius, mid_angle);
            TraversalContext::locate(
                &mut locations,
                Location {
                    taxon_id: node.taxon_id.clone(),
                    scientific_name: node.scientific_name.clone(),
                    x: cx,
                    y: cy,
                },
            );

            let color = color_for(node, input.y_query, true);
            arcs.push(Arc {
                taxon_id: node.taxon_id.clone(),
                scientific_name: node.scientific_name.clone(),
                taxon_rank: node.taxon_rank.clone(),
                depth: visit.depth,
                count: node.count,
                start,
                start_angle,
                end_angle,
                inner_radius: inner,
                outer_radius: outer,
                arc: arc_path,
                highlight,
                color: color.color,
                highlight_color: color.highlight_color,
                source: color.source,
                value: color.value,
                cats: ctx.categories_for(node),
                status: node.is_highlighted(),
            });
        }

        tracing::debug!(
            arcs = arcs.len(),
            labels = labels.len(),
            skipped = ctx.warnings.len(),
            "radial layout complete"
        );

        Some(RingGeometry {
            arcs,
            labels,
            max_depth,
            radius: rim,
            locations,
            warnings: ctx.warnings,
        })
    }

    /// Prefer text along the arc when the wedge is wider than it is deep,
    /// then along the radius, then the abbreviation/truncation chain in the
    /// longer direction.
    fn place_label(
        &self,
        node: &TreeNode,
        inner: f64,
        outer: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Option<Label> {
        let name = node.scientific_name.as_str();
        let mid_radius = (inner + outer) / 2.0;
        let arc_length = (end_angle - start_angle) * mid_radius;
        let radial_length = outer - inner;
        let along_arc = arc_length > radial_length;

        let arc_path = || path::label_arc(mid_radius, start_angle, end_angle);
        let radial_path =
            || path::label_radial(inner, outer, (start_angle + end_angle) / 2.0);

        let (fitted, path): (FittedLabel, LabelPath) = if let Some(fitted) = along_arc
            .then(|| self.fitter.fit_unchanged(name, arc_length))
            .flatten()
        {
            (fitted, LabelPath::Arc(arc_path()))
        } else if let Some(fitted) = self.fitter.fit_unchanged(name, radial_length) {
            (fitted, LabelPath::RadialPath(radial_path()))
        } else if along_arc {
            let fitted = self.fitter.fit(name, &node.taxon_rank, arc_length)?;
            (fitted, LabelPath::Arc(arc_path()))
        } else {
            let fitted = self.fitter.fit(name, &node.taxon_rank, radial_length)?;
            (fitted, LabelPath::RadialPath(radial_path()))
        };

        Some(Label {
            taxon_id: node.taxon_id.clone(),
            scientific_name: fitted.text,
            path,
            width: fitted.width,
            label_scale: fitted.scale,
        })
    }
}
