//! Tree layout algorithms.
//!
//! Two engines turn the same taxon tree into drawable geometry:
//! - `rect`: a left-to-right dendrogram (x by depth, y by leaf order)
//! - `ring`: a sunburst (angle by descendant count, radius by depth)
//!
//! Both share one traversal: an iterative depth-first walk from the LCA root
//! with an explicit stack and a visited set, so malformed (cyclic) input is
//! cut at the first repeated node instead of recursing forever. The walk
//! records an arena of visits in pre-order plus a post-order list; each
//! engine then runs its own coordinate passes over that arena.

pub mod path;
pub mod rect;
pub mod ring;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::encode::CategoryMap;
use crate::label::{CharWidthMeasurer, TextMeasurer};
use crate::tree::{Bounds, Lca, Query, TaxonId, TreeNode, TreeNodeMap, ValueBounds};

pub use rect::{Line, RectGeometry, RectangularLayout};
pub use ring::{Arc, Label, LabelPath, RadialLayout, RingGeometry};

/// Which engine to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStyle {
    /// Rectangular dendrogram.
    #[default]
    Rect,
    /// Radial sunburst.
    Ring,
}

impl LayoutStyle {
    /// Parse a style flag. Anything other than `"ring"` is rectangular.
    pub fn from_flag(flag: &str) -> Self {
        if flag.eq_ignore_ascii_case("ring") {
            LayoutStyle::Ring
        } else {
            LayoutStyle::Rect
        }
    }
}

/// Configuration for both layout engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Rectangular plot width in px, including any value bar column.
    pub width: f64,
    /// Advance per label character in px.
    pub char_width: f64,
    /// Label character height in px; rows are 1.5 characters tall.
    pub char_height: f64,
    /// Width of the value bar column.
    pub bar_width: f64,
    /// Gap between the tree and the value bar column.
    pub bar_gap: f64,
    /// Internal rectangular labels need a band wider than this many characters.
    pub min_internal_label_chars: f64,
    /// Outermost ring radius in px.
    pub radius: f64,
    /// Fraction of the full circle removed from full-span arcs (half each side).
    pub seam_epsilon: f64,
    /// Smallest font scale accepted before abbreviating.
    pub min_label_scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            char_width: 7.0,
            char_height: 12.0,
            bar_width: 100.0,
            bar_gap: 10.0,
            min_internal_label_chars: 5.0,
            radius: 375.0,
            seam_epsilon: 0.0005,
            min_label_scale: 0.8,
        }
    }
}

impl LayoutConfig {
    /// Pixel height of one leaf row.
    pub fn row_height(&self) -> f64 {
        self.char_height * 1.5
    }

    /// The default text measurer for this configuration.
    pub fn measurer(&self) -> CharWidthMeasurer {
        CharWidthMeasurer::new(self.char_width)
    }
}

/// Everything a layout call reads. Owned by the caller.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub nodes: &'a TreeNodeMap,
    pub lca: &'a Lca,
    pub bounds: &'a Bounds,
    pub value_bounds: &'a ValueBounds,
    /// Accepted for symmetry with the report; the layout does not read it.
    pub x_query: &'a Query,
    pub y_query: &'a Query,
}

/// A resolved taxon position for search and navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "taxon_id")]
    pub taxon_id: TaxonId,
    #[serde(rename = "scientific_name")]
    pub scientific_name: String,
    pub x: f64,
    pub y: f64,
}

/// Lookup keyed by lower-cased scientific name and by raw taxon id.
pub type Locations = BTreeMap<String, Location>;

/// A child edge dropped because its target was already placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutWarning {
    pub parent: TaxonId,
    pub child: TaxonId,
}

/// Geometry for one layout call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum LayoutResult {
    Rect(RectGeometry),
    Ring(RingGeometry),
}

impl LayoutResult {
    pub fn style(&self) -> LayoutStyle {
        match self {
            LayoutResult::Rect(_) => LayoutStyle::Rect,
            LayoutResult::Ring(_) => LayoutStyle::Ring,
        }
    }

    pub fn locations(&self) -> &Locations {
        match self {
            LayoutResult::Rect(g) => &g.locations,
            LayoutResult::Ring(g) => &g.locations,
        }
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        match self {
            LayoutResult::Rect(g) => &g.warnings,
            LayoutResult::Ring(g) => &g.warnings,
        }
    }

    pub fn max_depth(&self) -> u32 {
        match self {
            LayoutResult::Rect(g) => g.max_depth,
            LayoutResult::Ring(g) => g.max_depth,
        }
    }
}

/// Run the engine selected by `style`.
///
/// Returns `None` when there is nothing to lay out yet: an empty node map or
/// a root id missing from it.
pub fn layout(
    input: &LayoutInput<'_>,
    style: LayoutStyle,
    config: &LayoutConfig,
) -> Option<LayoutResult> {
    layout_with_measurer(input, style, config, &config.measurer())
}

/// As [`layout`], with a caller-supplied text measurer.
pub fn layout_with_measurer<M: TextMeasurer>(
    input: &LayoutInput<'_>,
    style: LayoutStyle,
    config: &LayoutConfig,
    measurer: &M,
) -> Option<LayoutResult> {
    if input.nodes.is_empty() || !input.nodes.contains(&input.lca.taxon_id) {
        return None;
    }
    tracing::debug!(
        ?style,
        nodes = input.nodes.len(),
        root = %input.lca.taxon_id,
        "computing tree layout"
    );
    match style {
        LayoutStyle::Rect => RectangularLayout::new(config, measurer)
            .compute(input)
            .map(LayoutResult::Rect),
        LayoutStyle::Ring => RadialLayout::new(config, measurer)
            .compute(input)
            .map(LayoutResult::Ring),
    }
}

/// One placed node. Index 0 of the arena is the synthetic ancestor wrapper.
#[derive(Debug)]
pub(crate) struct Visit<'a> {
    /// `None` for the ancestor wrapper.
    pub node: Option<&'a TreeNode>,
    /// Wrapper is -1, root is 0.
    pub depth: i32,
    pub parent: Option<usize>,
    /// Placed children in layout order.
    pub children: Vec<usize>,
}

impl Visit<'_> {
    /// Leaf by the input data: no children recorded at all.
    pub fn is_data_leaf(&self) -> bool {
        self.node.is_some_and(TreeNode::is_leaf)
    }

    pub fn count(&self) -> u64 {
        self.node.map_or(0, |n| n.count)
    }
}

enum Frame<'a> {
    Enter {
        node: &'a TreeNode,
        parent: usize,
        depth: i32,
    },
    Exit(usize),
}

/// Per-call traversal state: the visit arena, orderings and diagnostics.
#[derive(Debug)]
pub(crate) struct TraversalContext<'a> {
    pub ancestor_id: TaxonId,
    pub visits: Vec<Visit<'a>>,
    /// Children before parents; the wrapper is last.
    pub post_order: Vec<usize>,
    pub warnings: Vec<LayoutWarning>,
    /// Deepest depth reached.
    pub deepest: u32,
    /// Built from `Bounds` when categories are configured.
    pub categories: Option<CategoryMap>,
    visited: HashSet<&'a TaxonId>,
}

impl<'a> TraversalContext<'a> {
    /// Walk the tree from the LCA root.
    ///
    /// Returns `None` when the root is not in the map.
    pub fn walk(input: &LayoutInput<'a>) -> Option<Self> {
        let root = input.nodes.get(&input.lca.taxon_id)?;
        let ancestor_id = input.lca.parent.clone().unwrap_or_default();

        let mut ctx = TraversalContext {
            ancestor_id,
            visits: Vec::with_capacity(input.nodes.len() + 1),
            post_order: Vec::with_capacity(input.nodes.len() + 1),
            warnings: Vec::new(),
            deepest: 0,
            categories: CategoryMap::from_bounds(input.bounds),
            visited: HashSet::with_capacity(input.nodes.len()),
        };
        ctx.visits.push(Visit {
            node: None,
            depth: -1,
            parent: None,
            children: Vec::new(),
        });

        let mut stack = vec![Frame::Enter {
            node: root,
            parent: 0,
            depth: 0,
        }];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter {
                    node,
                    parent,
                    depth,
                } => {
                    if !ctx.visited.insert(&node.taxon_id) {
                        ctx.warn_revisit(parent, node);
                        continue;
                    }
                    let idx = ctx.visits.len();
                    ctx.visits.push(Visit {
                        node: Some(node),
                        depth,
                        parent: Some(parent),
                        children: Vec::new(),
                    });
                    ctx.visits[parent].children.push(idx);
                    ctx.deepest = ctx.deepest.max(depth.unsigned_abs());

                    stack.push(Frame::Exit(idx));
                    // Reversed so the first child in layout order is walked first.
                    for child in input.nodes.sorted_children(node).into_iter().rev() {
                        stack.push(Frame::Enter {
                            node: child,
                            parent: idx,
                            depth: depth + 1,
                        });
                    }
                }
                Frame::Exit(idx) => ctx.post_order.push(idx),
            }
        }
        ctx.post_order.push(0);
        Some(ctx)
    }

    fn warn_revisit(&mut self, parent: usize, child: &TreeNode) {
        let parent_id = self.id_of(parent).clone();
        tracing::warn!(
            parent = %parent_id,
            child = %child.taxon_id,
            "taxon already placed; skipping repeated child edge"
        );
        self.warnings.push(LayoutWarning {
            parent: parent_id,
            child: child.taxon_id.clone(),
        });
    }

    /// Taxon id of a visit (the ancestor id for the wrapper).
    pub fn id_of(&self, idx: usize) -> &TaxonId {
        self.visits[idx]
            .node
            .map_or(&self.ancestor_id, |node| &node.taxon_id)
    }

    /// Depth used for scaling: the declared LCA depth, widened to cover
    /// anything the walk actually reached.
    pub fn max_depth(&self, lca: &Lca) -> u32 {
        lca.declared_depth().unwrap_or(0).max(self.deepest)
    }

    pub fn categories_for(&self, node: &TreeNode) -> Vec<usize> {
        self.categories
            .as_ref()
            .map(|map| map.categories(node))
            .unwrap_or_default()
    }

    /// Record `key → location` under the raw id and the lower-cased name.
    pub fn locate(locations: &mut Locations, location: Location) {
        let name_key = location.scientific_name.to_lowercase();
        if !name_key.is_empty() {
            locations.entry(name_key).or_insert_with(|| location.clone());
        }
        locations
            .entry(location.taxon_id.as_str().to_string())
            .or_insert(location);
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::tree::TaxonId;

    fn input<'a>(
        nodes: &'a TreeNodeMap,
        lca: &'a Lca,
        bounds: &'a Bounds,
        value_bounds: &'a ValueBounds,
        query: &'a Query,
    ) -> LayoutInput<'a> {
        LayoutInput {
            nodes,
            lca,
            bounds,
            value_bounds,
            x_query: query,
            y_query: query,
        }
    }

    #[test]
    fn test_style_flag() {
        assert_eq!(LayoutStyle::from_flag("ring"), LayoutStyle::Ring);
        assert_eq!(LayoutStyle::from_flag("RING"), LayoutStyle::Ring);
        assert_eq!(LayoutStyle::from_flag("rect"), LayoutStyle::Rect);
        assert_eq!(LayoutStyle::from_flag("anything"), LayoutStyle::Rect);
    }

    #[test]
    fn test_empty_nodes_is_none() {
        let nodes = TreeNodeMap::new();
        let lca = Lca::new("1");
        let (b, vb, q) = (Bounds::default(), ValueBounds::default(), Query::default());
        let input = input(&nodes, &lca, &b, &vb, &q);
        assert!(layout(&input, LayoutStyle::Rect, &LayoutConfig::default()).is_none());
        assert!(layout(&input, LayoutStyle::Ring, &LayoutConfig::default()).is_none());
    }

    #[test]
    fn test_missing_root_is_none() {
        let (nodes, _) = two_leaves();
        let lca = Lca::new("not-there");
        let (b, vb, q) = (Bounds::default(), ValueBounds::default(), Query::default());
        let input = input(&nodes, &lca, &b, &vb, &q);
        assert!(layout(&input, LayoutStyle::Rect, &LayoutConfig::default()).is_none());
    }

    #[test]
    fn test_dispatch_by_style() {
        let (nodes, lca) = two_leaves();
        let (b, vb, q) = (Bounds::default(), ValueBounds::default(), Query::default());
        let input = input(&nodes, &lca, &b, &vb, &q);
        let config = LayoutConfig::default();
        let rect = layout(&input, LayoutStyle::Rect, &config).unwrap();
        let ring = layout(&input, LayoutStyle::Ring, &config).unwrap();
        assert_eq!(rect.style(), LayoutStyle::Rect);
        assert_eq!(ring.style(), LayoutStyle::Ring);
        assert_eq!(rect.max_depth(), 1);
        assert_eq!(ring.max_depth(), 1);
    }

    #[test]
    fn test_walk_orders() {
        let (nodes, lca) = primates();
        let (b, vb, q) = (Bounds::default(), ValueBounds::default(), Query::default());
        let input = input(&nodes, &lca, &b, &vb, &q);
        let ctx = TraversalContext::walk(&input).unwrap();

        let pre: Vec<&str> = (0..ctx.visits.len()).map(|i| ctx.id_of(i).as_str()).collect();
        assert_eq!(
            pre,
            vec!["314146", "9443", "9604", "9593", "9606", "9598", "9526", "9544", "9479"]
        );
        let post: Vec<&str> = ctx.post_order.iter().map(|&i| ctx.id_of(i).as_str()).collect();
        assert_eq!(
            post,
            vec!["9593", "9606", "9598", "9604", "9544", "9526", "9479", "9443", "314146"]
        );
        assert_eq!(ctx.deepest, 2);
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_walk_breaks_cycle_once() {
        let (nodes, lca) = cyclic();
        let (b, vb, q) = (Bounds::default(), ValueBounds::default(), Query::default());
        let input = input(&nodes, &lca, &b, &vb, &q);
        let ctx = TraversalContext::walk(&input).unwrap();

        // Wrapper plus each of the four taxa exactly once.
        assert_eq!(ctx.visits.len(), 5);
        assert_eq!(
            ctx.warnings,
            vec![LayoutWarning {
                parent: TaxonId::new("b"),
                child: TaxonId::new("a"),
            }]
        );
    }

    #[test]
    fn test_max_depth_prefers_wider() {
        let (nodes, mut lca) = primates();
        let (b, vb, q) = (Bounds::default(), ValueBounds::default(), Query::default());
        lca.max_depth = Some(1);
        let input = input(&nodes, &lca, &b, &vb, &q);
        let ctx = TraversalContext::walk(&input).unwrap();
        assert_eq!(ctx.max_depth(&lca), 2);
        let deeper = Lca::new("9443").with_max_depth(6);
        assert_eq!(ctx.max_depth(&deeper), 6);
    }
}
