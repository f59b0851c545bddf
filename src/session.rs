//! A computed layout plus the lookups a viewer runs against it.
//!
//! `LayoutRequest` is the single object the JavaScript side sends: the tree,
//! the LCA descriptor, encoding options, the style flag and an optional
//! config. `TreeLayout` runs it once and keeps:
//! - the geometry (`None` while there is no data yet)
//! - an R-tree over taxon anchor points for pointer hit testing
//! - the location map for search by name or id

use serde::Deserialize;

use crate::layout::{self, LayoutConfig, LayoutInput, LayoutResult, LayoutStyle, Location};
use crate::spatial::LocationIndex;
use crate::tree::{Bounds, Lca, Query, TaxonId, TreeNodeMap, ValueBounds};

/// Everything needed for one layout call, as sent from JavaScript.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub nodes: TreeNodeMap,
    pub lca: Lca,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub value_bounds: ValueBounds,
    #[serde(default)]
    pub x_query: Query,
    #[serde(default)]
    pub y_query: Query,
    /// `"ring"` for a sunburst; anything else is rectangular.
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub config: LayoutConfig,
}

impl LayoutRequest {
    pub fn style(&self) -> LayoutStyle {
        self.style
            .as_deref()
            .map_or(LayoutStyle::Rect, LayoutStyle::from_flag)
    }

    pub fn input(&self) -> LayoutInput<'_> {
        LayoutInput {
            nodes: &self.nodes,
            lca: &self.lca,
            bounds: &self.bounds,
            value_bounds: &self.value_bounds,
            x_query: &self.x_query,
            y_query: &self.y_query,
        }
    }

    pub fn run(&self) -> Option<LayoutResult> {
        layout::layout(&self.input(), self.style(), &self.config)
    }
}

/// A finished layout with its spatial index.
#[derive(Debug, Default)]
pub struct TreeLayout {
    result: Option<LayoutResult>,
    index: LocationIndex,
}

impl TreeLayout {
    pub fn compute(request: &LayoutRequest) -> Self {
        Self::from_result(request.run())
    }

    pub fn from_result(result: Option<LayoutResult>) -> Self {
        let index = result
            .as_ref()
            .map(|r| LocationIndex::from_locations(r.locations()))
            .unwrap_or_default();
        Self { result, index }
    }

    pub fn result(&self) -> Option<&LayoutResult> {
        self.result.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_none()
    }

    /// Nearest taxon anchor, optionally limited to a hit radius.
    pub fn nearest(&self, x: f64, y: f64, max_distance: Option<f64>) -> Option<&TaxonId> {
        match max_distance {
            Some(d) => self.index.nearest_within(x, y, d),
            None => self.index.nearest(x, y),
        }
    }

    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<&TaxonId> {
        self.index.in_rect(min_x, min_y, max_x, max_y)
    }

    /// Find a taxon by scientific name (any case) or by id.
    pub fn locate(&self, query: &str) -> Option<&Location> {
        let locations = self.result.as_ref()?.locations();
        let query = query.trim();
        locations
            .get(&query.to_lowercase())
            .or_else(|| locations.get(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(style: &str) -> LayoutRequest {
        serde_json::from_str(&format!(
            r#"{{
                "nodes": {{
                    "9604": {{"taxon_id": "9604", "scientific_name": "Hominidae",
                              "taxon_rank": "family", "count": 2,
                              "children": ["9606", "9598"]}},
                    "9606": {{"taxon_id": "9606", "scientific_name": "Homo sapiens",
                              "taxon_rank": "species", "count": 1}},
                    "9598": {{"taxon_id": "9598", "scientific_name": "Pan troglodytes",
                              "taxon_rank": "species", "count": 1}}
                }},
                "lca": {{"taxon_id": "9604", "parent": "314295", "maxDepth": 1}},
                "style": "{style}",
                "config": {{"width": 600}}
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_request_decodes_with_defaults() {
        let req = request("Ring");
        assert_eq!(req.style(), LayoutStyle::Ring);
        assert_eq!(req.config.width, 600.0);
        assert_eq!(req.config.radius, LayoutConfig::default().radius);
        assert_eq!(req.nodes.len(), 3);
        assert!(req.y_query.primary_field().is_none());
        assert_eq!(LayoutRequest::default().style(), LayoutStyle::Rect);
    }

    #[test]
    fn test_unused_odd_fields_do_not_reject_request() {
        let req: LayoutRequest = serde_json::from_value(serde_json::json!({
            "nodes": {
                "1": {"taxon_id": "1", "scientific_name": "Homo sapiens", "count": 1,
                      "fields": {"is_model": {"value": true},
                                 "chromosome_counts": {"value": [23, 24]}}}
            },
            "lca": {"taxon_id": "1"}
        }))
        .unwrap();
        assert!(TreeLayout::compute(&req).result().is_some());
    }

    #[test]
    fn test_empty_request_has_no_layout() {
        let layout = TreeLayout::compute(&LayoutRequest::default());
        assert!(layout.is_empty());
        assert_eq!(layout.nearest(0.0, 0.0, None), None);
        assert!(layout.locate("anything").is_none());
    }

    #[test]
    fn test_locate_any_case_or_id() {
        let layout = TreeLayout::compute(&request("rect"));
        let by_name = layout.locate("  HOMO Sapiens ").unwrap();
        assert_eq!(by_name.taxon_id.as_str(), "9606");
        assert_eq!(layout.locate("9598").unwrap().scientific_name, "Pan troglodytes");
        assert!(layout.locate("Gorilla").is_none());
    }

    #[test]
    fn test_hit_testing_follows_locations() {
        for style in ["rect", "ring"] {
            let layout = TreeLayout::compute(&request(style));
            let human = layout.locate("homo sapiens").unwrap();
            assert_eq!(
                layout.nearest(human.x, human.y, Some(1.0)).map(TaxonId::as_str),
                Some("9606")
            );
            let everything = layout.in_rect(-1e6, -1e6, 1e6, 1e6);
            assert_eq!(everything.len(), 3);
        }
    }
}
