//! Taxon Tree Layout - WASM Module
//!
//! Turns a taxonomic subtree (taxon nodes keyed by id, a lowest common
//! ancestor root and per-node field summaries) into drawable geometry for a
//! rectangular dendrogram or a radial sunburst. Compiled to WebAssembly and
//! exposed to JavaScript via wasm-bindgen.
//!
//! # Architecture
//!
//! - `tree`: input records (`TreeNode`, `Lca`, `Bounds`, `Query`) and
//!   deterministic child ordering
//! - `scale`: linear / log / power domain-to-range mappers
//! - `encode`: colour and category encoding per node
//! - `label`: label fitting with shrink, abbreviation and truncation
//! - `layout`: the shared traversal plus the `rect` and `ring` engines
//! - `spatial`: R-tree hit testing over laid-out taxa
//! - `session`: request decoding and the lookup handle behind `TreeLayoutWasm`

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod encode;
pub mod error;
pub mod label;
pub mod layout;
pub mod scale;
pub mod session;
pub mod spatial;
pub mod tree;

use error::LayoutError;
use layout::LayoutResult;
use session::{LayoutRequest, TreeLayout};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn decode_request(request: JsValue) -> error::Result<LayoutRequest> {
    serde_wasm_bindgen::from_value(request).map_err(|e| LayoutError::decode("layout request", e))
}

fn to_js<T: Serialize>(value: &T) -> error::Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(LayoutError::encode)
}

fn report_warnings(result: &LayoutResult) {
    for warning in result.warnings() {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "taxon {} is already placed; skipped as a child of {}",
            warning.child, warning.parent
        )));
    }
}

/// Lay out a tree in one call.
///
/// Takes `{ nodes, lca, bounds?, valueBounds?, xQuery?, yQuery?, style?,
/// config? }` and returns the geometry, or `null` when there is no data to
/// lay out yet.
#[wasm_bindgen(js_name = computeLayout)]
pub fn compute_layout(request: JsValue) -> Result<JsValue, JsError> {
    let request = decode_request(request)?;
    let Some(result) = request.run() else {
        return Ok(JsValue::NULL);
    };
    report_warnings(&result);
    Ok(to_js(&result)?)
}

/// A computed layout kept on the Rust side for repeated lookups.
#[wasm_bindgen]
pub struct TreeLayoutWasm {
    layout: TreeLayout,
}

#[wasm_bindgen]
impl TreeLayoutWasm {
    #[wasm_bindgen(constructor)]
    pub fn new(request: JsValue) -> Result<TreeLayoutWasm, JsError> {
        let request = decode_request(request)?;
        let layout = TreeLayout::compute(&request);
        if let Some(result) = layout.result() {
            report_warnings(result);
        }
        Ok(Self { layout })
    }

    /// Whether there was anything to lay out.
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// The geometry, or `null`.
    pub fn geometry(&self) -> Result<JsValue, JsError> {
        match self.layout.result() {
            Some(result) => Ok(to_js(result)?),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = maxDepth)]
    pub fn max_depth(&self) -> u32 {
        self.layout.result().map_or(0, LayoutResult::max_depth)
    }

    #[wasm_bindgen(js_name = warningCount)]
    pub fn warning_count(&self) -> usize {
        self.layout.result().map_or(0, |r| r.warnings().len())
    }

    /// Taxon id nearest to a point, within `maxDistance` when given.
    #[wasm_bindgen(js_name = nearestTaxon)]
    pub fn nearest_taxon(&self, x: f64, y: f64, max_distance: Option<f64>) -> Option<String> {
        self.layout
            .nearest(x, y, max_distance)
            .map(|id| id.as_str().to_string())
    }

    /// Taxon ids inside a rectangle.
    #[wasm_bindgen(js_name = taxaInRect)]
    pub fn taxa_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> js_sys::Array {
        self.layout
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(|id| JsValue::from_str(id.as_str()))
            .collect()
    }

    /// Position of a taxon by name (any case) or id, or `null`.
    pub fn locate(&self, query: &str) -> Result<JsValue, JsError> {
        match self.layout.locate(query) {
            Some(location) => Ok(to_js(location)?),
            None => Ok(JsValue::NULL),
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::encode::color::{GREENS, ORANGES};
    use crate::layout::fixtures::{cyclic, primates, two_leaves};
    use crate::layout::{LayoutConfig, LayoutStyle, Line};
    use crate::tree::{Lca, TreeNodeMap};

    fn request((nodes, lca): (TreeNodeMap, Lca), style: &str) -> LayoutRequest {
        LayoutRequest {
            nodes,
            lca,
            style: Some(style.to_string()),
            ..LayoutRequest::default()
        }
    }

    fn rect(request: &LayoutRequest) -> layout::RectGeometry {
        match request.run() {
            Some(LayoutResult::Rect(geometry)) => geometry,
            other => panic!("expected rect geometry, got {other:?}"),
        }
    }

    fn ring(request: &LayoutRequest) -> layout::RingGeometry {
        match request.run() {
            Some(LayoutResult::Ring(geometry)) => geometry,
            other => panic!("expected ring geometry, got {other:?}"),
        }
    }

    fn line<'g>(lines: &'g [Line], id: &str) -> &'g Line {
        lines.iter().find(|l| l.taxon_id.as_str() == id).unwrap()
    }

    #[test]
    fn test_two_leaf_dendrogram() {
        let geometry = rect(&request(two_leaves(), "rect"));
        let a = line(&geometry.lines, "a");
        let b = line(&geometry.lines, "b");
        assert!(a.y_min < a.y_max && b.y_min < b.y_max);
        assert!(a.y_min >= b.y_max || b.y_min >= a.y_max);
        let connector = line(&geometry.lines, "r").v_line.as_deref().unwrap();
        assert_eq!(
            connector,
            layout::path::v_line(line(&geometry.lines, "r").x_end, b.y_start, a.y_start)
        );
        assert_eq!(geometry.lines.iter().filter(|l| l.v_line.is_some()).count(), 1);
    }

    #[test]
    fn test_two_leaf_sunburst() {
        let geometry = ring(&request(two_leaves(), "ring"));
        let leaves: Vec<_> = geometry.arcs.iter().filter(|a| a.depth == 1).collect();
        assert_eq!(leaves.len(), 2);
        for arc in leaves {
            assert!(((arc.end_angle - arc.start_angle) - PI).abs() < 1e-12);
        }
    }

    #[test]
    fn test_direct_highlight_colour_differs_from_descendant() {
        let request: LayoutRequest = serde_json::from_value(serde_json::json!({
            "nodes": {
                "r": {"taxon_id": "r", "scientific_name": "Hominidae",
                      "taxon_rank": "family", "count": 2, "children": ["a", "b"]},
                "a": {"taxon_id": "a", "scientific_name": "Homo sapiens",
                      "taxon_rank": "species", "count": 1, "status": true,
                      "fields": {"genome_size": {"value": 3.1e9, "source": "direct"}}},
                "b": {"taxon_id": "b", "scientific_name": "Pan troglodytes",
                      "taxon_rank": "species", "count": 1,
                      "fields": {"genome_size": {"value": 3.2e9, "source": "descendant"}}}
            },
            "lca": {"taxon_id": "r"},
            "yQuery": {"yFields": ["genome_size"]}
        }))
        .unwrap();
        let geometry = rect(&request);
        let a = line(&geometry.lines, "a");
        let b = line(&geometry.lines, "b");
        assert_ne!(a.color, b.color);
        assert_eq!(a.color, GREENS[5]);
        assert_eq!(b.color, ORANGES[4]);
    }

    #[test]
    fn test_long_binomial_abbreviated_not_omitted() {
        let mut request = request(primates(), "rect");
        request.config = LayoutConfig {
            width: 180.0,
            ..LayoutConfig::default()
        };
        let geometry = rect(&request);
        let label = line(&geometry.lines, "9598").label.as_deref();
        assert_eq!(label, Some("P. troglodytes"));
    }

    #[test]
    fn test_cycle_completes_with_one_warning() {
        for style in ["rect", "ring"] {
            let result = request(cyclic(), style).run().unwrap();
            assert_eq!(result.style(), LayoutStyle::from_flag(style));
            assert_eq!(result.warnings().len(), 1);
            let warning = &result.warnings()[0];
            assert_eq!((warning.parent.as_str(), warning.child.as_str()), ("b", "a"));
        }
    }

    #[test]
    fn test_output_is_deterministic() {
        let (nodes, lca) = primates();
        // Same nodes, different insertion order.
        let mut entries: Vec<_> = nodes.values().cloned().collect();
        entries.reverse();
        let reordered: TreeNodeMap = entries.into_iter().collect();

        for style in ["rect", "ring"] {
            let first = serde_json::to_string(&request((nodes.clone(), lca.clone()), style).run())
                .unwrap();
            let second =
                serde_json::to_string(&request((reordered.clone(), lca.clone()), style).run())
                    .unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_ring_spans_conserve_counts() {
        let geometry = ring(&request(primates(), "ring"));
        let span = |id: &str| {
            let arc = geometry
                .arcs
                .iter()
                .find(|a| a.taxon_id.as_str() == id)
                .unwrap();
            arc.end_angle - arc.start_angle
        };
        let children = span("9606") + span("9598") + span("9593");
        assert!((children - span("9604")).abs() < 1e-12);
        assert!((span("9604") / span("9544") - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_data_yet() {
        assert!(LayoutRequest::default().run().is_none());
        let missing_root = LayoutRequest {
            lca: Lca::new("nope"),
            ..request(two_leaves(), "ring")
        };
        assert!(missing_root.run().is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(request(two_leaves(), "ring").run()).unwrap();
        assert_eq!(value["style"], "ring");
        assert_eq!(value["maxDepth"], 1);
        assert_eq!(value["arcs"][1]["taxon_id"], "r");
        assert!(value["labels"][0].get("arc").is_some() || value["labels"][0].get("radialPath").is_some());
        assert!(value["locations"]["homo sapiens"].is_object());

        let value = serde_json::to_value(request(two_leaves(), "rect").run()).unwrap();
        assert_eq!(value["style"], "rect");
        assert!(value["lines"][2]["hLine"].as_str().unwrap().starts_with('M'));
    }
}
