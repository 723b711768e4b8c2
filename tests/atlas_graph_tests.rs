// Scenario tests for atlas graph construction, filtering and fitting

use std::collections::{BTreeSet, HashSet};

use atlas_view::components::atlas::fit::{FitTarget, fit_bounds, fit_target};
use atlas_view::components::atlas::graph::{BACKGROUND_ID, build_graph, visible_maps};
use atlas_view::components::atlas::prefs::DisplayMode;
use atlas_view::components::atlas::search::{is_active, matched_ids};
use atlas_view::{AtlasConfig, AtlasGraph, MapEntity, parse_maps};

fn build(maps: &[MapEntity], query: &str, mode: DisplayMode) -> (BTreeSet<String>, AtlasGraph) {
	let matched = matched_ids(visible_maps(maps), query);
	let graph = build_graph(maps, &matched, is_active(query), mode, &AtlasConfig::default());
	(matched, graph)
}

fn atlas() -> Vec<MapEntity> {
	serde_json::from_str(
		r#"[
			{ "name": "Strand", "x": 40, "y": 60, "connected": ["Pit", "Dunes"],
			  "tiers": [1, 4, 8, 12, 16], "score": 8.2, "search": "strand beach boss" },
			{ "name": "Pit", "x": 55, "y": 70, "connected": ["Strand", "Dunes"],
			  "tiers": [1, 4, 8, 12, 16], "score": 3, "searchText": "pit cave" },
			{ "name": "Dunes", "x": 70, "y": 50, "connected": ["Strand", "Pit", "Tower"],
			  "tiers": [2, 2, 9, 9, 14], "score": 5.5, "search": "dunes desert" },
			{ "name": "Tower", "x": 90, "y": 40, "connected": ["Dunes"],
			  "tiers": [3, 7, 11, 15, 16], "search": "tower" },
			{ "name": "Vault", "x": 0, "y": 0, "connected": [],
			  "tiers": [5, 5, 5, 5, 5], "score": 1, "search": "vault unplaced" }
		]"#,
	)
	.unwrap()
}

// ============================================================================
// Visible set and edges
// ============================================================================

#[test]
fn test_two_connected_maps_and_one_unplaced() {
	let maps: Vec<MapEntity> = serde_json::from_str(
		r#"[
			{ "name": "A", "x": 1, "y": 1, "connected": ["B"], "tiers": [1] },
			{ "name": "B", "x": 2, "y": 2, "connected": ["A"], "tiers": [1] },
			{ "name": "C", "x": 0, "y": 0, "connected": [], "tiers": [1] }
		]"#,
	)
	.unwrap();
	let (_, graph) = build(&maps, "", DisplayMode::default());

	let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
	assert_eq!(ids, vec![BACKGROUND_ID, "A", "B"]);
	assert_eq!(graph.edges.len(), 1);
	assert_eq!(graph.edges[0].id, "A-B");
}

#[test]
fn test_edge_ids_are_unique_sorted_pairs() {
	let maps = atlas();
	let (_, graph) = build(&maps, "", DisplayMode::default());

	let mut seen = HashSet::new();
	for edge in &graph.edges {
		assert!(seen.insert(edge.id.clone()), "duplicate edge {}", edge.id);
		assert!(edge.source < edge.target);
		assert_eq!(edge.id, format!("{}-{}", edge.source, edge.target));
	}
	let adjacency: usize = visible_maps(&maps).iter().map(|m| m.connected.len()).sum();
	assert!(graph.edges.len() <= adjacency);
	assert_eq!(graph.edges.len(), 4);
}

#[test]
fn test_background_anchor_appears_exactly_once() {
	let (_, graph) = build(&atlas(), "", DisplayMode::default());
	let anchors = graph.nodes.iter().filter(|n| n.is_background()).count();
	assert_eq!(anchors, 1);
	assert_eq!(graph.nodes.len(), 1 + 4);
	assert!(graph.node("Vault").is_none());
}

// ============================================================================
// Search highlighting
// ============================================================================

#[test]
fn test_empty_query_keeps_everything_opaque() {
	let (matched, graph) = build(&atlas(), "  ", DisplayMode::default());
	assert_eq!(matched.len(), 4);
	assert!(graph.map_nodes().all(|n| n.opacity == 1.0));
}

#[test]
fn test_query_dims_non_matching_maps() {
	let (matched, graph) = build(&atlas(), "DESERT", DisplayMode::default());
	assert_eq!(matched.iter().collect::<Vec<_>>(), vec!["Dunes"]);
	for node in graph.map_nodes() {
		let expected = if node.id == "Dunes" { 1.0 } else { 0.4 };
		assert_eq!(node.opacity, expected, "{}", node.id);
	}
}

#[test]
fn test_unplaced_maps_never_match() {
	let (matched, _) = build(&atlas(), "vault", DisplayMode::default());
	assert!(matched.is_empty());
}

#[test]
fn test_no_matches_fits_all_and_dims_all() {
	let config = AtlasConfig::default();
	let (matched, graph) = build(&atlas(), "foo", DisplayMode::default());
	assert!(matched.is_empty());
	assert_eq!(fit_target(&matched), FitTarget::All);
	assert!(graph.map_nodes().all(|n| n.opacity == 0.4));

	let bounds = fit_bounds(&graph, &FitTarget::All, &config).unwrap();
	let (w, h) = config.background_size();
	assert_eq!((bounds.width(), bounds.height()), (w, h));
}

#[test]
fn test_fit_follows_matched_maps() {
	let config = AtlasConfig::default();
	let (matched, graph) = build(&atlas(), "boss", DisplayMode::default());
	let target = fit_target(&matched);
	assert_eq!(target, FitTarget::Nodes(vec!["Strand".to_string()]));

	let bounds = fit_bounds(&graph, &target, &config).unwrap();
	let strand = graph.node("Strand").unwrap().position;
	assert_eq!(bounds.center(), (strand.x, strand.y));
}

// ============================================================================
// Display mode
// ============================================================================

#[test]
fn test_voidstone_toggle_changes_only_differing_tiers() {
	let maps = atlas();
	let (_, level0) = build(&maps, "", DisplayMode { score_heatmap: false, voidstones: 0 });
	let (_, level1) = build(&maps, "", DisplayMode { score_heatmap: false, voidstones: 1 });

	assert_eq!(level0.edges, level1.edges);
	for (a, b) in level0.nodes.iter().zip(&level1.nodes) {
		assert_eq!(a.id, b.id);
		assert_eq!(a.position, b.position);
		if a.id == "Dunes" {
			assert_eq!(a.label, b.label);
			assert_eq!(a.color, b.color);
		}
	}
	assert_eq!(level0.node("Strand").unwrap().label, "T1 Strand");
	assert_eq!(level1.node("Strand").unwrap().label, "T4 Strand");
}

#[test]
fn test_heatmap_labels_by_score() {
	let (_, graph) = build(&atlas(), "", DisplayMode { score_heatmap: true, voidstones: 0 });
	assert_eq!(graph.node("Strand").unwrap().label, "8.2 Strand");
	assert_eq!(graph.node("Pit").unwrap().label, "3 Pit");
	assert_eq!(graph.node("Tower").unwrap().label, "? Tower");
}

#[test]
fn test_malformed_records_do_not_blank_the_atlas() {
	let maps = parse_maps(
		r#"[
			{ "name": "A", "x": 1, "y": 1, "connected": ["B"], "tiers": [1], "score": "n/a" },
			{ "name": "B", "x": 2, "y": 2, "connected": ["A"], "tiers": [1], "score": 4 },
			{ "name": "C", "x": 3, "y": 3, "connected": ["A"], "tiers": [1.5] }
		]"#,
	)
	.unwrap();
	let (_, graph) = build(&maps, "", DisplayMode { score_heatmap: true, voidstones: 0 });

	let ids: Vec<&str> = graph.map_nodes().map(|n| n.id.as_str()).collect();
	assert_eq!(ids, vec!["A", "B"]);
	assert_eq!(graph.node("A").unwrap().label, "? A");
	assert_eq!(graph.node("B").unwrap().label, "4 B");
}

#[test]
fn test_rebuild_is_idempotent() {
	let maps = atlas();
	let mode = DisplayMode { score_heatmap: true, voidstones: 2 };
	assert_eq!(build(&maps, "pit", mode), build(&maps, "pit", mode));
}
