//! Builds the atlas node/edge snapshot from the map entity list.
//!
//! Every build starts from scratch: the visible maps are selected, projected
//! into atlas space, labeled and colored for the current [`DisplayMode`], and
//! their adjacency lists are folded into a set of undirected edges. The
//! background anchor is always the first node.

use std::collections::{BTreeSet, HashSet};

use log::debug;

use super::prefs::DisplayMode;
use super::scale::AtlasConfig;
use super::theme::{ColorClass, rating_color, tier_color};
use super::types::{AtlasEdge, AtlasGraph, AtlasNode, MapEntity, NodeKind, Point};

/// Id of the background anchor node.
pub const BACKGROUND_ID: &str = "bg";
/// Joins the two endpoint names of an edge id.
pub const EDGE_SEPARATOR: char = '-';

/// Maps that take part in the visible graph, in input order.
pub fn visible_maps(maps: &[MapEntity]) -> Vec<&MapEntity> {
	maps.iter().filter(|m| m.is_placed()).collect()
}

/// Builds the full snapshot.
///
/// `matched` holds the names satisfying the current query; when
/// `query_active` is false every map is drawn at full opacity regardless.
pub fn build_graph(
	maps: &[MapEntity],
	matched: &BTreeSet<String>,
	query_active: bool,
	mode: DisplayMode,
	config: &AtlasConfig,
) -> AtlasGraph {
	let visible = visible_maps(maps);

	let mut nodes = Vec::with_capacity(visible.len() + 1);
	nodes.push(background_node(config));
	nodes.extend(visible.iter().map(|m| {
		let opacity = if !query_active || matched.contains(&m.name) {
			1.0
		} else {
			config.dimmed_opacity
		};
		map_node(m, mode, opacity, config)
	}));

	AtlasGraph {
		nodes,
		edges: dedup_edges(visible.iter().flat_map(|m| map_links(m))),
	}
}

fn background_node(config: &AtlasConfig) -> AtlasNode {
	let (width, height) = config.background_size();
	AtlasNode {
		id: BACKGROUND_ID.to_string(),
		kind: NodeKind::Background {
			image: config.background_image.clone(),
			width,
			height,
		},
		position: Point::default(),
		label: String::new(),
		color: ColorClass::Secondary,
		opacity: 1.0,
		z_index: -1,
	}
}

fn map_node(map: &MapEntity, mode: DisplayMode, opacity: f64, config: &AtlasConfig) -> AtlasNode {
	let (prefix, color) = if mode.score_heatmap {
		score_encoding(map, config)
	} else {
		tier_encoding(map, mode.voidstones)
	};
	AtlasNode {
		id: map.name.clone(),
		kind: NodeKind::Map,
		position: config.to_screen(map.x, map.y),
		label: format!("{} {}", prefix, map.name),
		color,
		opacity,
		z_index: 0,
	}
}

fn score_encoding(map: &MapEntity, config: &AtlasConfig) -> (String, ColorClass) {
	match map.score.filter(|s| s.is_finite()) {
		Some(score) => (score.to_string(), rating_color(score, config.score_max)),
		None => {
			debug!("atlas: {} has no usable score", map.name);
			("?".to_string(), ColorClass::Secondary)
		}
	}
}

/// Tier label prefix and color for `voidstones`. A level past the end of the
/// tier list uses the last known tier.
fn tier_encoding(map: &MapEntity, voidstones: u8) -> (String, ColorClass) {
	let tier = map
		.tiers
		.get(usize::from(voidstones))
		.or_else(|| {
			debug!(
				"atlas: {} has no tier for voidstone level {}",
				map.name, voidstones
			);
			map.tiers.last()
		})
		.copied();
	match tier {
		Some(t) => (format!("T{}", t), tier_color(t)),
		None => ("T?".to_string(), ColorClass::Secondary),
	}
}

/// Candidate edges for one map, endpoints sorted. Self-links are dropped.
fn map_links(map: &MapEntity) -> impl Iterator<Item = AtlasEdge> + '_ {
	map.connected.iter().filter_map(move |c| {
		if *c == map.name {
			debug!("atlas: {} lists itself as connected", map.name);
			return None;
		}
		let (source, target) = if map.name <= *c {
			(&map.name, c)
		} else {
			(c, &map.name)
		};
		Some(AtlasEdge {
			id: format!("{}{}{}", source, EDGE_SEPARATOR, target),
			source: source.clone(),
			target: target.clone(),
		})
	})
}

/// Keeps the first edge seen for each unordered endpoint pair. The pair is
/// the key rather than the id, since map names may contain the separator.
fn dedup_edges(edges: impl Iterator<Item = AtlasEdge>) -> Vec<AtlasEdge> {
	let mut seen = HashSet::new();
	edges
		.filter(|e| seen.insert((e.source.clone(), e.target.clone())))
		.collect()
}
