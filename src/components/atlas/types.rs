//! Map entity input records and the derived graph snapshot.

use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::theme::ColorClass;

/// A single map location on the atlas, as supplied by the data layer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapEntity {
	/// Unique map name. Used as node id and as adjacency reference.
	pub name: String,
	/// Horizontal position in source units. `<= 0` marks an unplaced map.
	pub x: f64,
	/// Vertical position in source units. `<= 0` marks an unplaced map.
	pub y: f64,
	/// Names of adjacent maps. May reference maps that are not visible.
	pub connected: Vec<String>,
	/// Map tier indexed by voidstone level.
	pub tiers: Vec<u32>,
	/// Market score, expected in `0..=10`. Non-numeric values read as absent.
	#[serde(deserialize_with = "lenient_score")]
	pub score: Option<f64>,
	/// Whether the map hosts a boss. Display passthrough only.
	pub boss: bool,
	/// Precomputed text the search query is matched against.
	#[serde(alias = "searchText")]
	pub search: String,
}

impl MapEntity {
	/// Text used for search matching, falling back to the map name.
	pub fn search_text(&self) -> &str {
		if self.search.is_empty() {
			&self.name
		} else {
			&self.search
		}
	}

	/// Whether the map is drawn on the atlas at all.
	pub fn is_placed(&self) -> bool {
		!self.connected.is_empty() && self.x > 0.0 && self.y > 0.0
	}
}

/// Accepts a number or a numeric string; anything else is no score.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	})
}

/// Parses a JSON array of map records one record at a time, skipping records
/// that cannot be read so the rest of the atlas still renders.
pub fn parse_maps(json: &str) -> serde_json::Result<Vec<MapEntity>> {
	let records: Vec<Value> = serde_json::from_str(json)?;
	Ok(records
		.into_iter()
		.enumerate()
		.filter_map(|(i, record)| match MapEntity::deserialize(&record) {
			Ok(map) => Some(map),
			Err(e) => {
				warn!("atlas: skipping map record {}: {}", i, e);
				None
			}
		})
		.collect())
}

/// A position in atlas pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

/// What a node in the snapshot represents.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	/// The background image every map node is positioned relative to.
	Background {
		image: String,
		width: f64,
		height: f64,
	},
	/// A visible map.
	Map,
}

/// A node ready for the rendering surface.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasNode {
	pub id: String,
	pub kind: NodeKind,
	/// Center of the node for maps, top-left corner for the background.
	pub position: Point,
	pub label: String,
	pub color: ColorClass,
	pub opacity: f64,
	/// Stacking order; lower draws first.
	pub z_index: i32,
}

impl AtlasNode {
	pub fn is_background(&self) -> bool {
		matches!(self.kind, NodeKind::Background { .. })
	}
}

/// An undirected connection between two maps. `source <= target` always holds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AtlasEdge {
	pub id: String,
	pub source: String,
	pub target: String,
}

/// Immutable graph snapshot produced by a single build.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AtlasGraph {
	pub nodes: Vec<AtlasNode>,
	pub edges: Vec<AtlasEdge>,
}

impl AtlasGraph {
	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&AtlasNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Iterates the map nodes, skipping the background anchor.
	pub fn map_nodes(&self) -> impl Iterator<Item = &AtlasNode> {
		self.nodes.iter().filter(|n| !n.is_background())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bad_record_does_not_drop_its_neighbours() {
		let maps = parse_maps(
			r#"[
				{ "name": "A", "x": 1, "y": 1, "connected": ["C"], "score": 5 },
				{ "name": "B", "x": 2, "y": 2, "connected": ["A"], "tiers": ["x"] },
				{ "name": "C", "x": 3, "y": 3, "connected": ["A"], "tiers": [1, 2] }
			]"#,
		)
		.unwrap();
		let names: Vec<&str> = maps.iter().map(|m| m.name.as_str()).collect();
		assert_eq!(names, vec!["A", "C"]);
	}

	#[test]
	fn non_numeric_score_reads_as_absent() {
		let maps = parse_maps(
			r#"[
				{ "name": "A", "score": 5 },
				{ "name": "B", "score": "n/a" },
				{ "name": "C", "score": "7.5" },
				{ "name": "D", "score": null }
			]"#,
		)
		.unwrap();
		let scores: Vec<Option<f64>> = maps.iter().map(|m| m.score).collect();
		assert_eq!(scores, vec![Some(5.0), None, Some(7.5), None]);
	}

	#[test]
	fn payload_that_is_not_a_list_is_an_error() {
		assert!(parse_maps(r#"{ "name": "A" }"#).is_err());
	}
}
