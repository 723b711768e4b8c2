//! Rendering-surface state: the current snapshot, view transform and
//! pan tracking.
//!
//! A fit requested before the canvas has a size is held back and applied by
//! the first resize that gives the surface a non-zero area.

use super::fit::{FitTarget, fit_bounds, fit_transform};
use super::scale::AtlasConfig;
use super::types::{AtlasGraph, NodeKind};

/// Pan and zoom transform applied to the entire atlas view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	/// Set once the pointer moved far enough to count as a drag, not a click.
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Pointer travel in pixels below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

/// Wheel zoom bounds, independent of the fit zoom range.
const ZOOM_LIMITS: (f64, f64) = (0.1, 10.0);

/// Surface state mutated by input handlers and read by the renderer.
pub struct AtlasState {
	pub graph: AtlasGraph,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pending_fit: Option<FitTarget>,
	config: AtlasConfig,
}

impl AtlasState {
	pub fn new(graph: AtlasGraph, width: f64, height: f64, config: AtlasConfig) -> Self {
		Self {
			graph,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			width,
			height,
			pending_fit: None,
			config,
		}
	}

	/// Whether the surface can be fitted yet.
	pub fn is_ready(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}

	/// Replaces the snapshot. The view transform is left untouched.
	pub fn set_graph(&mut self, graph: AtlasGraph) {
		self.graph = graph;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		if self.is_ready() {
			if let Some(target) = self.pending_fit.take() {
				self.apply_fit(&target);
			}
		}
	}

	/// Fits the view to `target` now, or once the surface is ready.
	pub fn request_fit(&mut self, target: FitTarget) {
		if self.is_ready() {
			self.pending_fit = None;
			self.apply_fit(&target);
		} else {
			self.pending_fit = Some(target);
		}
	}

	fn apply_fit(&mut self, target: &FitTarget) {
		let bounds = fit_bounds(&self.graph, target, &self.config)
			.or_else(|| fit_bounds(&self.graph, &FitTarget::All, &self.config));
		if let Some(bounds) = bounds {
			self.transform = fit_transform(bounds, self.width, self.height, &self.config);
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Id of the topmost map node under a screen position. The background
	/// anchor is never returned.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&str> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.graph
			.nodes
			.iter()
			.rev()
			.filter(|n| matches!(n.kind, NodeKind::Map))
			.find(|n| {
				let (w, h) = self.config.node_size(&n.label);
				(gx - n.position.x).abs() <= w / 2.0 && (gy - n.position.y).abs() <= h / 2.0
			})
			.map(|n| n.id.as_str())
	}

	/// Zooms by `factor` keeping the point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(ZOOM_LIMITS.0, ZOOM_LIMITS.1);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn update_pan(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		if dx.abs() > CLICK_SLOP || dy.abs() > CLICK_SLOP {
			self.pan.moved = true;
		}
		self.transform.x = self.pan.transform_start_x + dx;
		self.transform.y = self.pan.transform_start_y + dy;
	}

	/// Ends the pan. Returns true when the press never turned into a drag.
	pub fn end_pan(&mut self) -> bool {
		let was_click = self.pan.active && !self.pan.moved;
		self.pan.active = false;
		self.pan.moved = false;
		was_click
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use super::*;
	use crate::components::atlas::graph::{BACKGROUND_ID, build_graph};
	use crate::components::atlas::prefs::DisplayMode;
	use crate::components::atlas::types::MapEntity;

	fn graph(config: &AtlasConfig) -> AtlasGraph {
		let maps = vec![
			MapEntity {
				name: "Pit".into(),
				x: 40.0,
				y: 40.0,
				connected: vec!["Dunes".into()],
				tiers: vec![1],
				..Default::default()
			},
			MapEntity {
				name: "Dunes".into(),
				x: 200.0,
				y: 120.0,
				connected: vec!["Pit".into()],
				tiers: vec![2],
				..Default::default()
			},
		];
		build_graph(&maps, &BTreeSet::new(), false, DisplayMode::default(), config)
	}

	#[test]
	fn fit_waits_for_a_sized_surface() {
		let config = AtlasConfig::default();
		let mut state = AtlasState::new(graph(&config), 0.0, 0.0, config);
		state.request_fit(FitTarget::Nodes(vec!["Pit".into()]));
		assert_eq!(state.transform, ViewTransform::default());

		state.resize(800.0, 400.0);
		let (x, y) = state.screen_to_graph(400.0, 200.0);
		let pit = state.graph.node("Pit").unwrap().position;
		assert!((x - pit.x).abs() < 1e-6);
		assert!((y - pit.y).abs() < 1e-6);
	}

	#[test]
	fn unknown_fit_target_falls_back_to_everything() {
		let config = AtlasConfig::default();
		let mut all = AtlasState::new(graph(&config), 800.0, 400.0, config.clone());
		all.request_fit(FitTarget::All);
		let mut missing = AtlasState::new(graph(&config), 800.0, 400.0, config);
		missing.request_fit(FitTarget::Nodes(vec!["Nowhere".into()]));
		assert_eq!(all.transform, missing.transform);
	}

	#[test]
	fn hit_testing_skips_the_background() {
		let config = AtlasConfig::default();
		let state = AtlasState::new(graph(&config), 800.0, 400.0, config);
		let pit = state.graph.node("Pit").unwrap().position;
		assert_eq!(state.node_at_position(pit.x, pit.y), Some("Pit"));
		assert_eq!(state.node_at_position(5.0, 5.0), None);
		assert!(state.graph.node(BACKGROUND_ID).is_some());
	}

	#[test]
	fn short_press_is_a_click_and_drag_is_not() {
		let config = AtlasConfig::default();
		let mut state = AtlasState::new(graph(&config), 800.0, 400.0, config);
		state.begin_pan(10.0, 10.0);
		state.update_pan(11.0, 10.0);
		assert!(state.end_pan());

		let start = state.transform.clone();
		state.begin_pan(10.0, 10.0);
		state.update_pan(60.0, 30.0);
		assert!(!state.end_pan());
		assert_eq!(state.transform.x, start.x + 50.0);
		assert_eq!(state.transform.y, start.y + 20.0);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let config = AtlasConfig::default();
		let mut state = AtlasState::new(graph(&config), 800.0, 400.0, config);
		let before = state.screen_to_graph(300.0, 100.0);
		state.zoom_at(300.0, 100.0, 1.1);
		let after = state.screen_to_graph(300.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}
}
