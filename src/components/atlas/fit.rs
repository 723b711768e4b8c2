//! Viewport fitting: what region to fit, how to reach it, and when.
//!
//! A fit is requested whenever the matched set changes or the surface is
//! resized. Requests are debounced by a settle delay; a newer request always
//! supersedes an older one that has not fired yet.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::scale::AtlasConfig;
use super::state::ViewTransform;
use super::types::{AtlasGraph, NodeKind};

/// Region the viewport should be fitted to.
#[derive(Clone, Debug, PartialEq)]
pub enum FitTarget {
	/// Every node, background included.
	All,
	/// Only the listed node ids.
	Nodes(Vec<String>),
}

/// Fit target for the current matched set. An empty set means fit all.
pub fn fit_target(matched: &BTreeSet<String>) -> FitTarget {
	if matched.is_empty() {
		FitTarget::All
	} else {
		FitTarget::Nodes(matched.iter().cloned().collect())
	}
}

/// Axis-aligned rectangle in atlas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Rect {
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn center(&self) -> (f64, f64) {
		(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}

	fn union(self, other: Rect) -> Rect {
		Rect {
			min_x: self.min_x.min(other.min_x),
			min_y: self.min_y.min(other.min_y),
			max_x: self.max_x.max(other.max_x),
			max_y: self.max_y.max(other.max_y),
		}
	}
}

/// Bounding box of the targeted nodes. `None` when no targeted id is present
/// in the graph, in which case the caller falls back to fitting everything.
pub fn fit_bounds(graph: &AtlasGraph, target: &FitTarget, config: &AtlasConfig) -> Option<Rect> {
	let wanted = |id: &str| match target {
		FitTarget::All => true,
		FitTarget::Nodes(ids) => ids.iter().any(|i| i == id),
	};
	graph
		.nodes
		.iter()
		.filter(|n| wanted(&n.id))
		.map(|n| match &n.kind {
			NodeKind::Background { width, height, .. } => Rect {
				min_x: n.position.x,
				min_y: n.position.y,
				max_x: n.position.x + width,
				max_y: n.position.y + height,
			},
			NodeKind::Map => {
				let (w, h) = config.node_size(&n.label);
				Rect {
					min_x: n.position.x - w / 2.0,
					min_y: n.position.y - h / 2.0,
					max_x: n.position.x + w / 2.0,
					max_y: n.position.y + h / 2.0,
				}
			}
		})
		.reduce(Rect::union)
}

/// View transform that centers `bounds` on a `width` x `height` surface with
/// the configured padding, zoom clamped to the configured range.
pub fn fit_transform(bounds: Rect, width: f64, height: f64, config: &AtlasConfig) -> ViewTransform {
	let pad = 1.0 + 2.0 * config.fit_padding;
	let zoom_x = width / (bounds.width() * pad);
	let zoom_y = height / (bounds.height() * pad);
	let k = zoom_x
		.min(zoom_y)
		.min(config.max_zoom)
		.max(config.min_zoom);
	let (cx, cy) = bounds.center();
	ViewTransform {
		x: width / 2.0 - cx * k,
		y: height / 2.0 - cy * k,
		k,
	}
}

/// Monotonic fit generation. Starting a new generation invalidates all
/// earlier ones; clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct FitGeneration {
	current: Rc<Cell<u64>>,
}

impl FitGeneration {
	/// Starts a new generation and returns its number.
	pub fn advance(&self) -> u64 {
		let next = self.current.get() + 1;
		self.current.set(next);
		next
	}

	pub fn is_current(&self, generation: u64) -> bool {
		self.current.get() == generation
	}

	/// Starts a new generation and wraps `task` so it only runs while that
	/// generation is still current.
	pub fn guard(&self, task: impl FnOnce() + 'static) -> impl FnOnce() + 'static {
		let generation = self.clone();
		let id = generation.advance();
		move || {
			if generation.is_current(id) {
				task();
			}
		}
	}
}

/// Runs a deferred fit through the browser's `setTimeout`.
#[derive(Default)]
pub struct FitScheduler {
	generation: FitGeneration,
	pending: Option<(i32, Closure<dyn FnMut()>)>,
}

impl FitScheduler {
	/// Schedules `task` after `delay_ms`, superseding any pending fit.
	pub fn schedule(&mut self, delay_ms: i32, task: impl FnOnce() + 'static) {
		self.cancel();
		let Some(window) = web_sys::window() else {
			return;
		};

		let callback = Closure::once(self.generation.guard(task));
		match window.set_timeout_with_callback_and_timeout_and_arguments_0(
			callback.as_ref().unchecked_ref::<js_sys::Function>(),
			delay_ms,
		) {
			Ok(handle) => self.pending = Some((handle, callback)),
			Err(e) => log::warn!("atlas: failed to schedule fit: {:?}", e),
		}
	}

	/// Drops the pending fit, if any.
	pub fn cancel(&mut self) {
		self.generation.advance();
		if let Some((handle, _callback)) = self.pending.take() {
			if let Some(window) = web_sys::window() {
				window.clear_timeout_with_handle(handle);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::atlas::graph::build_graph;
	use crate::components::atlas::prefs::DisplayMode;
	use crate::components::atlas::types::MapEntity;

	fn maps() -> Vec<MapEntity> {
		vec![
			MapEntity {
				name: "A".into(),
				x: 10.0,
				y: 10.0,
				connected: vec!["B".into()],
				tiers: vec![1],
				..Default::default()
			},
			MapEntity {
				name: "B".into(),
				x: 100.0,
				y: 50.0,
				connected: vec!["A".into()],
				tiers: vec![1],
				..Default::default()
			},
		]
	}

	#[test]
	fn empty_match_set_fits_all() {
		assert_eq!(fit_target(&BTreeSet::new()), FitTarget::All);
		let matched: BTreeSet<String> = ["B".to_string(), "A".to_string()].into();
		assert_eq!(
			fit_target(&matched),
			FitTarget::Nodes(vec!["A".into(), "B".into()])
		);
	}

	#[test]
	fn fit_all_covers_the_background() {
		let config = AtlasConfig::default();
		let graph = build_graph(&maps(), &BTreeSet::new(), false, DisplayMode::default(), &config);
		let bounds = fit_bounds(&graph, &FitTarget::All, &config).unwrap();
		let (w, h) = config.background_size();
		assert_eq!(bounds.min_x, 0.0);
		assert_eq!(bounds.min_y, 0.0);
		assert_eq!(bounds.max_x, w);
		assert_eq!(bounds.max_y, h);
	}

	#[test]
	fn node_bounds_surround_matched_nodes_only() {
		let config = AtlasConfig::default();
		let graph = build_graph(&maps(), &BTreeSet::new(), false, DisplayMode::default(), &config);
		let bounds = fit_bounds(&graph, &FitTarget::Nodes(vec!["A".into()]), &config).unwrap();
		let a = graph.node("A").unwrap().position;
		assert_eq!(bounds.center(), (a.x, a.y));
		assert_eq!(bounds.height(), config.node_height);

		assert!(fit_bounds(&graph, &FitTarget::Nodes(vec!["Z".into()]), &config).is_none());
	}

	#[test]
	fn transform_centers_and_clamps_zoom() {
		let config = AtlasConfig::default();
		let bounds = Rect {
			min_x: 0.0,
			min_y: 0.0,
			max_x: 1000.0,
			max_y: 500.0,
		};
		let t = fit_transform(bounds, 1200.0, 600.0, &config);
		assert!((t.k - 1.0).abs() < 1e-9);
		assert!((t.x - 100.0).abs() < 1e-9);
		assert!((t.y - 50.0).abs() < 1e-9);

		let tiny = Rect {
			min_x: 10.0,
			min_y: 10.0,
			max_x: 20.0,
			max_y: 20.0,
		};
		assert_eq!(fit_transform(tiny, 1200.0, 600.0, &config).k, config.max_zoom);
	}

	#[test]
	fn stale_guarded_task_does_nothing() {
		let generation = FitGeneration::default();
		let runs = Rc::new(Cell::new(0));

		let counter = runs.clone();
		let stale = generation.guard(move || counter.set(counter.get() + 1));
		let counter = runs.clone();
		let fresh = generation.guard(move || counter.set(counter.get() + 10));
		stale();
		assert_eq!(runs.get(), 0);
		fresh();
		assert_eq!(runs.get(), 10);
	}

	#[test]
	fn cancelled_guarded_task_does_nothing() {
		let generation = FitGeneration::default();
		let ran = Rc::new(Cell::new(false));
		let flag = ran.clone();
		let task = generation.guard(move || flag.set(true));
		generation.advance();
		task();
		assert!(!ran.get());
	}

	#[test]
	fn newer_generation_supersedes_older() {
		let generation = FitGeneration::default();
		let first = generation.advance();
		assert!(generation.is_current(first));
		let shared = generation.clone();
		let second = shared.advance();
		assert!(!generation.is_current(first));
		assert!(generation.is_current(second));
	}
}
