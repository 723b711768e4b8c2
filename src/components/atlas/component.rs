//! Leptos component wrapping the atlas canvas.
//!
//! The graph snapshot is a memo over the map list, the search query and the
//! display mode. A separate effect reschedules the viewport fit whenever the
//! matched set or the fullscreen flag changes. The canvas is redrawn every
//! frame via `requestAnimationFrame`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, KeyboardEvent, MouseEvent,
	WheelEvent,
};

use super::fit::{FitScheduler, fit_target};
use super::graph::{build_graph, visible_maps};
use super::prefs::{DisplayMode, LocalStore, POSSIBLE_VOIDSTONES};
use super::render;
use super::scale::AtlasConfig;
use super::search::{is_active, matched_ids};
use super::state::AtlasState;
use super::theme::AtlasTheme;
use super::types::MapEntity;

/// Surface state plus the canvas and assets it draws with.
struct AtlasContext {
	state: AtlasState,
	config: AtlasConfig,
	theme: AtlasTheme,
	canvas: HtmlCanvasElement,
	background: Option<HtmlImageElement>,
}

impl AtlasContext {
	/// Re-reads the container size and resizes the canvas to match.
	fn sync_size(&mut self) {
		let (w, h) = surface_size(&self.canvas);
		if w != self.state.width || h != self.state.height {
			self.canvas.set_width(w as u32);
			self.canvas.set_height(h as u32);
		}
		self.state.resize(w, h);
	}
}

fn surface_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0))
}

fn canvas_context(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Scrolls the page to the element carrying the clicked map's id.
fn scroll_to_element(id: &str) {
	if let Some(element) = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(id))
	{
		element.scroll_into_view();
	}
}

/// Renders the atlas map graph on a canvas with its control panel.
///
/// `maps` is the full entity list; `search` is the shared free-text query.
/// Display mode is read from and written to `localStorage`.
#[component]
pub fn AtlasCanvas(
	#[prop(into)] maps: Signal<Vec<MapEntity>>,
	#[prop(into)] search: Signal<String>,
	#[prop(optional)] config: AtlasConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let display = RwSignal::new(DisplayMode::load(&LocalStore));
	let full = RwSignal::new(false);

	let visible = Memo::new(move |_| {
		maps.with(|m| visible_maps(m).into_iter().cloned().collect::<Vec<_>>())
	});
	let matched = Memo::new(move |_| visible.with(|v| search.with(|q| matched_ids(v, q))));
	let query_active = Memo::new(move |_| search.with(|q| is_active(q)));
	let graph_config = config.clone();
	let graph = Memo::new(move |_| {
		let graph = maps.with(|m| {
			matched.with(|set| {
				build_graph(m, set, query_active.get(), display.get(), &graph_config)
			})
		});
		debug!(
			"atlas: built {} nodes, {} edges",
			graph.nodes.len(),
			graph.edges.len()
		);
		graph
	});

	Effect::new(move |_| {
		if let Err(e) = display.get().save(&LocalStore) {
			warn!("atlas: failed to persist display mode: {}", e);
		}
	});

	let context: Rc<RefCell<Option<AtlasContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let running = Rc::new(Cell::new(true));
	let (context_init, animate_init, resize_cb_init, running_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		running.clone(),
	);
	let init_config = config.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas_context(&canvas) else {
			warn!("atlas: 2d canvas context unavailable");
			return;
		};

		let (w, h) = surface_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let background = HtmlImageElement::new().ok().inspect(|img| {
			img.set_src(&init_config.background_image);
		});

		let mut state = AtlasState::new(graph.get_untracked(), w, h, init_config.clone());
		state.request_fit(fit_target(&matched.get_untracked()));
		*context_init.borrow_mut() = Some(AtlasContext {
			state,
			config: init_config.clone(),
			theme: AtlasTheme::default(),
			canvas,
			background,
		});
		info!("atlas: surface initialized at {}x{}", w, h);

		let context_resize = context_init.clone();
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_resize.borrow_mut() {
				c.sync_size();
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner, running_anim) = (
			context_init.clone(),
			animate_init.clone(),
			running_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !running_anim.get() {
				return;
			}
			if let Some(ref c) = *context_anim.borrow() {
				render::render(&c.state, &ctx, &c.config, &c.theme, c.background.as_ref());
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_graph = context.clone();
	Effect::new(move |_| {
		let graph = graph.get();
		if let Some(ref mut c) = *context_graph.borrow_mut() {
			c.state.set_graph(graph);
		}
	});

	let scheduler = StoredValue::new_local(FitScheduler::default());
	let context_fit = context.clone();
	let fit_delay = config.fit_delay_ms;
	Effect::new(move |_| {
		let target = fit_target(&matched.get());
		full.track();
		let context_task = context_fit.clone();
		scheduler.try_update_value(|s| {
			s.schedule(fit_delay, move || {
				if let Some(ref mut c) = *context_task.borrow_mut() {
					c.sync_size();
					c.state.request_fit(target);
				}
			})
		});
	});

	let keydown = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
		if ev.key() == "Escape" && full.get_untracked() {
			full.set(false);
		}
	});

	let teardown = StoredValue::new_local((running, resize_cb));
	on_cleanup(move || {
		scheduler.try_update_value(|s| s.cancel());
		teardown.try_with_value(|(running, resize_cb)| {
			running.set(false);
			if let (Some(cb), Some(win)) = (&*resize_cb.borrow(), web_sys::window()) {
				let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		});
		keydown.remove();
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.begin_pan(x, y);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.update_pan(x, y);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let clicked = {
			let mut guard = context_mu.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			if !c.state.end_pan() {
				return;
			}
			local_position(canvas_ref, &ev)
				.and_then(|(x, y)| c.state.node_at_position(x, y).map(str::to_string))
		};
		if let Some(id) = clicked {
			scroll_to_element(&id);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.end_pan();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		if !full.get_untracked() {
			return;
		}
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.state.zoom_at(x, y, factor);
		}
	};

	let context_reset = context.clone();
	let on_reset = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_reset.borrow_mut() {
			c.state.request_fit(fit_target(&matched.get_untracked()));
		}
	};

	view! {
		<div
			class="d-none d-md-block atlas"
			style=move || {
				format!(
					"position: relative; width: 100%; height: {}; background-color: black;",
					if full.get() { "100vh" } else { "50vh" },
				)
			}
		>
			<canvas
				node_ref=canvas_ref
				class="atlas-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div
				class="card bg-light text-dark"
				style="position: absolute; left: 8px; bottom: 8px;"
			>
				<div class="card-body p-1">
					<i class="fa-solid fa-fw fa-gem" title="Voidstones" />
					" "
					<div class="btn-group" role="group">
						{POSSIBLE_VOIDSTONES
							.iter()
							.map(|&v| {
								view! {
									<button
										class=move || {
											if display.get().voidstones == v {
												"btn btn-dark"
											} else {
												"btn text-secondary btn-outline-dark"
											}
										}
										on:click=move |_| display.update(|d| d.voidstones = v)
									>
										{v}
									</button>
								}
							})
							.collect_view()}
					</div>
				</div>
			</div>
			<div
				class="btn-group-vertical"
				style="position: absolute; right: 8px; bottom: 8px;"
			>
				<button class="btn btn-light" title="Reset position" on:click=on_reset>
					<i class="fa-solid fa-fw fa-refresh" />
				</button>
				<button
					class="btn btn-light"
					title="Score heatmap"
					on:click=move |_| display.update(|d| d.score_heatmap = !d.score_heatmap)
				>
					<i
						class="fa-solid fa-fw fa-sack-dollar"
						style=move || {
							if display.get().score_heatmap { "color: green" } else { "color: black" }
						}
					/>
				</button>
				<button class="btn btn-light" title="Fullscreen" on:click=move |_| full.update(|f| *f = !*f)>
					<i class=move || {
						if full.get() { "fa-solid fa-fw fa-minimize" } else { "fa-solid fa-fw fa-expand" }
					} />
				</button>
			</div>
		</div>
	}
}
