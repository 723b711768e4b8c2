//! atlas-view: Interactive atlas map graph for the economy dashboard.
//!
//! This crate provides a WASM-based atlas component that lays map entities
//! over the atlas background, highlights maps matching the search query,
//! colors them by tier or market score, and keeps the viewport fitted to the
//! current matches.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::atlas::{AtlasCanvas, AtlasConfig, AtlasGraph, MapEntity, parse_maps};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("atlas-view: logging initialized");
}

/// Read the text body of the script element with the given id.
fn load_script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Read and parse the JSON body of the script element with the given id.
fn load_script_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let json_text = load_script_text(id)?;
	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("atlas-view: failed to parse #{}: {}", id, e);
			None
		}
	}
}

/// Load map entities from a script element with id="atlas-data".
/// Expected format: a JSON array of map objects. Unreadable records are
/// skipped individually.
fn load_maps() -> Vec<MapEntity> {
	let maps = match load_script_text("atlas-data").map(|text| parse_maps(&text)) {
		Some(Ok(maps)) => maps,
		Some(Err(e)) => {
			warn!("atlas-view: failed to parse #atlas-data: {}", e);
			Vec::new()
		}
		None => Vec::new(),
	};
	info!("atlas-view: loaded {} maps", maps.len());
	maps
}

/// Main application component.
/// Loads map data and optional layout overrides from the DOM and renders the
/// atlas with a search box.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let maps = load_maps();
	let config: AtlasConfig = load_script_json("atlas-config").unwrap_or_default();
	let (search, set_search) = signal(String::new());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-bs-theme="dark" />
		<Title text="Atlas" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="container-fluid p-2">
			<input
				class="form-control mb-2"
				type="search"
				placeholder="Search maps"
				prop:value=search
				on:input=move |ev| set_search.set(event_target_value(&ev))
			/>
			<AtlasCanvas maps=maps search=search config=config />
		</div>
	}
}
