//! Persisted display preferences: color mode and voidstone level.
//!
//! The graph builder only ever receives a [`DisplayMode`] value; loading and
//! saving go through a [`PreferenceStore`] so the browser's `localStorage`
//! can be swapped for an in-memory map.

use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;
use serde_json::Value;
use thiserror::Error;

/// Storage key of the heatmap flag.
pub const SCORE_HEATMAP_KEY: &str = "scoreHeatmap";
/// Storage key of the voidstone level.
pub const VOIDSTONES_KEY: &str = "voidstones";
/// Voidstone levels selectable from the atlas panel.
pub const POSSIBLE_VOIDSTONES: [u8; 5] = [0, 1, 2, 3, 4];

#[derive(Error, Debug)]
pub enum PrefsError {
	#[error("preference storage unavailable")]
	Unavailable,

	#[error("storage access failed: {0}")]
	Storage(String),

	#[error("malformed preference value: {0}")]
	Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrefsError>;

/// Key/value persistence for raw JSON preference values.
pub trait PreferenceStore {
	fn load(&self, key: &str) -> Result<Option<String>>;
	fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Browser `localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStore;

impl LocalStore {
	fn storage() -> Result<web_sys::Storage> {
		web_sys::window()
			.ok_or(PrefsError::Unavailable)?
			.local_storage()
			.map_err(|e| PrefsError::Storage(format!("{e:?}")))?
			.ok_or(PrefsError::Unavailable)
	}
}

impl PreferenceStore for LocalStore {
	fn load(&self, key: &str) -> Result<Option<String>> {
		Self::storage()?
			.get_item(key)
			.map_err(|e| PrefsError::Storage(format!("{e:?}")))
	}

	fn save(&self, key: &str, value: &str) -> Result<()> {
		Self::storage()?
			.set_item(key, value)
			.map_err(|e| PrefsError::Storage(format!("{e:?}")))
	}
}

/// In-memory store, for tests and hosts without `localStorage`.
#[derive(Debug, Default)]
pub struct MemoryStore {
	values: RefCell<HashMap<String, String>>,
}

impl PreferenceStore for MemoryStore {
	fn load(&self, key: &str) -> Result<Option<String>> {
		Ok(self.values.borrow().get(key).cloned())
	}

	fn save(&self, key: &str, value: &str) -> Result<()> {
		self.values
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}
}

/// Current display mode, injected into every graph build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayMode {
	/// Color and label by market score instead of tier.
	pub score_heatmap: bool,
	/// Index into each map's tier list.
	pub voidstones: u8,
}

impl DisplayMode {
	/// Reads both preferences, falling back to defaults for anything
	/// missing, unreadable or out of range.
	pub fn load(store: &impl PreferenceStore) -> Self {
		let defaults = Self::default();
		let score_heatmap = match read_value(store, SCORE_HEATMAP_KEY) {
			Ok(Some(Value::Bool(b))) => b,
			Ok(None) => defaults.score_heatmap,
			Ok(Some(other)) => {
				warn!("atlas: ignoring stored {}={}", SCORE_HEATMAP_KEY, other);
				defaults.score_heatmap
			}
			Err(e) => {
				warn!("atlas: cannot read {}: {}", SCORE_HEATMAP_KEY, e);
				defaults.score_heatmap
			}
		};
		let voidstones = match read_value(store, VOIDSTONES_KEY) {
			Ok(Some(value)) => parse_voidstones(&value).unwrap_or_else(|| {
				warn!("atlas: ignoring stored {}={}", VOIDSTONES_KEY, value);
				defaults.voidstones
			}),
			Ok(None) => defaults.voidstones,
			Err(e) => {
				warn!("atlas: cannot read {}: {}", VOIDSTONES_KEY, e);
				defaults.voidstones
			}
		};
		Self {
			score_heatmap,
			voidstones,
		}
	}

	/// Writes both preferences as JSON values.
	pub fn save(&self, store: &impl PreferenceStore) -> Result<()> {
		store.save(
			SCORE_HEATMAP_KEY,
			&serde_json::to_string(&self.score_heatmap)?,
		)?;
		store.save(VOIDSTONES_KEY, &serde_json::to_string(&self.voidstones)?)
	}
}

fn read_value(store: &impl PreferenceStore, key: &str) -> Result<Option<Value>> {
	match store.load(key)? {
		Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
		None => Ok(None),
	}
}

/// Accepts `2` as well as `"2"`; rejects levels the panel cannot select.
fn parse_voidstones(value: &Value) -> Option<u8> {
	let level = match value {
		Value::Number(n) => n.as_u64()?,
		Value::String(s) => s.trim().parse().ok()?,
		_ => return None,
	};
	let level = u8::try_from(level).ok()?;
	POSSIBLE_VOIDSTONES.contains(&level).then_some(level)
}
