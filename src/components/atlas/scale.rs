//! Atlas layout configuration and the source-to-pixel coordinate transform.
//!
//! # Coordinate Spaces
//!
//! - **Source units**: the `x`/`y` values carried by each map entity.
//! - **Atlas space**: pixels on the scaled background image. A map at source
//!   position `(x, y)` sits at `(x * scale + offset, y * scale + offset)`.
//! - **Screen space**: canvas pixels, reached from atlas space through the
//!   view transform (pan and zoom).
//!
//! `scale` and `offset` must stay consistent with the background image's
//! declared pixel dimensions, since both are scaled by the same factor.

use serde::Deserialize;

use super::types::Point;

/// Layout, fit and visual constants for the atlas.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtlasConfig {
	/// Source-unit to atlas-pixel multiplier.
	pub scale: f64,
	/// Atlas-pixel offset added after scaling.
	pub offset: f64,
	/// Declared width of the background image, before scaling.
	pub background_width: f64,
	/// Declared height of the background image, before scaling.
	pub background_height: f64,
	/// URL of the background image.
	pub background_image: String,
	/// Settle delay before a scheduled fit runs, in milliseconds.
	pub fit_delay_ms: i32,
	/// Fraction of the fitted region added as margin on each side.
	pub fit_padding: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Opacity of nodes that do not match an active query.
	pub dimmed_opacity: f64,
	/// Approximate label glyph width in atlas pixels.
	pub node_char_width: f64,
	pub node_height: f64,
	/// Horizontal padding inside a node box, per side.
	pub node_padding: f64,
	/// Highest score on the rating scale.
	pub score_max: f64,
}

impl Default for AtlasConfig {
	fn default() -> Self {
		Self {
			scale: 2.5,
			offset: 6.0,
			background_width: 1003.52,
			background_height: 564.48,
			background_image: "/atlas.webp".to_string(),
			fit_delay_ms: 150,
			fit_padding: 0.1,
			min_zoom: 0.5,
			max_zoom: 2.0,
			dimmed_opacity: 0.4,
			node_char_width: 7.0,
			node_height: 24.0,
			node_padding: 8.0,
			score_max: 10.0,
		}
	}
}

impl AtlasConfig {
	/// Source units to atlas pixels.
	pub fn to_screen(&self, x: f64, y: f64) -> Point {
		Point {
			x: x * self.scale + self.offset,
			y: y * self.scale + self.offset,
		}
	}

	/// Size of the background image in atlas pixels.
	pub fn background_size(&self) -> (f64, f64) {
		(
			self.background_width * self.scale,
			self.background_height * self.scale,
		)
	}

	/// Estimated box size of a map node carrying `label`.
	pub fn node_size(&self, label: &str) -> (f64, f64) {
		let chars = label.chars().count() as f64;
		(
			chars * self.node_char_width + 2.0 * self.node_padding,
			self.node_height,
		)
	}
}
