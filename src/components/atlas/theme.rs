//! Color encoding for atlas nodes.
//!
//! Nodes carry a [`ColorClass`] rather than a raw color; the renderer resolves
//! it to a canvas [`Color`].

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Color classes used to encode tier or score on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorClass {
	Danger,
	Orange,
	Warning,
	Lime,
	Success,
	Light,
	Purple,
	/// No usable tier or score data.
	Secondary,
}

impl ColorClass {
	/// Canvas color for this class.
	pub fn color(self) -> Color {
		match self {
			ColorClass::Danger => Color::rgb(220, 53, 69),
			ColorClass::Orange => Color::rgb(253, 126, 20),
			ColorClass::Warning => Color::rgb(255, 193, 7),
			ColorClass::Lime => Color::rgb(163, 207, 60),
			ColorClass::Success => Color::rgb(25, 135, 84),
			ColorClass::Light => Color::rgb(248, 249, 250),
			ColorClass::Purple => Color::rgb(163, 113, 247),
			ColorClass::Secondary => Color::rgb(108, 117, 125),
		}
	}
}

/// Graduated rating color for a score in `0..=max`, worst to best.
///
/// Scores outside the range are clamped; a non-finite score or a
/// non-positive `max` has no rating.
pub fn rating_color(score: f64, max: f64) -> ColorClass {
	if !score.is_finite() || max <= 0.0 {
		return ColorClass::Secondary;
	}
	let ratio = (score / max).clamp(0.0, 1.0);
	if ratio >= 0.8 {
		ColorClass::Success
	} else if ratio >= 0.6 {
		ColorClass::Lime
	} else if ratio >= 0.4 {
		ColorClass::Warning
	} else if ratio >= 0.2 {
		ColorClass::Orange
	} else {
		ColorClass::Danger
	}
}

/// Tier band color: white maps, yellow maps, red maps, then anything above.
pub fn tier_color(tier: u32) -> ColorClass {
	match tier {
		0 => ColorClass::Secondary,
		1..=5 => ColorClass::Light,
		6..=10 => ColorClass::Warning,
		11..=16 => ColorClass::Danger,
		_ => ColorClass::Purple,
	}
}

/// Colors for the parts of the atlas that are not map-specific.
#[derive(Clone, Debug)]
pub struct AtlasTheme {
	/// Canvas fill behind the background image.
	pub background: Color,
	pub edge: Color,
	pub edge_width: f64,
	pub node_fill: Color,
	pub node_border: Color,
}

impl Default for AtlasTheme {
	fn default() -> Self {
		Self {
			background: Color::rgb(0, 0, 0),
			edge: Color::rgb(177, 177, 183).with_alpha(0.8),
			edge_width: 1.0,
			node_fill: Color::rgb(33, 37, 41),
			node_border: Color::rgb(33, 37, 41).lighten(0.2),
		}
	}
}
