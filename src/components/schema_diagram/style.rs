//! Visual styling for the interactive diagram.
//!
//! Graphviz decides the static look of tables and connectors. This module only
//! covers what the interaction layer adds on top: opaque node backgrounds, the
//! re-routed connectors and markers, and the state classes toggled while the
//! user selects and drags things.

use serde::{Deserialize, Serialize};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
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

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses `#RRGGBB`, `#RGB`, `rgb()`/`rgba()` and the few named colors Graphviz emits.
	pub fn parse(text: &str) -> Option<Self> {
		let text = text.trim();
		if let Some(hex) = text.strip_prefix('#') {
			let channel = |range: std::ops::Range<usize>| {
				hex.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
			};
			return match hex.len() {
				6 => Some(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
				3 => {
					let expand = |i: usize| channel(i..i + 1).map(|v| v * 17);
					Some(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
				}
				_ => None,
			};
		}
		if text.starts_with("rgb") {
			let nums: Vec<&str> = text
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.collect();
			let r = nums.first()?.trim().parse().ok()?;
			let g = nums.get(1)?.trim().parse().ok()?;
			let b = nums.get(2)?.trim().parse().ok()?;
			let a = nums
				.get(3)
				.and_then(|s| s.trim().parse().ok())
				.unwrap_or(1.0);
			return Some(Color::rgba(r, g, b, a));
		}
		match text.to_ascii_lowercase().as_str() {
			"white" => Some(Color::rgb(255, 255, 255)),
			"black" => Some(Color::rgb(0, 0, 0)),
			"red" => Some(Color::rgb(255, 0, 0)),
			"transparent" => Some(Color::rgba(0, 0, 0, 0.0)),
			_ => None,
		}
	}
}

impl TryFrom<String> for Color {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Color::parse(&value).ok_or_else(|| format!("unsupported color `{value}`"))
	}
}

impl From<Color> for String {
	fn from(color: Color) -> Self {
		color.to_css()
	}
}

/// Colors for everything the interaction layer draws or highlights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramStyle {
	/// Fill behind each node so dragged nodes hide what they pass over.
	pub node_background: Color,
	/// Stroke of re-routed connectors and fill of their arrowheads.
	pub edge: Color,
	/// Outline of selected nodes.
	pub selected: Color,
	/// Outline of the node that was clicked twice in a row.
	pub double_marked: Color,
	/// Connectors leaving the focused node.
	pub source_neighbor: Color,
	/// Connectors arriving at the focused node.
	pub target_neighbor: Color,
	/// Connector the user clicked.
	pub edge_clicked: Color,
	/// Text color of the inline error banner.
	pub error: Color,
}

impl Default for DiagramStyle {
	fn default() -> Self {
		Self {
			node_background: Color::rgb(255, 255, 255),
			edge: Color::rgb(0, 0, 0),
			selected: Color::rgb(25, 118, 210),      // #1976d2
			double_marked: Color::rgb(230, 81, 0),   // #e65100
			source_neighbor: Color::rgb(46, 125, 50), // #2e7d32
			target_neighbor: Color::rgb(198, 40, 40), // #c62828
			edge_clicked: Color::rgb(123, 31, 162),  // #7b1fa2
			error: Color::rgb(255, 0, 0),
		}
	}
}

impl DiagramStyle {
	/// CSS for the state classes, scoped to one diagram's `<svg>` element id.
	pub fn stylesheet(&self, svg_id: &str) -> String {
		let scope = format!("#{svg_id}");
		let selected = self.selected.to_css();
		let double = self.double_marked.to_css();
		let mut css = String::new();
		css.push_str(&format!("{scope} g.node {{ cursor: pointer; }}\n"));
		css.push_str(&format!("{scope} g.node.active {{ cursor: grabbing; }}\n"));
		css.push_str(&format!(
			"{scope} g.node.node-clicked .node-background {{ stroke: {selected}; stroke-width: 3; }}\n"
		));
		css.push_str(&format!(
			"{scope} g.node.node-clicked-twice .node-background {{ stroke: {double}; stroke-width: 4; }}\n"
		));
		css.push_str(&format!(
			"{scope} path.edge.edge-source-neighbor {{ stroke: {}; stroke-width: 2; }}\n",
			self.source_neighbor.to_css()
		));
		css.push_str(&format!(
			"{scope} path.edge.edge-target-neighbor {{ stroke: {}; stroke-width: 2; }}\n",
			self.target_neighbor.to_css()
		));
		css.push_str(&format!(
			"{scope} path.edge.edge-clicked {{ stroke: {}; stroke-width: 3; }}\n",
			self.edge_clicked.to_css()
		));
		css.push_str(&format!("{scope} path.edge-hitbox {{ stroke: transparent; }}\n"));
		css.push_str(&format!("{scope} text.checkbox {{ cursor: pointer; }}\n"));
		css
	}
}
