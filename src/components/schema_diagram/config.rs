//! Tunable constants of the interactive diagram.
//!
//! Every number the connector router, the viewport and the exporter depend on
//! lives here with its default. Hosts can override any subset by passing JSON;
//! missing fields keep their defaults.
//!
//! # Coordinate Spaces
//!
//! - **Local units**: the coordinate system of Graphviz's `g.graph` group. Node
//!   translations, bounding boxes and connector geometry are expressed here.
//! - **User units**: the `<svg>` viewBox coordinate system (local units passed
//!   through the graph group's transform).
//! - **Screen pixels**: client coordinates reported by pointer events.

use serde::{Deserialize, Serialize};

use super::style::DiagramStyle;

/// Connector routing and hit-testing parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeConfig {
	/// Horizontal distance between a node side and the first spline control point.
	pub pad: f64,
	/// The drawing width is split into this many zones; the outermost zone on each
	/// side counts as "close to the boundary" when picking a routing side.
	pub boundary_ratio: f64,
	/// Fraction of a table row's height where a connector leaves the source row.
	pub source_row_ratio: f64,
	/// Fraction of a table row's height where a connector enters the target row.
	pub target_row_ratio: f64,
	/// Stroke width of the visible connector.
	pub stroke_width: f64,
	/// Stroke width of the invisible hitbox duplicated behind each connector.
	pub hitbox_width: f64,
	/// Arrowhead marker size in user units.
	pub marker_size: f64,
}

impl Default for EdgeConfig {
	fn default() -> Self {
		Self {
			pad: 20.0,
			boundary_ratio: 10.0,
			source_row_ratio: 0.75,
			target_row_ratio: 0.45,
			stroke_width: 1.0,
			hitbox_width: 15.0,
			marker_size: 12.0,
		}
	}
}

/// Pan, zoom and fitting parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
	/// Multiplicative zoom step for one wheel notch towards the user.
	pub zoom_in: f64,
	/// Multiplicative zoom step for one wheel notch away from the user.
	pub zoom_out: f64,
	/// Margin around the content when fitting the viewBox.
	pub fit_padding: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			zoom_in: 1.25,
			zoom_out: 0.8,
			fit_padding: 20.0,
		}
	}
}

/// Export naming.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
	/// Used when the host gives no usable document name.
	pub document_name: String,
	/// How long the download's object URL stays valid after the click.
	pub revoke_delay_ms: i32,
}

impl Default for ExportConfig {
	fn default() -> Self {
		Self {
			document_name: "schema".to_string(),
			revoke_delay_ms: 1000,
		}
	}
}

/// Complete configuration for one mounted diagram.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramConfig {
	pub edge: EdgeConfig,
	pub viewport: ViewportConfig,
	pub export: ExportConfig,
	pub style: DiagramStyle,
}

impl DiagramConfig {
	/// Parse a (possibly partial) JSON override.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}
