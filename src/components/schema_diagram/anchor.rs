//! Connector anchoring and side choice.
//!
//! Graphviz bakes every edge into one fixed path. To keep connectors attached
//! while nodes move, each end is reduced once to an [`EndAnchor`]: the node's
//! left and right edge plus a vertical offset, all in the node's own local
//! coordinates. Moving a node only adds its translation back in, so an edge
//! drawn against a table row keeps pointing at that row no matter how often
//! the node is dragged.

use super::config::EdgeConfig;
use super::geometry::{Point, Translate};
use super::path::{centroid, endpoints};
use super::static_svg::StaticNode;

/// One connector end, relative to the un-translated node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EndAnchor {
	pub left_x: f64,
	pub right_x: f64,
	pub offset_y: f64,
}

impl EndAnchor {
	fn at(self, t: Translate) -> (f64, f64, f64) {
		(self.left_x + t.dx, self.right_x + t.dx, self.offset_y + t.dy)
	}
}

/// Which ends carry an arrowhead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Markers {
	pub start: bool,
	pub end: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorSpec {
	pub source: EndAnchor,
	pub target: EndAnchor,
	pub markers: Markers,
}

/// Horizontal extent of the drawing, captured once when the diagram is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawingSpan {
	pub min_x: f64,
	pub width: f64,
}

/// Result of [`choose_edge_x`]: attachment X per end and the X of the
/// spline's inner control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeChoice {
	pub source_x: f64,
	pub target_x: f64,
	pub source_pad_x: f64,
	pub target_pad_x: f64,
}

/// Pick the node sides a connector leaves from and arrives at.
///
/// `source` and `target` are `(left, right)` edges in the same coordinate
/// space as `span`. Pure: identical inputs always give identical output.
pub fn choose_edge_x(
	source: (f64, f64),
	target: (f64, f64),
	span: DrawingSpan,
	config: &EdgeConfig,
) -> EdgeChoice {
	let (source_left, source_right) = source;
	let (target_left, target_right) = target;
	let pad = config.pad;

	if target_right + pad < source_left {
		return EdgeChoice {
			source_x: source_left,
			target_x: target_right,
			source_pad_x: source_left - pad,
			target_pad_x: target_right + pad,
		};
	}
	if source_right + pad < target_left {
		return EdgeChoice {
			source_x: source_right,
			target_x: target_left,
			source_pad_x: source_right + pad,
			target_pad_x: target_left - pad,
		};
	}

	// Horizontally overlapping: go around the outside, preferring the drawing's border.
	let ratio = if config.boundary_ratio > 1.0 { config.boundary_ratio } else { 10.0 };
	let zone = span.width / ratio;
	let near_left = source_left <= span.min_x + zone || target_left <= span.min_x + zone;
	let near_right = source_right >= span.min_x + (ratio - 1.0) * zone
		|| target_right >= span.min_x + (ratio - 1.0) * zone;

	let use_left = if near_left {
		true
	} else if near_right {
		false
	} else {
		(target_left - source_left).abs() < (target_right - source_right).abs()
	};

	if use_left {
		let shared = source_left.min(target_left) - 2.0 * pad;
		EdgeChoice {
			source_x: source_left,
			target_x: target_left,
			source_pad_x: shared,
			target_pad_x: shared,
		}
	} else {
		let shared = source_right.max(target_right) + 2.0 * pad;
		EdgeChoice {
			source_x: source_right,
			target_x: target_right,
			source_pad_x: shared,
			target_pad_x: shared,
		}
	}
}

/// Reduce a static Graphviz edge to an [`AnchorSpec`].
///
/// Returns `None` when the path has no drawable points.
pub fn resolve_anchor(
	static_path: &str,
	source: &StaticNode,
	target: &StaticNode,
	source_port: Option<&str>,
	target_port: Option<&str>,
	arrows: &[Vec<Point>],
	config: &EdgeConfig,
) -> Option<AnchorSpec> {
	let (start, end) = endpoints(static_path)?;
	Some(AnchorSpec {
		source: end_anchor(source, source_port, start.y, config.source_row_ratio),
		target: end_anchor(target, target_port, end.y, config.target_row_ratio),
		markers: detect_markers(start, end, arrows),
	})
}

fn end_anchor(node: &StaticNode, port: Option<&str>, sampled_y: f64, ratio: f64) -> EndAnchor {
	let row = port.and_then(|p| {
		let row = node.port_row(p);
		if row.is_none() {
			log::debug!("schema-viz: node `{}` has no row `{p}`, clamping", node.id);
		}
		row
	});
	let offset_y = match row {
		Some(row) => row.bbox.y + row.bbox.height * ratio,
		None => node.bbox.clamp_y(sampled_y),
	};
	EndAnchor {
		left_x: node.bbox.x,
		right_x: node.bbox.right(),
		offset_y,
	}
}

/// Arrowheads whose centroid is nearer the path start mark the start, the rest the end.
pub fn detect_markers(start: Point, end: Point, arrows: &[Vec<Point>]) -> Markers {
	let mut markers = Markers::default();
	for c in arrows.iter().filter_map(|poly| centroid(poly)) {
		if c.distance(start) < c.distance(end) {
			markers.start = true;
		} else {
			markers.end = true;
		}
	}
	markers
}

/// The four spline control points of a connector for the current node translations.
pub fn route(
	spec: &AnchorSpec,
	source: Translate,
	target: Translate,
	span: DrawingSpan,
	config: &EdgeConfig,
) -> [Point; 4] {
	let (sl, sr, sy) = spec.source.at(source);
	let (tl, tr, ty) = spec.target.at(target);
	let choice = choose_edge_x((sl, sr), (tl, tr), span, config);
	[
		Point::new(choice.source_x, sy),
		Point::new(choice.source_pad_x, sy),
		Point::new(choice.target_pad_x, ty),
		Point::new(choice.target_x, ty),
	]
}
