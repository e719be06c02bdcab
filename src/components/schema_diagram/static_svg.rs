//! Read-only view of the static SVG produced by Graphviz.
//!
//! The browser's `getBBox()` is not available to plain Rust code, so local
//! bounding boxes are computed here from the shapes Graphviz emits. Text is
//! estimated from its font size, which is enough since Graphviz always draws
//! a border polygon around table nodes.

use std::collections::HashMap;

use roxmltree::{Document, Node, NodeId};

use super::checkbox::{GlyphState, classify};
use super::error::DiagramError;
use super::geometry::{BBox, Extent, GroupTransform, Point, ViewBox};
use super::path::{control_bounds, polygon_points};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Shape used for the opaque background inserted behind a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
	Ellipse,
	Rect,
}

/// An addressable sub-region of a node, usually one table row.
#[derive(Clone, Debug, PartialEq)]
pub struct PortRow {
	pub id: Option<String>,
	pub title: Option<String>,
	pub bbox: BBox,
}

impl PortRow {
	/// Whether this row is the target of a `node:port` reference.
	pub fn matches(&self, port: &str) -> bool {
		if let Some(id) = &self.id {
			if id == port || id.strip_suffix(port).is_some_and(|head| head.ends_with('_')) {
				return true;
			}
		}
		self.title.as_deref() == Some(port)
	}
}

#[derive(Clone, Debug)]
pub struct StaticNode {
	pub element: NodeId,
	pub id: String,
	pub bbox: BBox,
	pub shape: NodeShape,
	pub ports: Vec<PortRow>,
}

impl StaticNode {
	/// First row in document order addressed by `port`.
	pub fn port_row(&self, port: &str) -> Option<&PortRow> {
		self.ports.iter().find(|row| row.matches(port))
	}
}

#[derive(Clone, Debug)]
pub struct StaticEdge {
	pub element: NodeId,
	pub title: String,
	/// Path data of the first `<path>` in the edge group.
	pub path: Option<String>,
	/// Arrowhead polygons.
	pub arrows: Vec<Vec<Point>>,
	/// Static geometry dropped when the edge is re-routed.
	pub removable: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct StaticGlyph {
	pub element: NodeId,
	pub glyph: String,
	pub state: GlyphState,
	/// `xlink:title` (or `title`) of the glyph's parent element.
	pub owner_title: Option<String>,
	/// Local box of the glyph's parent element.
	pub owner_bbox: Option<BBox>,
	/// Index into [`StaticGraph::nodes`] of the node containing the glyph.
	pub node: Option<usize>,
}

/// Everything the rewrite pass needs to know about one Graphviz document.
#[derive(Clone, Debug)]
pub struct StaticGraph {
	pub root: NodeId,
	pub graph_group: NodeId,
	pub group_transform: GroupTransform,
	pub view_box: Option<ViewBox>,
	pub background: Option<NodeId>,
	pub nodes: Vec<StaticNode>,
	pub edges: Vec<StaticEdge>,
	pub glyphs: Vec<StaticGlyph>,
}

impl StaticGraph {
	pub fn read(doc: &Document<'_>) -> Result<StaticGraph, DiagramError> {
		let root = doc.root_element();
		if !root.has_tag_name("svg") {
			return Err(DiagramError::SvgParse(format!(
				"root element is <{}>, expected <svg>",
				root.tag_name().name()
			)));
		}
		let graph_group = root
			.descendants()
			.find(|n| n.has_tag_name("g") && has_class(*n, "graph"))
			.or_else(|| root.children().find(|n| n.has_tag_name("g")))
			.ok_or(DiagramError::MissingGraph)?;

		let background = root
			.descendants()
			.find(|n| {
				n.has_tag_name("polygon")
					&& n.attribute("fill") == Some("white")
					&& n.attribute("stroke") == Some("none")
			})
			.map(|n| n.id());

		let mut nodes = Vec::new();
		let mut node_index = HashMap::new();
		for group in root
			.descendants()
			.filter(|n| n.has_tag_name("g") && has_class(*n, "node"))
		{
			match read_node(group) {
				Some(node) => {
					node_index.insert(group.id(), nodes.len());
					nodes.push(node);
				}
				None => log::warn!(
					"schema-viz: skipping node group {:?} without title or geometry",
					group.attribute("id")
				),
			}
		}

		let edges = root
			.descendants()
			.filter(|n| n.has_tag_name("g") && has_class(*n, "edge"))
			.map(read_edge)
			.collect();

		let glyphs = root
			.descendants()
			.filter(|n| n.has_tag_name("text"))
			.filter_map(|text| {
				let glyph = text_content(text);
				let state = classify(&glyph)?;
				let parent = text.parent_element();
				Some(StaticGlyph {
					element: text.id(),
					owner_title: parent.and_then(link_title).map(str::to_string),
					owner_bbox: parent.and_then(element_bbox),
					node: text
						.ancestors()
						.find_map(|a| node_index.get(&a.id()).copied()),
					glyph,
					state,
				})
			})
			.collect();

		Ok(StaticGraph {
			root: root.id(),
			graph_group: graph_group.id(),
			group_transform: GroupTransform::parse(graph_group.attribute("transform")),
			view_box: ViewBox::parse(root.attribute("viewBox")),
			background,
			nodes,
			edges,
			glyphs,
		})
	}
}

fn read_node(group: Node<'_, '_>) -> Option<StaticNode> {
	let id = title_text(group)?;
	let bbox = element_bbox(group)?;
	let shape = if group.descendants().any(|n| n.has_tag_name("ellipse")) {
		NodeShape::Ellipse
	} else {
		NodeShape::Rect
	};
	let ports = group
		.descendants()
		.skip(1)
		.filter(|n| n.has_tag_name("g") || n.has_tag_name("a"))
		.filter_map(|n| {
			let id = n.attribute("id").map(str::to_string);
			let title = link_title(n).map(str::to_string);
			if id.is_none() && title.is_none() {
				return None;
			}
			Some(PortRow {
				id,
				title,
				bbox: element_bbox(n)?,
			})
		})
		.collect();
	Some(StaticNode {
		element: group.id(),
		id,
		bbox,
		shape,
		ports,
	})
}

fn read_edge(group: Node<'_, '_>) -> StaticEdge {
	let path = group.descendants().find(|n| n.has_tag_name("path"));
	let polygons: Vec<Node<'_, '_>> = group
		.descendants()
		.filter(|n| n.has_tag_name("polygon"))
		.collect();
	StaticEdge {
		element: group.id(),
		title: title_text(group).unwrap_or_default(),
		path: path.and_then(|p| p.attribute("d")).map(str::to_string),
		arrows: polygons
			.iter()
			.filter_map(|p| p.attribute("points"))
			.map(polygon_points)
			.collect(),
		removable: path
			.into_iter()
			.chain(polygons.iter().copied())
			.map(|n| n.id())
			.collect(),
	}
}

pub(crate) fn has_class(node: Node<'_, '_>, class: &str) -> bool {
	node.attribute("class")
		.is_some_and(|c| c.split_whitespace().any(|token| token == class))
}

/// Text of the element's own `<title>` child.
fn title_text(node: Node<'_, '_>) -> Option<String> {
	let title = node.children().find(|n| n.has_tag_name("title"))?;
	let text = text_content(title);
	let text = text.trim();
	(!text.is_empty()).then(|| text.to_string())
}

/// `xlink:title`, falling back to a plain `title` attribute.
fn link_title<'a>(node: Node<'a, '_>) -> Option<&'a str> {
	node.attribute((XLINK_NS, "title"))
		.or_else(|| node.attribute("title"))
}

pub(crate) fn text_content(node: Node<'_, '_>) -> String {
	node.descendants()
		.filter(|n| n.is_text())
		.filter_map(|n| n.text())
		.collect()
}

fn num(node: Node<'_, '_>, name: &str) -> Option<f64> {
	node.attribute(name)?.trim().parse().ok()
}

/// Local bounding box of every shape inside `node`, the node itself included.
pub fn element_bbox(node: Node<'_, '_>) -> Option<BBox> {
	let mut extent = Extent::default();
	for el in node.descendants().filter(|n| n.is_element()) {
		if let Some(b) = shape_bbox(el) {
			extent.include_box(b);
		}
	}
	extent.finish()
}

fn shape_bbox(el: Node<'_, '_>) -> Option<BBox> {
	match el.tag_name().name() {
		"polygon" | "polyline" => {
			let mut extent = Extent::default();
			for p in polygon_points(el.attribute("points")?) {
				extent.include_point(p);
			}
			extent.finish()
		}
		"ellipse" => {
			let (cx, cy) = (num(el, "cx")?, num(el, "cy")?);
			let (rx, ry) = (num(el, "rx")?, num(el, "ry")?);
			Some(BBox::new(cx - rx, cy - ry, 2.0 * rx, 2.0 * ry))
		}
		"circle" => {
			let (cx, cy, r) = (num(el, "cx")?, num(el, "cy")?, num(el, "r")?);
			Some(BBox::new(cx - r, cy - r, 2.0 * r, 2.0 * r))
		}
		"rect" | "image" => Some(BBox::new(
			num(el, "x").unwrap_or(0.0),
			num(el, "y").unwrap_or(0.0),
			num(el, "width")?,
			num(el, "height")?,
		)),
		"path" => control_bounds(el.attribute("d")?),
		"text" => text_bbox(el),
		_ => None,
	}
}

/// Rough text extent: 0.6em per character, ascent 0.8em and descent 0.2em.
fn text_bbox(el: Node<'_, '_>) -> Option<BBox> {
	let chars = text_content(el).chars().count();
	if chars == 0 {
		return None;
	}
	let (x, y) = (num(el, "x")?, num(el, "y")?);
	let size = num(el, "font-size").unwrap_or(DEFAULT_FONT_SIZE);
	let width = chars as f64 * size * 0.6;
	let left = match el.attribute("text-anchor") {
		Some("middle") => x - width / 2.0,
		Some("end") => x - width,
		_ => x,
	};
	Some(BBox::new(left, y - 0.8 * size, width, size))
}

#[cfg(test)]
mod tests {
	use roxmltree::ParsingOptions;

	use super::super::fixtures::TWO_TABLES_SVG;
	use super::*;

	fn parse(text: &str) -> Document<'_> {
		Document::parse_with_options(
			text,
			ParsingOptions {
				allow_dtd: true,
				..Default::default()
			},
		)
		.unwrap()
	}

	#[test]
	fn reads_nodes_edges_and_glyphs() {
		let doc = parse(TWO_TABLES_SVG);
		let graph = StaticGraph::read(&doc).unwrap();

		assert_eq!(
			graph.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
			["A", "B"]
		);
		let a = &graph.nodes[0];
		assert_eq!(a.bbox, BBox::new(0.0, -112.0, 72.0, 56.0));
		assert_eq!(a.shape, NodeShape::Rect);
		assert_eq!(graph.nodes[1].bbox, BBox::new(184.0, -56.0, 72.0, 56.0));

		assert_eq!(graph.edges.len(), 1);
		let edge = &graph.edges[0];
		assert_eq!(edge.title, "A:col1->B:col2");
		assert_eq!(
			edge.path.as_deref(),
			Some("M72,-68C117.5,-68 133.5,-12 173.86,-12")
		);
		assert_eq!(edge.arrows.len(), 1);
		assert_eq!(edge.removable.len(), 2);

		assert_eq!(graph.glyphs.len(), 1);
		let glyph = &graph.glyphs[0];
		assert_eq!(glyph.glyph, "⬜");
		assert_eq!(glyph.state, GlyphState::Unchecked);
		assert_eq!(glyph.owner_title.as_deref(), Some("col1"));
		assert_eq!(glyph.node, Some(0));

		assert!(graph.background.is_some());
		assert_eq!(graph.view_box, Some(ViewBox::new(0.0, 0.0, 262.0, 120.0)));
		assert_eq!(
			graph.group_transform.apply(Point::new(0.0, 0.0)),
			Point::new(4.0, 116.0)
		);
	}

	#[test]
	fn finds_rows_by_title_or_id_suffix() {
		let doc = parse(TWO_TABLES_SVG);
		let graph = StaticGraph::read(&doc).unwrap();
		let row = graph.nodes[0].port_row("col1").unwrap();
		assert_eq!(row.bbox.y, -80.0);
		assert_eq!(row.bbox.height, 24.0);
		assert!(graph.nodes[0].port_row("col2").is_none());

		let by_id = PortRow {
			id: Some("a_node1_email".into()),
			title: None,
			bbox: BBox::default(),
		};
		assert!(by_id.matches("email"));
		assert!(!by_id.matches("mail"));
	}

	#[test]
	fn ellipse_nodes_and_missing_graph_group() {
		let doc = parse(
			r#"<svg xmlns="http://www.w3.org/2000/svg"><g class="graph">
				<g class="node"><title>x</title><ellipse cx="10" cy="-10" rx="10" ry="5"/></g>
				<g class="node"><title></title><rect x="0" y="0" width="1" height="1"/></g>
			</g></svg>"#,
		);
		let graph = StaticGraph::read(&doc).unwrap();
		assert_eq!(graph.nodes.len(), 1);
		assert_eq!(graph.nodes[0].shape, NodeShape::Ellipse);
		assert_eq!(graph.nodes[0].bbox, BBox::new(0.0, -15.0, 20.0, 10.0));
		assert!(graph.background.is_none());

		let empty = parse(r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#);
		assert_eq!(
			StaticGraph::read(&empty).unwrap_err(),
			DiagramError::MissingGraph
		);
	}

	#[test]
	fn text_extent_follows_anchor() {
		let doc = parse(
			r#"<svg xmlns="http://www.w3.org/2000/svg"><text text-anchor="middle" x="50" y="10" font-size="10">abcd</text></svg>"#,
		);
		let text = doc.root_element().first_element_child().unwrap();
		let b = text_bbox(text).unwrap();
		assert_eq!(b, BBox::new(38.0, 2.0, 24.0, 10.0));
	}
}
