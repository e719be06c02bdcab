//! One-shot transformation of Graphviz SVG into the interactive form.
//!
//! The static document is read with `roxmltree` and written back out as a new
//! markup string with:
//! - every id prefixed with the diagram instance prefix
//! - the white background polygon removed
//! - an opaque background shape as the first child of every node
//! - resolvable edges re-drawn as anchored splines with arrow markers
//! - an invisible wide hitbox per edge, grouped in a layer behind everything else
//! - checkbox glyphs tagged with their state class
//!
//! Alongside the markup a [`Diagram`] is built that mirrors the element ids,
//! so the interaction layer never has to query the DOM for geometry.

use std::collections::{HashMap, HashSet};

use roxmltree::{Document, Node as XmlNode, NodeId, ParsingOptions};

use super::anchor::{DrawingSpan, resolve_anchor};
use super::checkbox::GlyphState;
use super::config::DiagramConfig;
use super::error::DiagramError;
use super::geometry::{Extent, ViewBox, fmt_num};
use super::model::{Checkbox, CheckboxKey, Diagram, LinkKey, Node, NodeFlags, NodeKey};
use super::static_svg::{NodeShape, StaticGraph, element_bbox};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Inputs of one rewrite.
pub struct RewriteOptions<'a> {
	/// Unique per mounted diagram; keeps ids distinct when several diagrams share a page.
	pub prefix: &'a str,
	pub config: &'a DiagramConfig,
	/// Identifiers to mark selected again (selection surviving a re-render).
	pub selected: &'a [String],
}

/// Interactive markup plus the model describing it.
#[derive(Debug)]
pub struct Rewritten {
	pub markup: String,
	pub diagram: Diagram,
	/// The fitted viewBox written on the root element.
	pub view_box: ViewBox,
}

/// One end of an edge title after resolution against the node registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct EndRef<'t> {
	node: NodeKey,
	port: Option<&'t str>,
}

/// Split a Graphviz edge title (`a:port->b`, or `a--b` for undirected graphs).
fn split_edge_title(title: &str) -> Option<(&str, &str)> {
	title.split_once("->").or_else(|| title.split_once("--"))
}

/// `node` or `node:port[:compass]`. The part before the first colon wins when it
/// names a node; otherwise the whole text is tried as an identifier.
fn resolve_end<'t>(diagram: &Diagram, text: &'t str) -> Option<EndRef<'t>> {
	let text = text.trim();
	if let Some((name, rest)) = text.split_once(':') {
		if let Some(node) = diagram.find(name.trim()) {
			let port = rest.split(':').next().map(str::trim).filter(|p| !p.is_empty());
			return Some(EndRef { node, port });
		}
	}
	diagram.find(text).map(|node| EndRef { node, port: None })
}

pub fn rewrite(svg: &str, opts: &RewriteOptions<'_>) -> Result<Rewritten, DiagramError> {
	let doc = Document::parse_with_options(
		svg,
		ParsingOptions {
			allow_dtd: true,
			..Default::default()
		},
	)?;
	let graph = StaticGraph::read(&doc)?;
	let config = opts.config;

	let mut span_extent = Extent::default();
	for node in &graph.nodes {
		span_extent.include_box(node.bbox);
	}
	let span = span_extent
		.finish()
		.map(|b| DrawingSpan {
			min_x: b.x,
			width: b.width,
		})
		.unwrap_or(DrawingSpan {
			min_x: 0.0,
			width: graph.view_box.map_or(0.0, |vb| vb.width),
		});

	let mut diagram = Diagram::new(graph.group_transform, span, config.edge.clone());
	let mut roles: HashMap<NodeId, Role> = HashMap::new();
	roles.insert(graph.root, Role::Root);
	roles.insert(graph.graph_group, Role::GraphGroup);
	if let Some(bg) = graph.background {
		roles.insert(bg, Role::Drop);
	}

	for (i, node) in graph.nodes.iter().enumerate() {
		let mut flags = NodeFlags::empty();
		flags.set(NodeFlags::SELECTED, opts.selected.contains(&node.id));
		let key = diagram.add_node(Node {
			id: node.id.clone(),
			dom_id: format!("{}-node-{i}", opts.prefix),
			bbox: node.bbox,
			translate: Default::default(),
			flags,
		});
		roles.insert(node.element, Role::Node(key, node.shape));
	}

	let mut static_extent = Extent::default();
	for (i, edge) in graph.edges.iter().enumerate() {
		let resolved = split_edge_title(&edge.title).and_then(|(s, t)| {
			Some((resolve_end(&diagram, s)?, resolve_end(&diagram, t)?))
		});
		let Some((source, target)) = resolved else {
			log::warn!(
				"schema-viz: cannot resolve endpoints of edge `{}`, leaving it static",
				edge.title
			);
			if let Some(b) = doc.get_node(edge.element).and_then(element_bbox) {
				static_extent.include_box(b);
			}
			continue;
		};
		let anchor = edge.path.as_deref().and_then(|d| {
			resolve_anchor(
				d,
				&graph.nodes[source.node.0],
				&graph.nodes[target.node.0],
				source.port,
				target.port,
				&edge.arrows,
				&config.edge,
			)
		});
		let Some(anchor) = anchor else {
			log::warn!("schema-viz: edge `{}` has no usable path, leaving it static", edge.title);
			if let Some(b) = doc.get_node(edge.element).and_then(element_bbox) {
				static_extent.include_box(b);
			}
			continue;
		};
		let key = diagram.add_link(
			edge.title.clone(),
			source.node,
			target.node,
			anchor,
			format!("{}-edge-{i}-path", opts.prefix),
			format!("{}-hit-{i}", opts.prefix),
		);
		roles.insert(edge.element, Role::Edge(key));
		for removed in &edge.removable {
			roles.insert(*removed, Role::Drop);
		}
	}
	diagram.static_bounds = static_extent.finish();

	for (i, glyph) in graph.glyphs.iter().enumerate() {
		let key = diagram.add_checkbox(Checkbox {
			dom_id: format!("{}-glyph-{i}", opts.prefix),
			glyph: glyph.glyph.clone(),
			owner_title: glyph.owner_title.clone(),
			owner_bbox: glyph.owner_bbox,
			node: glyph.node.map(NodeKey),
		});
		roles.insert(glyph.element, Role::Glyph(key, glyph.state));
	}

	let view_box = diagram
		.fit_view_box(config.viewport.fit_padding)
		.or(graph.view_box)
		.unwrap_or(ViewBox::new(0.0, 0.0, 1.0, 1.0));

	let mut emitter = Emitter {
		out: String::with_capacity(svg.len() + 1024),
		prefix: opts.prefix,
		roles,
		diagram: &diagram,
		config,
		view_box,
		dropped: HashSet::new(),
	};
	emitter.element(doc.root_element());
	log::debug!(
		"schema-viz: rewrote {} nodes, {} links, {} elements dropped",
		diagram.node_count(),
		diagram.link_count(),
		emitter.dropped.len()
	);
	let markup = emitter.out;

	Ok(Rewritten {
		markup,
		diagram,
		view_box,
	})
}

#[derive(Clone, Copy, Debug)]
enum Role {
	Root,
	GraphGroup,
	Drop,
	Node(NodeKey, NodeShape),
	Edge(LinkKey),
	Glyph(CheckboxKey, GlyphState),
}

/// What to change on an element while copying it.
#[derive(Default)]
struct Decor {
	/// Original attributes not copied (local names, no namespace).
	drop: &'static [&'static str],
	attrs: Vec<(&'static str, String)>,
	leading: String,
	trailing: String,
}

struct Emitter<'a> {
	out: String,
	prefix: &'a str,
	roles: HashMap<NodeId, Role>,
	diagram: &'a Diagram,
	config: &'a DiagramConfig,
	view_box: ViewBox,
	dropped: HashSet<NodeId>,
}

impl Emitter<'_> {
	fn element(&mut self, node: XmlNode<'_, '_>) {
		let role = self.roles.get(&node.id()).copied();
		if matches!(role, Some(Role::Drop)) {
			self.dropped.insert(node.id());
			return;
		}
		let decor = match role {
			Some(Role::Root) => self.root_decor(),
			Some(Role::GraphGroup) => Decor {
				leading: self.hitbox_layer(),
				..Default::default()
			},
			Some(Role::Node(key, shape)) => self.node_decor(key, shape),
			Some(Role::Edge(key)) => Decor {
				trailing: self.edge_path(key),
				..Default::default()
			},
			Some(Role::Glyph(key, state)) => Decor {
				drop: &["id", "class", "pointer-events"],
				attrs: vec![
					("id", self.diagram.checkbox(key).dom_id.clone()),
					("class", state.class().to_string()),
					("pointer-events", "all".to_string()),
				],
				..Default::default()
			},
			Some(Role::Drop) | None => Decor::default(),
		};

		let name = node.tag_name().name();
		self.out.push('<');
		self.out.push_str(name);
		for (attr, value) in &decor.attrs {
			push_attr(&mut self.out, attr, value);
		}
		for attr in node.attributes() {
			let qualified = match attr.namespace() {
				Some(XLINK_NS) => format!("xlink:{}", attr.name()),
				Some(XML_NS) => format!("xml:{}", attr.name()),
				Some(_) => continue,
				None if decor.drop.contains(&attr.name()) => continue,
				None if attr.name() == "id" => {
					push_attr(&mut self.out, "id", &format!("{}-{}", self.prefix, attr.value()));
					continue;
				}
				None => attr.name().to_string(),
			};
			push_attr(&mut self.out, &qualified, attr.value());
		}

		let has_children = node.children().any(|c| c.is_element() || c.is_text());
		if !has_children && decor.leading.is_empty() && decor.trailing.is_empty() {
			self.out.push_str("/>");
			return;
		}
		self.out.push('>');
		self.out.push_str(&decor.leading);
		for child in node.children() {
			if child.is_element() {
				self.element(child);
			} else if let Some(text) = child.text().filter(|_| child.is_text()) {
				push_text(&mut self.out, text);
			}
		}
		self.out.push_str(&decor.trailing);
		self.out.push_str("</");
		self.out.push_str(name);
		self.out.push('>');
	}

	fn root_decor(&self) -> Decor {
		let style = &self.config.style;
		let svg_id = format!("{}-svg", self.prefix);
		let mut leading = String::from("<style>");
		push_text(&mut leading, &style.stylesheet(&svg_id));
		leading.push_str("</style><defs>");
		let size = fmt_num(self.config.edge.marker_size);
		let fill = style.edge.to_css();
		for (suffix, view_box, d) in [
			("start", "20 -10 20 20", "M40,-10L20,0L40,10"),
			("end", "0 -10 20 20", "M0,-10L20,0L0,10"),
		] {
			leading.push_str(&format!(
				r#"<marker id="{}-arrowhead-{suffix}" viewBox="{view_box}" refX="20" refY="0" markerWidth="{size}" markerHeight="{size}" orient="auto" markerUnits="userSpaceOnUse"><path d="{d}" fill="{fill}"/></marker>"#,
				self.prefix
			));
		}
		leading.push_str("</defs>");
		Decor {
			drop: &["id", "class", "width", "height", "viewBox", "preserveAspectRatio"],
			attrs: vec![
				("id", svg_id),
				("class", "schema-diagram".to_string()),
				("width", "100%".to_string()),
				("height", "100%".to_string()),
				("viewBox", self.view_box.to_string()),
				("xmlns", SVG_NS.to_string()),
				("xmlns:xlink", XLINK_NS.to_string()),
			],
			leading,
			trailing: String::new(),
		}
	}

	fn node_decor(&self, key: NodeKey, shape: NodeShape) -> Decor {
		let node = self.diagram.node(key);
		let b = node.bbox;
		let fill = self.config.style.node_background.to_css();
		let leading = match shape {
			NodeShape::Ellipse => format!(
				r#"<ellipse class="node-background" cx="{}" cy="{}" rx="{}" ry="{}" fill="{fill}"/>"#,
				fmt_num(b.x + b.width / 2.0),
				fmt_num(b.y + b.height / 2.0),
				fmt_num(b.width / 2.0),
				fmt_num(b.height / 2.0),
			),
			NodeShape::Rect => format!(
				r#"<rect class="node-background" x="{}" y="{}" width="{}" height="{}" fill="{fill}"/>"#,
				fmt_num(b.x),
				fmt_num(b.y),
				fmt_num(b.width),
				fmt_num(b.height),
			),
		};
		Decor {
			drop: &["id", "class", "transform"],
			attrs: vec![
				("id", node.dom_id.clone()),
				("class", node.class_attr()),
			],
			leading,
			trailing: String::new(),
		}
	}

	fn edge_path(&self, key: LinkKey) -> String {
		let link = self.diagram.link(key);
		let mut out = format!(
			r#"<path id="{}" class="{}" d="{}" fill="none" stroke="{}" stroke-width="{}""#,
			link.dom_id,
			link.class_attr(),
			link.path,
			self.config.style.edge.to_css(),
			fmt_num(self.config.edge.stroke_width),
		);
		if link.anchor.markers.start {
			out.push_str(&format!(r#" marker-start="url(#{}-arrowhead-start)""#, self.prefix));
		}
		if link.anchor.markers.end {
			out.push_str(&format!(r#" marker-end="url(#{}-arrowhead-end)""#, self.prefix));
		}
		out.push_str("/>");
		out
	}

	fn hitbox_layer(&self) -> String {
		let mut out = String::from(r#"<g class="hitbox-layer">"#);
		for (_, link) in self.diagram.links() {
			out.push_str(r#"<g class="edge"><title>"#);
			push_text(&mut out, &link.title);
			out.push_str(&format!(
				r#"</title><path id="{}" class="edge edge-hitbox" d="{}" fill="none" stroke="transparent" stroke-width="{}" pointer-events="all"/></g>"#,
				link.hitbox_dom_id,
				link.path,
				fmt_num(self.config.edge.hitbox_width),
			));
		}
		out.push_str("</g>");
		out
	}
}

fn push_attr(out: &mut String, name: &str, value: &str) {
	out.push(' ');
	out.push_str(name);
	out.push_str("=\"");
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			_ => out.push(c),
		}
	}
	out.push('"');
}

pub(crate) fn push_text(out: &mut String, text: &str) {
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			_ => out.push(c),
		}
	}
}
