//! In-memory diagram built by the rewrite pass.
//!
//! Nodes and links live in flat vectors addressed by small index keys. The
//! model knows nothing about the DOM; it only records which element id
//! represents each entity so a [`VisualLayer`](super::visual::VisualLayer)
//! can mirror changes.

use std::collections::HashMap;

use super::anchor::{AnchorSpec, DrawingSpan, route};
use super::config::EdgeConfig;
use super::geometry::{BBox, Extent, GroupTransform, Point, Translate, ViewBox};
use super::path::basis_spline;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckboxKey(pub usize);

/// Per-node state bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags(u8);

impl NodeFlags {
	pub const SELECTED: NodeFlags = NodeFlags(1);
	pub const DOUBLE: NodeFlags = NodeFlags(1 << 1);
	pub const ACTIVE: NodeFlags = NodeFlags(1 << 2);

	pub const fn empty() -> Self {
		NodeFlags(0)
	}

	pub const fn contains(self, other: NodeFlags) -> bool {
		self.0 & other.0 == other.0
	}

	pub fn set(&mut self, other: NodeFlags, on: bool) {
		if on {
			self.0 |= other.0;
		} else {
			self.0 &= !other.0;
		}
	}
}

/// A draggable table or shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Identifier from the Graphviz `<title>`.
	pub id: String,
	pub dom_id: String,
	/// Un-translated local bounding box.
	pub bbox: BBox,
	pub translate: Translate,
	pub flags: NodeFlags,
}

impl Node {
	pub fn is_selected(&self) -> bool {
		self.flags.contains(NodeFlags::SELECTED)
	}

	pub fn is_double_marked(&self) -> bool {
		self.flags.contains(NodeFlags::DOUBLE)
	}

	pub fn is_active(&self) -> bool {
		self.flags.contains(NodeFlags::ACTIVE)
	}

	/// Current local box including the drag translation.
	pub fn current_bbox(&self) -> BBox {
		self.bbox.translated(self.translate)
	}

	pub fn class_attr(&self) -> String {
		let mut class = String::from("node");
		if self.is_selected() {
			class.push_str(" node-clicked");
		}
		if self.is_double_marked() {
			class.push_str(" node-clicked-twice");
		}
		if self.is_active() {
			class.push_str(" active");
		}
		class
	}
}

/// Highlight state of one connector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkClasses {
	pub clicked: bool,
	pub source_neighbor: bool,
	pub target_neighbor: bool,
}

/// A re-routed connector between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub title: String,
	pub source: NodeKey,
	pub target: NodeKey,
	pub dom_id: String,
	pub hitbox_dom_id: String,
	pub anchor: AnchorSpec,
	/// Current spline control points, local units.
	pub points: [Point; 4],
	/// Current path data, derived from `points`.
	pub path: String,
	pub classes: LinkClasses,
}

impl Link {
	pub fn class_attr(&self) -> String {
		let mut class = String::from("edge");
		if self.classes.clicked {
			class.push_str(" edge-clicked");
		}
		if self.classes.source_neighbor {
			class.push_str(" edge-source-neighbor");
		}
		if self.classes.target_neighbor {
			class.push_str(" edge-target-neighbor");
		}
		class
	}

	pub fn touches(&self, node: NodeKey) -> bool {
		self.source == node || self.target == node
	}
}

/// A clickable glyph inside a node label.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkbox {
	pub dom_id: String,
	pub glyph: String,
	pub owner_title: Option<String>,
	pub owner_bbox: Option<BBox>,
	pub node: Option<NodeKey>,
}

/// What a pointer event landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	Canvas,
	Node(NodeKey),
	Edge(LinkKey),
	Checkbox(CheckboxKey),
}

/// Registry of everything interactive in one rendered diagram.
#[derive(Clone, Debug)]
pub struct Diagram {
	nodes: Vec<Node>,
	links: Vec<Link>,
	checkboxes: Vec<Checkbox>,
	by_id: HashMap<String, NodeKey>,
	dom_index: HashMap<String, Hit>,
	/// Transform of the graph group, local to user units.
	pub group: GroupTransform,
	pub span: DrawingSpan,
	pub edge_config: EdgeConfig,
	/// Local bounds of static content that is never moved (edges left as Graphviz drew them).
	pub static_bounds: Option<BBox>,
}

impl Diagram {
	pub fn new(group: GroupTransform, span: DrawingSpan, edge_config: EdgeConfig) -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			checkboxes: Vec::new(),
			by_id: HashMap::new(),
			dom_index: HashMap::new(),
			group,
			span,
			edge_config,
			static_bounds: None,
		}
	}

	/// Register a node. A duplicate identifier keeps the first node reachable by id.
	pub fn add_node(&mut self, node: Node) -> NodeKey {
		let key = NodeKey(self.nodes.len());
		self.by_id.entry(node.id.clone()).or_insert(key);
		self.dom_index.insert(node.dom_id.clone(), Hit::Node(key));
		self.nodes.push(node);
		key
	}

	/// Register a link and compute its initial route.
	pub fn add_link(
		&mut self,
		title: String,
		source: NodeKey,
		target: NodeKey,
		anchor: AnchorSpec,
		dom_id: String,
		hitbox_dom_id: String,
	) -> LinkKey {
		let key = LinkKey(self.links.len());
		self.dom_index.insert(dom_id.clone(), Hit::Edge(key));
		self.dom_index.insert(hitbox_dom_id.clone(), Hit::Edge(key));
		self.links.push(Link {
			title,
			source,
			target,
			dom_id,
			hitbox_dom_id,
			anchor,
			points: [Point::default(); 4],
			path: String::new(),
			classes: LinkClasses::default(),
		});
		self.route_link(key);
		key
	}

	pub fn add_checkbox(&mut self, checkbox: Checkbox) -> CheckboxKey {
		let key = CheckboxKey(self.checkboxes.len());
		self.dom_index
			.insert(checkbox.dom_id.clone(), Hit::Checkbox(key));
		self.checkboxes.push(checkbox);
		key
	}

	pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
		self.nodes.iter().enumerate().map(|(i, n)| (NodeKey(i), n))
	}

	pub fn links(&self) -> impl Iterator<Item = (LinkKey, &Link)> {
		self.links.iter().enumerate().map(|(i, l)| (LinkKey(i), l))
	}

	pub fn node(&self, key: NodeKey) -> &Node {
		&self.nodes[key.0]
	}

	pub fn node_mut(&mut self, key: NodeKey) -> &mut Node {
		&mut self.nodes[key.0]
	}

	pub fn link(&self, key: LinkKey) -> &Link {
		&self.links[key.0]
	}

	pub fn link_mut(&mut self, key: LinkKey) -> &mut Link {
		&mut self.links[key.0]
	}

	pub fn checkbox(&self, key: CheckboxKey) -> &Checkbox {
		&self.checkboxes[key.0]
	}

	pub fn checkbox_mut(&mut self, key: CheckboxKey) -> &mut Checkbox {
		&mut self.checkboxes[key.0]
	}

	pub fn find(&self, id: &str) -> Option<NodeKey> {
		self.by_id.get(id).copied()
	}

	/// Map a DOM element id back to the entity it represents.
	pub fn hit_for_dom(&self, dom_id: &str) -> Option<Hit> {
		self.dom_index.get(dom_id).copied()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	/// Identifiers of selected nodes in document order.
	pub fn selected_ids(&self) -> Vec<String> {
		self.nodes
			.iter()
			.filter(|n| n.is_selected())
			.map(|n| n.id.clone())
			.collect()
	}

	pub fn selected_keys(&self) -> Vec<NodeKey> {
		self.nodes()
			.filter(|(_, n)| n.is_selected())
			.map(|(k, _)| k)
			.collect()
	}

	/// Clear selection and double-marks everywhere; returns the nodes that changed.
	pub fn clear_flags(&mut self) -> Vec<NodeKey> {
		let mut changed = Vec::new();
		for (i, node) in self.nodes.iter_mut().enumerate() {
			let before = node.flags;
			node.flags.set(NodeFlags::SELECTED, false);
			node.flags.set(NodeFlags::DOUBLE, false);
			if node.flags != before {
				changed.push(NodeKey(i));
			}
		}
		changed
	}

	/// Clear every double-mark; returns the nodes that changed.
	pub fn clear_double_marks(&mut self) -> Vec<NodeKey> {
		let mut changed = Vec::new();
		for (i, node) in self.nodes.iter_mut().enumerate() {
			if node.is_double_marked() {
				node.flags.set(NodeFlags::DOUBLE, false);
				changed.push(NodeKey(i));
			}
		}
		changed
	}

	/// Select every node whose identifier appears in `ids`; unknown ids are ignored.
	pub fn restore_selection(&mut self, ids: &[String]) {
		for id in ids {
			if let Some(key) = self.find(id) {
				self.nodes[key.0].flags.set(NodeFlags::SELECTED, true);
			}
		}
	}

	/// Mark links leaving `node` as source neighbours and links arriving as
	/// target neighbours, clearing both marks elsewhere. Returns changed links.
	pub fn highlight_neighbors(&mut self, node: NodeKey) -> Vec<LinkKey> {
		let mut changed = Vec::new();
		for (i, link) in self.links.iter_mut().enumerate() {
			let before = link.classes;
			link.classes.source_neighbor = link.source == node;
			link.classes.target_neighbor = link.target == node;
			if link.classes != before {
				changed.push(LinkKey(i));
			}
		}
		changed
	}

	/// Drop every connector highlight; returns changed links.
	pub fn clear_link_classes(&mut self) -> Vec<LinkKey> {
		let mut changed = Vec::new();
		for (i, link) in self.links.iter_mut().enumerate() {
			if link.classes != LinkClasses::default() {
				link.classes = LinkClasses::default();
				changed.push(LinkKey(i));
			}
		}
		changed
	}

	/// Recompute one connector from its cached anchors and the current translations.
	pub fn route_link(&mut self, key: LinkKey) {
		let link = &self.links[key.0];
		let source = self.nodes[link.source.0].translate;
		let target = self.nodes[link.target.0].translate;
		let points = route(&link.anchor, source, target, self.span, &self.edge_config);
		let link = &mut self.links[key.0];
		link.points = points;
		link.path = basis_spline(&points);
	}

	/// Re-route only the links attached to one of `moved`.
	pub fn reroute_touching(&mut self, moved: &[NodeKey]) -> Vec<LinkKey> {
		let keys: Vec<LinkKey> = self
			.links()
			.filter(|(_, l)| moved.iter().any(|n| l.touches(*n)))
			.map(|(k, _)| k)
			.collect();
		for key in &keys {
			self.route_link(*key);
		}
		keys
	}

	/// Bounds of all nodes and connectors in user units.
	pub fn content_bounds(&self) -> Option<BBox> {
		let mut extent = Extent::default();
		for node in &self.nodes {
			extent.include_box(node.current_bbox());
		}
		for link in &self.links {
			for p in link.points {
				extent.include_point(p);
			}
		}
		if let Some(b) = self.static_bounds {
			extent.include_box(b);
		}
		extent.finish().map(|local| self.group.apply_box(local))
	}

	/// ViewBox enclosing the whole content plus `pad` user units on each side.
	pub fn fit_view_box(&self, pad: f64) -> Option<ViewBox> {
		self.content_bounds()
			.map(|b| ViewBox::from_box(b.padded(pad)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::schema_diagram::anchor::{EndAnchor, Markers};

	fn two_tables() -> Diagram {
		let mut d = Diagram::new(
			GroupTransform::parse(Some("translate(4 116)")),
			DrawingSpan {
				min_x: 0.0,
				width: 256.0,
			},
			EdgeConfig::default(),
		);
		let a = d.add_node(Node {
			id: "A".into(),
			dom_id: "t-node-0".into(),
			bbox: BBox::new(0.0, -112.0, 72.0, 56.0),
			translate: Translate::IDENTITY,
			flags: NodeFlags::empty(),
		});
		let b = d.add_node(Node {
			id: "B".into(),
			dom_id: "t-node-1".into(),
			bbox: BBox::new(184.0, -56.0, 72.0, 56.0),
			translate: Translate::IDENTITY,
			flags: NodeFlags::empty(),
		});
		d.add_link(
			"A:col1->B:col2".into(),
			a,
			b,
			AnchorSpec {
				source: EndAnchor {
					left_x: 0.0,
					right_x: 72.0,
					offset_y: -62.0,
				},
				target: EndAnchor {
					left_x: 184.0,
					right_x: 256.0,
					offset_y: -13.2,
				},
				markers: Markers {
					start: false,
					end: true,
				},
			},
			"t-edge-0-path".into(),
			"t-hit-0".into(),
		);
		d
	}

	#[test]
	fn flags_set_and_clear() {
		let mut f = NodeFlags::empty();
		f.set(NodeFlags::SELECTED, true);
		f.set(NodeFlags::DOUBLE, true);
		assert!(f.contains(NodeFlags::SELECTED) && f.contains(NodeFlags::DOUBLE));
		f.set(NodeFlags::SELECTED, false);
		assert!(!f.contains(NodeFlags::SELECTED));
		assert!(!f.contains(NodeFlags::ACTIVE));
	}

	#[test]
	fn class_attributes_reflect_state() {
		let mut d = two_tables();
		let a = d.find("A").unwrap();
		d.node_mut(a).flags.set(NodeFlags::SELECTED, true);
		d.node_mut(a).flags.set(NodeFlags::ACTIVE, true);
		assert_eq!(d.node(a).class_attr(), "node node-clicked active");

		d.highlight_neighbors(a);
		let link = d.link(LinkKey(0));
		assert_eq!(link.class_attr(), "edge edge-source-neighbor");
	}

	#[test]
	fn initial_route_and_path() {
		let d = two_tables();
		let link = d.link(LinkKey(0));
		assert_eq!(link.points[0], Point::new(72.0, -62.0));
		assert_eq!(link.points[3], Point::new(184.0, -13.2));
		assert!(link.path.starts_with("M72,-62"));
		assert!(link.path.ends_with("L184,-13.2"));
	}

	#[test]
	fn rerouting_is_limited_to_touching_links() {
		let mut d = two_tables();
		let a = d.find("A").unwrap();
		d.node_mut(a).translate = Translate::new(50.0, 0.0);
		assert_eq!(d.reroute_touching(&[a]), vec![LinkKey(0)]);
		assert_eq!(d.link(LinkKey(0)).points[0], Point::new(122.0, -62.0));

		let lone = d.add_node(Node {
			id: "C".into(),
			dom_id: "t-node-2".into(),
			bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
			translate: Translate::IDENTITY,
			flags: NodeFlags::empty(),
		});
		assert!(d.reroute_touching(&[lone]).is_empty());
	}

	#[test]
	fn selection_restores_by_identifier() {
		let mut d = two_tables();
		d.restore_selection(&["B".to_string(), "missing".to_string()]);
		assert_eq!(d.selected_ids(), ["B"]);
		let b = d.find("B").unwrap();
		d.node_mut(b).flags.set(NodeFlags::DOUBLE, true);
		assert_eq!(d.clear_flags(), vec![b]);
		assert!(d.selected_ids().is_empty());
	}

	#[test]
	fn fit_encloses_content_in_user_units() {
		let d = two_tables();
		assert_eq!(
			d.fit_view_box(20.0),
			Some(ViewBox::new(-16.0, -16.0, 296.0, 152.0))
		);
	}

	#[test]
	fn dom_ids_map_back_to_entities() {
		let d = two_tables();
		assert_eq!(d.hit_for_dom("t-node-1"), Some(Hit::Node(NodeKey(1))));
		assert_eq!(d.hit_for_dom("t-hit-0"), Some(Hit::Edge(LinkKey(0))));
		assert_eq!(d.hit_for_dom("t-edge-0-path"), Some(Hit::Edge(LinkKey(0))));
		assert_eq!(d.hit_for_dom("elsewhere"), None);
	}
}
