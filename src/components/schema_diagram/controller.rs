//! Interaction state machine for one mounted diagram.
//!
//! Every pointer, wheel and key event is turned into an [`InputEvent`] and fed
//! to [`InteractionSession::handle`] one at a time. The session updates the
//! [`Diagram`], mirrors each change through a [`VisualLayer`] and returns the
//! notifications the host should receive, in order.
//!
//! Node states are `idle`, `selected` and `selected + double-marked`. The
//! double-mark comes from two separate press-release pairs on the same node,
//! never from the browser's `dblclick`, which is unreliable for this gesture.

use super::checkbox::{GlyphState, classify, next_glyph};
use super::config::ViewportConfig;
use super::events::{CheckboxToggled, DiagramEvent, KeyPressed, NodeClicked};
use super::geometry::{Point, ScreenBox, ViewBox, ViewportMapping};
use super::model::{CheckboxKey, Diagram, Hit, LinkKey, NodeFlags, NodeKey};
use super::visual::VisualLayer;

/// Keys that only ever act as modifiers; pressing one alone is not reported.
const MODIFIER_KEYS: [&str; 15] = [
	"Alt",
	"AltGraph",
	"CapsLock",
	"Control",
	"Fn",
	"FnLock",
	"Hyper",
	"Meta",
	"NumLock",
	"OS",
	"ScrollLock",
	"Shift",
	"Super",
	"Symbol",
	"SymbolLock",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
	pub ctrl: bool,
	pub shift: bool,
	pub alt: bool,
	pub meta: bool,
}

impl Modifiers {
	/// Ctrl on most platforms, Cmd on macOS.
	pub fn command(self) -> bool {
		self.ctrl || self.meta
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyInput {
	pub key: String,
	pub modifiers: Modifiers,
	/// Focus was inside an input, textarea, select or editable element.
	pub in_form_control: bool,
}

/// Input to the state machine. Positions are client pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
	PointerDown {
		hit: Hit,
		at: Point,
		modifiers: Modifiers,
	},
	PointerMove {
		at: Point,
	},
	PointerUp {
		at: Point,
	},
	/// Pointer left the diagram container.
	PointerLeave,
	Click {
		hit: Hit,
		modifiers: Modifiers,
	},
	DoubleClick {
		hit: Hit,
	},
	Wheel {
		at: Point,
		delta_y: f64,
	},
	Key(KeyInput),
}

/// Visible region and whether the user moved it by hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
	pub current: ViewBox,
	pub fitted: ViewBox,
	/// Set by pan and zoom; blocks the automatic re-fit after a node drag.
	pub user_adjusted: bool,
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
	Idle,
	NodeDrag {
		node: NodeKey,
		was_selected: bool,
		was_double: bool,
		drag_set: Vec<NodeKey>,
		last: Point,
		moved: bool,
	},
	Pan {
		last: Point,
		moved: bool,
	},
}

/// Per-diagram interaction state. Several diagrams on one page each own one.
#[derive(Debug)]
pub struct InteractionSession {
	diagram: Diagram,
	viewport: ViewportState,
	client: ScreenBox,
	scroll: Point,
	config: ViewportConfig,
	gesture: Gesture,
	/// The next canvas or edge click only ends a drag gesture and is ignored.
	suppress_canvas_click: bool,
}

impl InteractionSession {
	pub fn new(diagram: Diagram, fitted: ViewBox, config: ViewportConfig) -> Self {
		Self {
			diagram,
			viewport: ViewportState {
				current: fitted,
				fitted,
				user_adjusted: false,
			},
			client: ScreenBox::default(),
			scroll: Point::default(),
			config,
			gesture: Gesture::Idle,
			suppress_canvas_click: false,
		}
	}

	/// Update the `<svg>` client rectangle and page scroll used for coordinate mapping.
	pub fn set_screen(&mut self, client: ScreenBox, scroll: Point) {
		self.client = client;
		self.scroll = scroll;
	}

	pub fn mapping(&self) -> ViewportMapping {
		ViewportMapping {
			view_box: self.viewport.current,
			group: self.diagram.group,
			client: self.client,
			scroll: self.scroll,
		}
	}

	pub fn viewport(&self) -> ViewportState {
		self.viewport
	}

	pub fn diagram(&self) -> &Diagram {
		&self.diagram
	}

	pub fn selected_ids(&self) -> Vec<String> {
		self.diagram.selected_ids()
	}

	pub fn is_dragging(&self) -> bool {
		!matches!(self.gesture, Gesture::Idle)
	}

	/// Process one input event and return the notifications it produced.
	pub fn handle(&mut self, event: InputEvent, layer: &mut impl VisualLayer) -> Vec<DiagramEvent> {
		let mut out = Vec::new();
		match event {
			InputEvent::PointerDown { hit, at, modifiers } => {
				self.suppress_canvas_click = false;
				match hit {
					Hit::Checkbox(key) => self.toggle_checkbox(key, layer, &mut out),
					Hit::Node(node) if !modifiers.command() => self.start_node_drag(node, at, layer),
					Hit::Node(_) => {}
					Hit::Canvas | Hit::Edge(_) => {
						self.gesture = Gesture::Pan { last: at, moved: false };
						layer.set_panning(true);
					}
				}
			}
			InputEvent::PointerMove { at } => self.pointer_move(at, layer, &mut out),
			InputEvent::PointerUp { .. } => self.pointer_up(layer, &mut out),
			InputEvent::PointerLeave => {
				if let Gesture::Pan { moved, .. } = self.gesture {
					self.end_pan(moved, layer);
				}
			}
			InputEvent::Click { hit, modifiers } => self.click(hit, modifiers, layer, &mut out),
			InputEvent::DoubleClick { hit } => {
				if !matches!(hit, Hit::Node(_) | Hit::Checkbox(_)) {
					self.reset_view(layer);
				}
			}
			InputEvent::Wheel { at, delta_y } => self.wheel(at, delta_y, layer),
			InputEvent::Key(key) => {
				if !key.in_form_control && !MODIFIER_KEYS.contains(&key.key.as_str()) {
					out.push(DiagramEvent::KeyPressed(KeyPressed {
						key: key.key,
						ctrl_key: key.modifiers.ctrl,
						shift_key: key.modifiers.shift,
						alt_key: key.modifiers.alt,
						meta_key: key.modifiers.meta,
					}));
				}
			}
		}
		out
	}

	fn start_node_drag(&mut self, node: NodeKey, at: Point, layer: &mut impl VisualLayer) {
		let n = self.diagram.node_mut(node);
		let was_selected = n.is_selected();
		let was_double = n.is_double_marked();
		n.flags.set(NodeFlags::ACTIVE, true);
		layer.raise_node(self.diagram.node(node));
		layer.set_node_classes(self.diagram.node(node));

		let drag_set = if was_selected {
			self.diagram.selected_keys()
		} else {
			vec![node]
		};
		self.highlight(node, layer);
		self.gesture = Gesture::NodeDrag {
			node,
			was_selected,
			was_double,
			drag_set,
			last: at,
			moved: false,
		};
	}

	fn pointer_move(&mut self, at: Point, layer: &mut impl VisualLayer, out: &mut Vec<DiagramEvent>) {
		let mapping = self.mapping();
		match &mut self.gesture {
			Gesture::Idle => {}
			Gesture::NodeDrag {
				drag_set,
				last,
				moved,
				..
			} => {
				let (sx, sy) = (at.x - last.x, at.y - last.y);
				if sx == 0.0 && sy == 0.0 {
					return;
				}
				*last = at;
				let (dx, dy) = mapping.screen_delta_to_local(sx, sy);
				let first_move = !*moved;
				*moved = true;
				for key in drag_set.iter() {
					let node = self.diagram.node_mut(*key);
					node.translate = node.translate.offset(dx, dy);
					layer.set_translation(self.diagram.node(*key));
				}
				for link in self.diagram.reroute_touching(drag_set) {
					layer.set_link_path(self.diagram.link(link));
				}
				if first_move {
					out.push(DiagramEvent::no_node(self.diagram.selected_ids()));
				}
			}
			Gesture::Pan { last, moved } => {
				let (sx, sy) = (at.x - last.x, at.y - last.y);
				if sx == 0.0 && sy == 0.0 {
					return;
				}
				*last = at;
				*moved = true;
				let fit = mapping.user_scale_factor();
				self.viewport.current = self.viewport.current.panned(-sx / fit, -sy / fit);
				self.viewport.user_adjusted = true;
				layer.set_view_box(self.viewport.current);
			}
		}
	}

	fn pointer_up(&mut self, layer: &mut impl VisualLayer, out: &mut Vec<DiagramEvent>) {
		match std::mem::replace(&mut self.gesture, Gesture::Idle) {
			Gesture::Idle => {}
			Gesture::Pan { moved, .. } => self.end_pan(moved, layer),
			Gesture::NodeDrag {
				node,
				was_selected,
				was_double,
				moved,
				..
			} => {
				self.diagram
					.node_mut(node)
					.flags
					.set(NodeFlags::ACTIVE, false);
				layer.restore_node(self.diagram.node(node));
				layer.set_node_classes(self.diagram.node(node));

				if moved {
					// The click that follows may land outside the node.
					self.suppress_canvas_click = true;
					if !self.viewport.user_adjusted {
						self.refit(layer);
						out.push(DiagramEvent::no_node(self.diagram.selected_ids()));
					}
					return;
				}

				let double = was_selected && !was_double;
				for key in self.diagram.clear_flags() {
					layer.set_node_classes(self.diagram.node(key));
				}
				let n = self.diagram.node_mut(node);
				n.flags.set(NodeFlags::SELECTED, true);
				n.flags.set(NodeFlags::DOUBLE, double);
				layer.set_node_classes(self.diagram.node(node));
				out.push(self.node_clicked(node));
			}
		}
	}

	fn end_pan(&mut self, moved: bool, layer: &mut impl VisualLayer) {
		self.gesture = Gesture::Idle;
		self.suppress_canvas_click = moved;
		layer.set_panning(false);
	}

	fn click(
		&mut self,
		hit: Hit,
		modifiers: Modifiers,
		layer: &mut impl VisualLayer,
		out: &mut Vec<DiagramEvent>,
	) {
		let suppressed = std::mem::replace(&mut self.suppress_canvas_click, false);
		match hit {
			Hit::Node(node) if modifiers.command() => {
				for key in self.diagram.clear_double_marks() {
					layer.set_node_classes(self.diagram.node(key));
				}
				let n = self.diagram.node_mut(node);
				let selected = !n.is_selected();
				n.flags.set(NodeFlags::SELECTED, selected);
				layer.set_node_classes(self.diagram.node(node));
				if selected {
					self.highlight(node, layer);
				}
				out.push(self.node_clicked(node));
			}
			// Plain node clicks were handled on release; glyphs on press.
			Hit::Node(_) | Hit::Checkbox(_) => {}
			_ if suppressed => {}
			Hit::Edge(link) => self.mark_link_clicked(link, layer),
			Hit::Canvas => {
				for key in self.diagram.clear_flags() {
					layer.set_node_classes(self.diagram.node(key));
				}
				for key in self.diagram.clear_link_classes() {
					layer.set_link_classes(self.diagram.link(key));
				}
				out.push(DiagramEvent::no_node(Vec::new()));
			}
		}
	}

	fn mark_link_clicked(&mut self, link: LinkKey, layer: &mut impl VisualLayer) {
		let l = self.diagram.link_mut(link);
		if !l.classes.clicked {
			l.classes.clicked = true;
			layer.set_link_classes(self.diagram.link(link));
		}
	}

	fn highlight(&mut self, node: NodeKey, layer: &mut impl VisualLayer) {
		for key in self.diagram.highlight_neighbors(node) {
			layer.set_link_classes(self.diagram.link(key));
		}
	}

	fn toggle_checkbox(&mut self, key: CheckboxKey, layer: &mut impl VisualLayer, out: &mut Vec<DiagramEvent>) {
		let checkbox = self.diagram.checkbox_mut(key);
		let glyph = next_glyph(&checkbox.glyph);
		checkbox.glyph = glyph.to_string();
		let state = classify(glyph).unwrap_or(GlyphState::Unchecked);
		let checkbox = self.diagram.checkbox(key);
		layer.set_glyph(checkbox, state);

		let Some(owner) = checkbox.owner_title.clone() else {
			return;
		};
		let position = checkbox.node.map(|node| {
			let node = self.diagram.node(node);
			let bbox = checkbox.owner_bbox.unwrap_or(node.bbox);
			self.mapping().absolute_position(bbox, node.translate)
		});
		out.push(DiagramEvent::CheckboxToggled(CheckboxToggled {
			clicked_checkbox_id: owner,
			clicked_checkbox_value: state.is_checked(),
			clicked_checkbox_symbol: glyph.to_string(),
			parent_position: position,
		}));
	}

	fn wheel(&mut self, at: Point, delta_y: f64, layer: &mut impl VisualLayer) {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return;
		}
		let factor = if delta_y < 0.0 {
			self.config.zoom_in
		} else {
			self.config.zoom_out
		};
		let anchor = self.mapping().client_to_user(at);
		self.viewport.current = self.viewport.current.zoomed_about(anchor, factor);
		self.viewport.user_adjusted = true;
		layer.set_view_box(self.viewport.current);
	}

	fn refit(&mut self, layer: &mut impl VisualLayer) {
		if let Some(fit) = self.diagram.fit_view_box(self.config.fit_padding) {
			self.viewport.fitted = fit;
		}
		self.viewport.current = self.viewport.fitted;
		layer.set_view_box(self.viewport.current);
	}

	/// Back to the fitted view; automatic re-fits resume.
	pub fn reset_view(&mut self, layer: &mut impl VisualLayer) {
		self.viewport.user_adjusted = false;
		self.refit(layer);
	}

	fn node_clicked(&self, node: NodeKey) -> DiagramEvent {
		let n = self.diagram.node(node);
		DiagramEvent::NodeClicked(NodeClicked {
			clicked_node_id: Some(n.id.clone()),
			double_click: n.is_double_marked(),
			node_position: Some(self.mapping().absolute_position(n.bbox, n.translate)),
			selected_nodes: self.diagram.selected_ids(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::super::fixtures::session;
	use super::super::geometry::Translate;
	use super::*;

	const A: Hit = Hit::Node(NodeKey(0));
	const B: Hit = Hit::Node(NodeKey(1));

	fn ctrl() -> Modifiers {
		Modifiers {
			ctrl: true,
			..Default::default()
		}
	}

	fn press(hit: Hit, x: f64, y: f64) -> InputEvent {
		InputEvent::PointerDown {
			hit,
			at: Point::new(x, y),
			modifiers: Modifiers::default(),
		}
	}

	fn move_to(x: f64, y: f64) -> InputEvent {
		InputEvent::PointerMove { at: Point::new(x, y) }
	}

	fn release(x: f64, y: f64) -> InputEvent {
		InputEvent::PointerUp { at: Point::new(x, y) }
	}

	fn clicked(events: &[DiagramEvent]) -> &NodeClicked {
		match events.last() {
			Some(DiagramEvent::NodeClicked(detail)) => detail,
			other => panic!("expected nodeClicked, got {other:?}"),
		}
	}

	#[test]
	fn ctrl_click_twice_restores_selection() {
		let (mut s, mut layer) = session();
		let first = s.handle(InputEvent::Click { hit: A, modifiers: ctrl() }, &mut layer);
		assert_eq!(clicked(&first).selected_nodes, ["A"]);
		let second = s.handle(InputEvent::Click { hit: A, modifiers: ctrl() }, &mut layer);
		assert!(clicked(&second).selected_nodes.is_empty());
		assert!(s.selected_ids().is_empty());
		assert_eq!(layer.node_classes["t-node-0"], "node");
	}

	#[test]
	fn ctrl_click_clears_double_marks_and_highlights_edges() {
		let (mut s, mut layer) = session();
		for _ in 0..2 {
			s.handle(press(A, 30.0, 30.0), &mut layer);
			s.handle(release(30.0, 30.0), &mut layer);
		}
		assert!(s.diagram().node(NodeKey(0)).is_double_marked());

		let events = s.handle(InputEvent::Click { hit: B, modifiers: ctrl() }, &mut layer);
		assert!(!s.diagram().node(NodeKey(0)).is_double_marked());
		assert_eq!(clicked(&events).selected_nodes, ["A", "B"]);
		assert_eq!(layer.link_classes["t-edge-0-path"], "edge edge-target-neighbor");
	}

	#[test]
	fn ctrl_press_does_not_start_a_drag() {
		let (mut s, mut layer) = session();
		s.handle(
			InputEvent::PointerDown {
				hit: A,
				at: Point::new(30.0, 30.0),
				modifiers: ctrl(),
			},
			&mut layer,
		);
		assert!(!s.is_dragging());
	}

	#[test]
	fn release_without_movement_alternates_double_mark() {
		let (mut s, mut layer) = session();
		let mut doubles = Vec::new();
		for _ in 0..3 {
			s.handle(press(A, 30.0, 30.0), &mut layer);
			let events = s.handle(release(30.0, 30.0), &mut layer);
			let detail = clicked(&events);
			assert_eq!(detail.clicked_node_id.as_deref(), Some("A"));
			assert_eq!(detail.selected_nodes, ["A"]);
			doubles.push(detail.double_click);
		}
		assert_eq!(doubles, [false, true, false]);
		assert_eq!(layer.node_classes["t-node-0"], "node node-clicked");
	}

	#[test]
	fn click_reports_absolute_position() {
		let (mut s, mut layer) = session();
		s.handle(press(A, 30.0, 30.0), &mut layer);
		let events = s.handle(release(30.0, 30.0), &mut layer);
		assert_eq!(
			clicked(&events).node_position,
			Some(ScreenBox::new(20.0, 20.0, 72.0, 56.0))
		);
	}

	#[test]
	fn plain_click_on_other_node_replaces_selection() {
		let (mut s, mut layer) = session();
		s.handle(InputEvent::Click { hit: A, modifiers: ctrl() }, &mut layer);
		s.handle(press(B, 200.0, 140.0), &mut layer);
		let events = s.handle(release(200.0, 140.0), &mut layer);
		let detail = clicked(&events);
		assert_eq!(detail.selected_nodes, ["B"]);
		assert!(!detail.double_click);
	}

	#[test]
	fn dragging_a_selected_node_moves_the_whole_selection() {
		let (mut s, mut layer) = session();
		s.handle(InputEvent::Click { hit: A, modifiers: ctrl() }, &mut layer);
		s.handle(InputEvent::Click { hit: B, modifiers: ctrl() }, &mut layer);

		s.handle(press(A, 30.0, 30.0), &mut layer);
		s.handle(move_to(40.0, 35.0), &mut layer);
		s.handle(move_to(45.0, 25.0), &mut layer);
		s.handle(release(45.0, 25.0), &mut layer);

		let d = s.diagram();
		assert_eq!(d.node(NodeKey(0)).translate, Translate::new(15.0, -5.0));
		assert_eq!(d.node(NodeKey(1)).translate, Translate::new(15.0, -5.0));
		assert_eq!(s.selected_ids(), ["A", "B"]);
		assert_eq!(layer.translations["t-node-1"], "translate(15,-5)");
	}

	#[test]
	fn dragging_an_unselected_node_moves_only_that_node() {
		let (mut s, mut layer) = session();
		s.handle(InputEvent::Click { hit: A, modifiers: ctrl() }, &mut layer);

		s.handle(press(B, 200.0, 140.0), &mut layer);
		s.handle(move_to(190.0, 150.0), &mut layer);
		s.handle(release(190.0, 150.0), &mut layer);

		let d = s.diagram();
		assert_eq!(d.node(NodeKey(0)).translate, Translate::IDENTITY);
		assert_eq!(d.node(NodeKey(1)).translate, Translate::new(-10.0, 10.0));
		assert_eq!(s.selected_ids(), ["A"]);
		assert!(!layer.translations.contains_key("t-node-0"));
	}

	#[test]
	fn dragging_a_table_keeps_the_row_edge_attached() {
		let (mut s, mut layer) = session();
		s.handle(press(A, 30.0, 30.0), &mut layer);
		let first = s.handle(move_to(55.0, 30.0), &mut layer);
		let second = s.handle(move_to(80.0, 30.0), &mut layer);
		let end = s.handle(release(80.0, 30.0), &mut layer);

		assert_eq!(clicked(&first).clicked_node_id, None);
		assert!(second.is_empty());
		assert_eq!(clicked(&end).clicked_node_id, None);

		let link = s.diagram().link(LinkKey(0));
		assert_eq!(link.points[0], Point::new(122.0, -62.0));
		assert_eq!(link.points[3], Point::new(184.0, -13.2));
		assert!(layer.link_paths["t-edge-0-path"].starts_with("M122,-62"));
		assert_eq!(layer.raised, ["t-node-0"]);
		assert_eq!(layer.restored, ["t-node-0"]);
		assert_eq!(
			s.viewport().current,
			ViewBox::new(34.0, -16.0, 246.0, 152.0)
		);
		assert!(s.selected_ids().is_empty());
	}

	#[test]
	fn canvas_click_clears_selection_and_edge_highlights() {
		let (mut s, mut layer) = session();
		s.handle(press(A, 30.0, 30.0), &mut layer);
		s.handle(release(30.0, 30.0), &mut layer);
		s.handle(InputEvent::Click { hit: A, modifiers: Modifiers::default() }, &mut layer);
		assert_eq!(s.selected_ids(), ["A"]);

		s.handle(InputEvent::Click { hit: Hit::Edge(LinkKey(0)), modifiers: Modifiers::default() }, &mut layer);
		assert_eq!(
			layer.link_classes["t-edge-0-path"],
			"edge edge-clicked edge-source-neighbor"
		);

		s.handle(press(Hit::Canvas, 5.0, 5.0), &mut layer);
		s.handle(release(5.0, 5.0), &mut layer);
		let events = s.handle(InputEvent::Click { hit: Hit::Canvas, modifiers: Modifiers::default() }, &mut layer);
		assert_eq!(events, [DiagramEvent::no_node(vec![])]);
		assert!(s.selected_ids().is_empty());
		assert_eq!(layer.link_classes["t-edge-0-path"], "edge");
		assert_eq!(layer.node_classes["t-node-0"], "node");
	}

	#[test]
	fn pan_moves_the_viewbox_and_swallows_the_following_click() {
		let (mut s, mut layer) = session();
		s.handle(InputEvent::Click { hit: A, modifiers: ctrl() }, &mut layer);

		s.handle(press(Hit::Canvas, 100.0, 100.0), &mut layer);
		s.handle(move_to(110.0, 95.0), &mut layer);
		s.handle(release(110.0, 95.0), &mut layer);
		assert_eq!(s.viewport().current, ViewBox::new(-26.0, -11.0, 296.0, 152.0));
		assert!(s.viewport().user_adjusted);
		assert_eq!(layer.panning, [true, false]);

		let swallowed = s.handle(InputEvent::Click { hit: Hit::Canvas, modifiers: Modifiers::default() }, &mut layer);
		assert!(swallowed.is_empty());
		assert_eq!(s.selected_ids(), ["A"]);

		let cleared = s.handle(InputEvent::Click { hit: Hit::Canvas, modifiers: Modifiers::default() }, &mut layer);
		assert_eq!(cleared.len(), 1);
		assert!(s.selected_ids().is_empty());
	}

	#[test]
	fn pointer_leave_ends_a_pan() {
		let (mut s, mut layer) = session();
		s.handle(press(Hit::Canvas, 100.0, 100.0), &mut layer);
		s.handle(InputEvent::PointerLeave, &mut layer);
		s.handle(move_to(150.0, 150.0), &mut layer);
		assert_eq!(s.viewport().current, ViewBox::new(-16.0, -16.0, 296.0, 152.0));
		assert!(!s.is_dragging());
	}

	#[test]
	fn wheel_zooms_about_the_pointer_and_double_click_resets() {
		let (mut s, mut layer) = session();
		let at = Point::new(56.0, 36.0);
		let anchor = s.mapping().client_to_user(at);

		s.handle(InputEvent::Wheel { at, delta_y: -100.0 }, &mut layer);
		let zoomed = s.viewport().current;
		assert!((zoomed.width - 296.0 / 1.25).abs() < 1e-9);
		let rel_before = (anchor.x + 16.0) / 296.0;
		let rel_after = (anchor.x - zoomed.x) / zoomed.width;
		assert!((rel_before - rel_after).abs() < 1e-9);

		s.handle(InputEvent::Wheel { at, delta_y: 100.0 }, &mut layer);
		assert!((s.viewport().current.width - 296.0).abs() < 1e-9);

		s.handle(InputEvent::DoubleClick { hit: A }, &mut layer);
		assert!(s.viewport().user_adjusted);

		s.handle(InputEvent::DoubleClick { hit: Hit::Canvas }, &mut layer);
		assert_eq!(s.viewport().current, ViewBox::new(-16.0, -16.0, 296.0, 152.0));
		assert!(!s.viewport().user_adjusted);
	}

	#[test]
	fn drag_after_zoom_keeps_the_users_view() {
		let (mut s, mut layer) = session();
		s.handle(InputEvent::Wheel { at: Point::new(100.0, 70.0), delta_y: -1.0 }, &mut layer);
		let zoomed = s.viewport().current;

		s.handle(press(A, 30.0, 30.0), &mut layer);
		s.handle(move_to(40.0, 30.0), &mut layer);
		let end = s.handle(release(40.0, 30.0), &mut layer);
		assert!(end.is_empty());
		assert_eq!(s.viewport().current, zoomed);
		let moved = s.diagram().node(NodeKey(0)).translate;
		assert!((moved.dx - 8.0).abs() < 1e-9);
		assert_eq!(moved.dy, 0.0);
	}

	#[test]
	fn checkbox_press_cycles_glyph_and_reports_owner() {
		let (mut s, mut layer) = session();
		let glyph = Hit::Checkbox(CheckboxKey(0));
		let mut symbols = Vec::new();
		for _ in 0..4 {
			let events = s.handle(press(glyph, 24.0, 60.0), &mut layer);
			match events.as_slice() {
				[DiagramEvent::CheckboxToggled(detail)] => {
					assert_eq!(detail.clicked_checkbox_id, "col1");
					assert_eq!(
						detail.clicked_checkbox_value,
						detail.clicked_checkbox_symbol != "⬜"
					);
					assert_eq!(
						detail.parent_position,
						Some(ScreenBox::new(20.0, 52.0, 72.0, 24.0))
					);
					symbols.push(detail.clicked_checkbox_symbol.clone());
				}
				other => panic!("unexpected events {other:?}"),
			}
			assert!(!s.is_dragging());
			s.handle(release(24.0, 60.0), &mut layer);
		}
		assert_eq!(symbols, ["🟩", "🟥", "🟨", "⬜"]);
		assert_eq!(
			layer.glyphs["t-glyph-0"],
			("⬜".to_string(), GlyphState::Unchecked)
		);
		assert!(s.selected_ids().is_empty());
	}

	#[test]
	fn keys_are_forwarded_unless_typing_or_bare_modifier() {
		let (mut s, mut layer) = session();
		let key = |key: &str, in_form_control: bool| {
			InputEvent::Key(KeyInput {
				key: key.to_string(),
				modifiers: ctrl(),
				in_form_control,
			})
		};
		assert!(s.handle(key("a", true), &mut layer).is_empty());
		assert!(s.handle(key("Control", false), &mut layer).is_empty());
		assert_eq!(
			s.handle(key("a", false), &mut layer),
			[DiagramEvent::KeyPressed(KeyPressed {
				key: "a".into(),
				ctrl_key: true,
				shift_key: false,
				alt_key: false,
				meta_key: false,
			})]
		);
	}
}
