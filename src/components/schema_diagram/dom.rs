//! Browser implementation of [`VisualLayer`] plus DOM hit testing.
//!
//! Elements are looked up by the prefixed ids the rewrite pass assigned, so
//! nothing here holds on to nodes that a re-render may have replaced. Missing
//! elements are logged and skipped.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement};

use super::checkbox::GlyphState;
use super::geometry::{Point, ScreenBox, ViewBox};
use super::model::{Checkbox, Diagram, Hit, Link, Node};
use super::visual::VisualLayer;

pub struct DomLayer {
	document: Document,
	container: HtmlElement,
	svg_id: String,
	/// Next sibling of every raised node, `None` when it was the last child.
	raised_from: HashMap<String, Option<web_sys::Node>>,
}

impl DomLayer {
	pub fn new(document: Document, container: HtmlElement, prefix: &str) -> Self {
		Self {
			document,
			container,
			svg_id: format!("{prefix}-svg"),
			raised_from: HashMap::new(),
		}
	}

	fn element(&self, id: &str) -> Option<Element> {
		let el = self.document.get_element_by_id(id);
		if el.is_none() {
			log::warn!("schema-viz: element #{id} is gone");
		}
		el
	}

	fn set_attr(&self, id: &str, name: &str, value: &str) {
		if let Some(el) = self.element(id)
			&& let Err(err) = el.set_attribute(name, value)
		{
			log::warn!("schema-viz: cannot set {name} on #{id}: {err:?}");
		}
	}

	/// The rendered `<svg>`, if a diagram is currently mounted.
	pub fn svg(&self) -> Option<Element> {
		self.document.get_element_by_id(&self.svg_id)
	}

	/// Client rectangle of the `<svg>` and the page scroll offset.
	pub fn screen(&self) -> Option<(ScreenBox, Point)> {
		let svg = self.svg()?;
		let rect = svg.get_bounding_client_rect();
		let window = web_sys::window()?;
		let scroll = Point::new(
			window.scroll_x().unwrap_or(0.0),
			window.scroll_y().unwrap_or(0.0),
		);
		Some((
			ScreenBox::new(rect.left(), rect.top(), rect.width(), rect.height()),
			scroll,
		))
	}

	/// Forget raised-node bookkeeping; the elements it refers to were replaced.
	pub fn reset(&mut self) {
		self.raised_from.clear();
	}
}

impl VisualLayer for DomLayer {
	fn set_translation(&mut self, node: &Node) {
		self.set_attr(&node.dom_id, "transform", &node.translate.to_string());
	}

	fn set_node_classes(&mut self, node: &Node) {
		self.set_attr(&node.dom_id, "class", &node.class_attr());
	}

	fn set_link_path(&mut self, link: &Link) {
		self.set_attr(&link.dom_id, "d", &link.path);
		self.set_attr(&link.hitbox_dom_id, "d", &link.path);
	}

	fn set_link_classes(&mut self, link: &Link) {
		self.set_attr(&link.dom_id, "class", &link.class_attr());
	}

	fn raise_node(&mut self, node: &Node) {
		let Some(el) = self.element(&node.dom_id) else {
			return;
		};
		let Some(parent) = el.parent_node() else {
			return;
		};
		self.raised_from
			.insert(node.dom_id.clone(), el.next_sibling());
		if let Err(err) = parent.append_child(&el) {
			log::warn!("schema-viz: cannot raise #{}: {err:?}", node.dom_id);
		}
	}

	fn restore_node(&mut self, node: &Node) {
		let Some(next) = self.raised_from.remove(&node.dom_id) else {
			return;
		};
		let Some(el) = self.element(&node.dom_id) else {
			return;
		};
		let Some(parent) = el.parent_node() else {
			return;
		};
		let next = next.filter(|n| n.parent_node().as_ref() == Some(&parent));
		if let Err(err) = parent.insert_before(&el, next.as_ref()) {
			log::warn!("schema-viz: cannot restore #{}: {err:?}", node.dom_id);
		}
	}

	fn set_view_box(&mut self, view_box: ViewBox) {
		self.set_attr(&self.svg_id, "viewBox", &view_box.to_string());
	}

	fn set_glyph(&mut self, checkbox: &Checkbox, state: GlyphState) {
		let Some(el) = self.element(&checkbox.dom_id) else {
			return;
		};
		el.set_text_content(Some(&checkbox.glyph));
		if let Err(err) = el.set_attribute("class", state.class()) {
			log::warn!("schema-viz: cannot restyle #{}: {err:?}", checkbox.dom_id);
		}
	}

	fn set_panning(&mut self, panning: bool) {
		let style = self.container.style();
		let result = if panning {
			style.set_property("cursor", "grabbing")
		} else {
			style.remove_property("cursor").map(|_| ())
		};
		if let Err(err) = result {
			log::warn!("schema-viz: cannot change cursor: {err:?}");
		}
	}
}

/// Work out which diagram entity an event target belongs to.
///
/// Glyphs win over nodes (a glyph sits inside a node) and anything that is
/// neither a node nor an edge counts as empty canvas.
pub fn resolve_hit(target: Option<EventTarget>, diagram: &Diagram) -> Hit {
	let Some(el) = target.and_then(|t| t.dyn_into::<Element>().ok()) else {
		return Hit::Canvas;
	};
	["text.checkbox", "g.node", "path.edge"]
		.iter()
		.filter_map(|selector| el.closest(selector).ok().flatten())
		.find_map(|found| diagram.hit_for_dom(&found.id()))
		.unwrap_or(Hit::Canvas)
}

/// True when keyboard focus is somewhere the user is typing.
pub fn focus_in_form_control(document: &Document) -> bool {
	let Some(active) = document.active_element() else {
		return false;
	};
	if matches!(
		active.tag_name().to_ascii_uppercase().as_str(),
		"INPUT" | "TEXTAREA" | "SELECT"
	) {
		return true;
	}
	active
		.dyn_ref::<HtmlElement>()
		.is_some_and(HtmlElement::is_content_editable)
}
