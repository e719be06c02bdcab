//! Capability interface between the interaction logic and whatever draws the diagram.
//!
//! The controller mutates the [`Diagram`](super::model::Diagram) and then tells
//! the visual layer which entities changed. The browser implementation lives in
//! [`super::dom`]; tests use a recording implementation.

use super::checkbox::GlyphState;
use super::geometry::ViewBox;
use super::model::{Checkbox, Link, Node};

pub trait VisualLayer {
	/// Node translation changed.
	fn set_translation(&mut self, node: &Node);
	/// Node selection, double-mark or active flag changed.
	fn set_node_classes(&mut self, node: &Node);
	/// Connector geometry changed (visible path and hitbox).
	fn set_link_path(&mut self, link: &Link);
	fn set_link_classes(&mut self, link: &Link);
	/// Draw the node above everything else, remembering where it was.
	fn raise_node(&mut self, node: &Node);
	/// Put a raised node back at its remembered stacking position.
	fn restore_node(&mut self, node: &Node);
	fn set_view_box(&mut self, view_box: ViewBox);
	fn set_glyph(&mut self, checkbox: &Checkbox, state: GlyphState);
	/// Canvas pan started or ended (cursor feedback).
	fn set_panning(&mut self, panning: bool);
}
