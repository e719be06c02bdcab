//! Shared test data: a Graphviz rendering of two tables joined by one row edge,
//! a recording visual layer and a canned layout engine.

use std::cell::Cell;
use std::collections::HashMap;

use super::checkbox::GlyphState;
use super::config::DiagramConfig;
use super::controller::InteractionSession;
use super::error::DiagramError;
use super::geometry::{Point, ScreenBox, ViewBox};
use super::layout::LayoutEngine;
use super::model::{Checkbox, Link, Node};
use super::rewrite::{RewriteOptions, rewrite};
use super::visual::VisualLayer;

/// `digraph { A:col1 -> B:col2 }` with `A` top-left and `B` bottom-right.
pub(crate) const TWO_TABLES_SVG: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN"
 "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<!-- Generated by graphviz version 9.0.0 -->
<!-- Title: schema Pages: 1 -->
<svg width="262pt" height="120pt"
 viewBox="0.00 0.00 262.00 120.00" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<g id="graph0" class="graph" transform="scale(1 1) rotate(0) translate(4 116)">
<title>schema</title>
<polygon fill="white" stroke="none" points="-4,4 -4,-116 258,-116 258,4 -4,4"/>
<!-- A -->
<g id="node1" class="node">
<title>A</title>
<polygon fill="none" stroke="black" points="0,-56 0,-112 72,-112 72,-56 0,-56"/>
<text text-anchor="start" x="31.5" y="-91.8" font-family="Times,serif" font-size="14.00">A</text>
<g id="a_node1_0"><a xlink:title="col1">
<polygon fill="none" stroke="black" points="0,-56 0,-80 72,-80 72,-56 0,-56"/>
<text text-anchor="start" x="4" y="-63.8" font-family="Times,serif" font-size="14.00">⬜</text>
<text text-anchor="start" x="20" y="-63.8" font-family="Times,serif" font-size="14.00">col1</text>
</a>
</g>
</g>
<!-- B -->
<g id="node2" class="node">
<title>B</title>
<polygon fill="none" stroke="black" points="184,0 184,-56 256,-56 256,0 184,0"/>
<text text-anchor="start" x="215.5" y="-35.8" font-family="Times,serif" font-size="14.00">B</text>
<g id="a_node2_0"><a xlink:title="col2">
<polygon fill="none" stroke="black" points="184,0 184,-24 256,-24 256,0 184,0"/>
<text text-anchor="start" x="188" y="-7.8" font-family="Times,serif" font-size="14.00">col2</text>
</a>
</g>
</g>
<!-- A&#45;&gt;B -->
<g id="edge1" class="edge">
<title>A:col1&#45;&gt;B:col2</title>
<path fill="none" stroke="black" d="M72,-68C117.5,-68 133.5,-12 173.86,-12"/>
<polygon fill="black" stroke="black" points="173.86,-15.5 183.86,-12 173.86,-8.5 173.86,-15.5"/>
</g>
</g>
</svg>
"#;

/// Remembers the last value pushed for every DOM id.
#[derive(Debug, Default)]
pub(crate) struct RecordingLayer {
	pub(crate) translations: HashMap<String, String>,
	pub(crate) node_classes: HashMap<String, String>,
	pub(crate) link_paths: HashMap<String, String>,
	pub(crate) link_classes: HashMap<String, String>,
	pub(crate) raised: Vec<String>,
	pub(crate) restored: Vec<String>,
	pub(crate) view_boxes: Vec<ViewBox>,
	pub(crate) glyphs: HashMap<String, (String, GlyphState)>,
	pub(crate) panning: Vec<bool>,
}

impl VisualLayer for RecordingLayer {
	fn set_translation(&mut self, node: &Node) {
		self.translations
			.insert(node.dom_id.clone(), node.translate.to_string());
	}

	fn set_node_classes(&mut self, node: &Node) {
		self.node_classes
			.insert(node.dom_id.clone(), node.class_attr());
	}

	fn set_link_path(&mut self, link: &Link) {
		self.link_paths.insert(link.dom_id.clone(), link.path.clone());
		self.link_paths
			.insert(link.hitbox_dom_id.clone(), link.path.clone());
	}

	fn set_link_classes(&mut self, link: &Link) {
		self.link_classes
			.insert(link.dom_id.clone(), link.class_attr());
	}

	fn raise_node(&mut self, node: &Node) {
		self.raised.push(node.dom_id.clone());
	}

	fn restore_node(&mut self, node: &Node) {
		self.restored.push(node.dom_id.clone());
	}

	fn set_view_box(&mut self, view_box: ViewBox) {
		self.view_boxes.push(view_box);
	}

	fn set_glyph(&mut self, checkbox: &Checkbox, state: GlyphState) {
		self.glyphs
			.insert(checkbox.dom_id.clone(), (checkbox.glyph.clone(), state));
	}

	fn set_panning(&mut self, panning: bool) {
		self.panning.push(panning);
	}
}

/// Session over [`TWO_TABLES_SVG`] (prefix `t`) shown at its natural size:
/// the fitted viewBox `-16 -16 296 152` fills a 296x152 client rect at the
/// page origin, so local `(x, y)` sits at client `(x + 20, y + 132)`.
pub(crate) fn session() -> (InteractionSession, RecordingLayer) {
	let config = DiagramConfig::default();
	let out = rewrite(
		TWO_TABLES_SVG,
		&RewriteOptions {
			prefix: "t",
			config: &config,
			selected: &[],
		},
	)
	.unwrap();
	let mut session = InteractionSession::new(out.diagram, out.view_box, config.viewport);
	session.set_screen(ScreenBox::new(0.0, 0.0, 296.0, 152.0), Point::default());
	(session, RecordingLayer::default())
}

/// Layout engine answering every call with the same canned result.
pub(crate) struct FixtureEngine {
	reply: Result<String, DiagramError>,
	calls: Cell<usize>,
}

impl FixtureEngine {
	pub(crate) fn ok(svg: &str) -> Self {
		Self {
			reply: Ok(svg.to_string()),
			calls: Cell::new(0),
		}
	}

	pub(crate) fn err(message: &str) -> Self {
		Self {
			reply: Err(DiagramError::Layout(message.to_string())),
			calls: Cell::new(0),
		}
	}

	pub(crate) fn calls(&self) -> usize {
		self.calls.get()
	}
}

impl LayoutEngine for FixtureEngine {
	async fn layout(&self, _dot: &str) -> Result<String, DiagramError> {
		self.calls.set(self.calls.get() + 1);
		self.reply.clone()
	}
}
