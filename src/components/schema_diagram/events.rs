//! Outbound notifications for the host page.
//!
//! Each event is delivered as a bubbling DOM `CustomEvent` on the diagram
//! container, with a JSON `detail` whose field names hosts already depend on.

use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::{CustomEvent, CustomEventInit, EventTarget};

use super::error::DiagramError;
use super::geometry::ScreenBox;

/// Detail of `nodeClicked`; `clicked_node_id` is `None` for clicks on empty canvas,
/// drag movement and viewport re-fits.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeClicked {
	pub clicked_node_id: Option<String>,
	pub double_click: bool,
	pub node_position: Option<ScreenBox>,
	pub selected_nodes: Vec<String>,
}

/// Detail of `checkboxClicked`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxToggled {
	/// Title of the element owning the glyph, usually the table row.
	pub clicked_checkbox_id: String,
	pub clicked_checkbox_value: bool,
	pub clicked_checkbox_symbol: String,
	pub parent_position: Option<ScreenBox>,
}

/// Detail of `keyPress`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPressed {
	pub key: String,
	pub ctrl_key: bool,
	pub shift_key: bool,
	pub alt_key: bool,
	pub meta_key: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DiagramEvent {
	NodeClicked(NodeClicked),
	CheckboxToggled(CheckboxToggled),
	KeyPressed(KeyPressed),
}

impl DiagramEvent {
	/// The "no node" flavour of `nodeClicked`.
	pub fn no_node(selected_nodes: Vec<String>) -> Self {
		DiagramEvent::NodeClicked(NodeClicked {
			clicked_node_id: None,
			double_click: false,
			node_position: None,
			selected_nodes,
		})
	}

	/// DOM event type.
	pub fn name(&self) -> &'static str {
		match self {
			DiagramEvent::NodeClicked(_) => "nodeClicked",
			DiagramEvent::CheckboxToggled(_) => "checkboxClicked",
			DiagramEvent::KeyPressed(_) => "keyPress",
		}
	}

	pub fn detail_json(&self) -> Result<String, serde_json::Error> {
		match self {
			DiagramEvent::NodeClicked(detail) => serde_json::to_string(detail),
			DiagramEvent::CheckboxToggled(detail) => serde_json::to_string(detail),
			DiagramEvent::KeyPressed(detail) => serde_json::to_string(detail),
		}
	}
}

/// Fire `event` as a bubbling `CustomEvent` on `target`.
pub fn dispatch(target: &EventTarget, event: &DiagramEvent) -> Result<(), DiagramError> {
	let json = event
		.detail_json()
		.map_err(|e| DiagramError::Dom(e.to_string()))?;
	let detail: JsValue = js_sys::JSON::parse(&json)?;
	let init = CustomEventInit::new();
	init.set_bubbles(true);
	init.set_detail(&detail);
	let dom_event = CustomEvent::new_with_event_init_dict(event.name(), &init)?;
	target.dispatch_event(&dom_event)?;
	Ok(())
}
