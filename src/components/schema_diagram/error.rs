//! Error type shared by the render pipeline, the layout binding and the DOM mount.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Everything that can go wrong between receiving DOT text and showing an interactive diagram.
///
/// None of these escape to the host as exceptions: the mount logs them and degrades to an
/// empty area or an inline error banner.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DiagramError {
	/// The container element the diagram should live in does not exist.
	#[error("cannot find HTML element with id `{0}`")]
	MissingMount(String),
	/// The layout engine rejected the DOT text (usually a syntax error).
	#[error("{0}")]
	Layout(String),
	/// The layout engine produced markup that is not well-formed SVG.
	#[error("layout engine returned invalid SVG: {0}")]
	SvgParse(String),
	/// The SVG has no `g.graph` group to hang interactive content on.
	#[error("rendered SVG has no graph group")]
	MissingGraph,
	/// A browser API call failed.
	#[error("DOM operation failed: {0}")]
	Dom(String),
}

impl From<roxmltree::Error> for DiagramError {
	fn from(err: roxmltree::Error) -> Self {
		DiagramError::SvgParse(err.to_string())
	}
}

impl From<JsValue> for DiagramError {
	fn from(value: JsValue) -> Self {
		DiagramError::Dom(js_error_message(&value))
	}
}

/// Best-effort human readable text for a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
	if let Some(text) = value.as_string() {
		return text;
	}
	if let Some(err) = value.dyn_ref::<js_sys::Error>() {
		return String::from(err.message());
	}
	format!("{value:?}")
}
