//! DOT to SVG layout.
//!
//! Layout itself is delegated to Graphviz compiled to WebAssembly
//! (`@viz-js/viz`), which the host page loads as a global `Viz`. Everything
//! downstream only sees the [`LayoutEngine`] trait, so tests swap in a fixture.

use std::cell::RefCell;

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::error::{DiagramError, js_error_message};

/// Turns DOT source into a Graphviz SVG document.
#[allow(async_fn_in_trait)]
pub trait LayoutEngine {
	async fn layout(&self, dot: &str) -> Result<String, DiagramError>;
}

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_namespace = Viz, js_name = instance, catch)]
	fn viz_instance() -> Result<js_sys::Promise, JsValue>;

	#[derive(Clone)]
	type VizInstance;

	#[wasm_bindgen(method, catch, js_name = renderString)]
	fn render_string(this: &VizInstance, dot: &str, options: &JsValue) -> Result<String, JsValue>;
}

/// Graphviz via the page's `Viz` global. The instance is created on first use
/// and reused afterwards.
#[derive(Default)]
pub struct VizLayout {
	instance: RefCell<Option<VizInstance>>,
}

impl VizLayout {
	pub fn new() -> Self {
		Self::default()
	}

	async fn instance(&self) -> Result<VizInstance, DiagramError> {
		if let Some(viz) = self.instance.borrow().as_ref() {
			return Ok(viz.clone());
		}
		let promise = viz_instance().map_err(|e| {
			DiagramError::Layout(format!(
				"Graphviz is not available: {}",
				js_error_message(&e)
			))
		})?;
		let viz: VizInstance = JsFuture::from(promise)
			.await
			.map_err(|e| DiagramError::Layout(js_error_message(&e)))?
			.unchecked_into();
		log::debug!("schema-viz: Graphviz instance ready");
		*self.instance.borrow_mut() = Some(viz.clone());
		Ok(viz)
	}
}

impl LayoutEngine for VizLayout {
	async fn layout(&self, dot: &str) -> Result<String, DiagramError> {
		let viz = self.instance().await?;
		let options = Object::new();
		Reflect::set(&options, &"format".into(), &"svg".into())?;
		viz.render_string(dot, &options)
			.map_err(|e| DiagramError::Layout(js_error_message(&e)))
	}
}
