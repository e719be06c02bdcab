//! schema-viz: interactive database schema diagrams from Graphviz DOT.
//!
//! This crate turns Graphviz-rendered SVG into an editable diagram with
//! draggable tables, row-anchored connectors, selection, checkbox glyphs and
//! pan/zoom, reporting every interaction to the host page as DOM events.
//! Rust hosts use the [`SchemaDiagram`] component; JavaScript hosts use
//! [`DiagramHandle`].

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::wasm_bindgen;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::schema_diagram::{
	DiagramConfig, DiagramError, DiagramEvent, DiagramHandle, DiagramMount, DiagramRef,
	SchemaDiagram,
};

/// Initialize logging and panic hooks for the WASM target.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("schema-viz: logging initialized");
}

/// Text of the `<script>` element with the given id.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load DOT text from a script element with id="graph-dot".
fn load_dot() -> String {
	match script_text("graph-dot") {
		Some(dot) => {
			info!("schema-viz: loaded {} bytes of DOT", dot.len());
			dot
		}
		None => {
			warn!("schema-viz: no #graph-dot script, starting empty");
			String::new()
		}
	}
}

/// Load an optional JSON config override from a script element with id="diagram-config".
fn load_config() -> DiagramConfig {
	let Some(json_text) = script_text("diagram-config") else {
		return DiagramConfig::default();
	};
	match DiagramConfig::from_json(&json_text) {
		Ok(config) => config,
		Err(e) => {
			warn!("schema-viz: failed to parse diagram config: {}", e);
			DiagramConfig::default()
		}
	}
}

/// Main application component.
/// Loads DOT and configuration from the DOM and renders the interactive diagram.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let dot = RwSignal::new(load_dot());
	let config = load_config();
	let diagram = DiagramRef::new();
	let exporter = diagram.clone();

	let on_export = move |_| {
		if let Err(e) = exporter.export_current_view(None) {
			warn!("schema-viz: export failed: {}", e);
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Schema diagram" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<SchemaDiagram dot=dot config=config fullscreen=true diagram_ref=diagram />
			<div class="graph-overlay">
				<p class="subtitle">
					"Drag tables to move them. Ctrl-click to select several. Scroll to zoom. Drag background to pan. Double-click background to fit."
				</p>
				<button on:click=on_export>"Export SVG"</button>
			</div>
		</div>
	}
}
