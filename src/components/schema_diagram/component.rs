//! Leptos component wrapping a [`DiagramMount`].
//!
//! The component renders the container `<div>` and, once it is in the
//! document, attaches a mount to it. Every change of the `dot` signal
//! re-renders the diagram. Dropping the component drops the mount, which
//! unregisters its listeners.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use super::config::DiagramConfig;
use super::error::DiagramError;
use super::mount::DiagramMount;

/// Shared access to the mount behind a [`SchemaDiagram`], for export buttons
/// and other host controls.
#[derive(Clone, Default)]
pub struct DiagramRef(Rc<RefCell<Option<DiagramMount>>>);

impl DiagramRef {
	pub fn new() -> Self {
		Self::default()
	}

	fn set(&self, mount: DiagramMount) {
		*self.0.borrow_mut() = Some(mount);
	}

	fn get(&self) -> Option<DiagramMount> {
		self.0.borrow().clone()
	}

	/// Download the current view; see [`DiagramMount::export_current_view`].
	pub fn export_current_view(&self, document_name: Option<&str>) -> Result<String, DiagramError> {
		self.get()
			.ok_or(DiagramError::MissingGraph)?
			.export_current_view(document_name)
	}

	pub fn selected_ids(&self) -> Vec<String> {
		self.get().map(|m| m.selected_ids()).unwrap_or_default()
	}
}

/// Renders DOT text as an interactive schema diagram.
///
/// Interaction events (`nodeClicked`, `checkboxClicked`, `keyPress`) bubble
/// from the container as DOM `CustomEvent`s. Set `fullscreen = true` to fill
/// the viewport; otherwise the diagram fills its parent.
#[component]
pub fn SchemaDiagram(
	#[prop(into)] dot: Signal<String>,
	#[prop(into, default = "schema-diagram".to_string())] container_id: String,
	#[prop(optional)] config: Option<DiagramConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(optional)] diagram_ref: Option<DiagramRef>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let diagram_ref = diagram_ref.unwrap_or_default();
	let id = container_id.clone();

	Effect::new(move |_| {
		let dot = dot.get();
		let mount = match diagram_ref.get() {
			Some(mount) => mount,
			None => match DiagramMount::attach(&id, config.clone()) {
				Ok(mount) => {
					diagram_ref.set(mount.clone());
					mount
				}
				Err(err) => {
					log::error!("schema-viz: {err}");
					return;
				}
			},
		};
		mount.render(&dot);
	});

	let style = if fullscreen {
		"width: 100vw; height: 100vh; overflow: hidden;"
	} else {
		"width: 100%; height: 100%; overflow: hidden;"
	};

	view! { <div id=container_id class="schema-diagram-container" style=style></div> }
}
