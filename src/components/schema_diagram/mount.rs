//! Glue between one container element and its interaction session.
//!
//! A [`DiagramMount`] owns the DOM listeners, the [`DiagramSlot`] and the
//! [`DomLayer`]. Listeners only hold weak references, and they are removed
//! when the mount is dropped, so a host can create and discard mounts freely.
//! [`DiagramHandle`] exposes the same thing to JavaScript hosts.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use wasm_bindgen::prelude::*;
use web_sys::{
	AddEventListenerOptions, Document, Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent,
	WheelEvent,
};

use super::config::DiagramConfig;
use super::controller::{InputEvent, KeyInput, Modifiers};
use super::dom::{DomLayer, focus_in_form_control, resolve_hit};
use super::error::DiagramError;
use super::events::{DiagramEvent, dispatch};
use super::export::{download_svg, sanitize_document_name};
use super::geometry::Point;
use super::layout::VizLayout;
use super::model::Diagram;
use super::pipeline::{Applied, DiagramSlot, render_dot};
use super::rewrite::RewriteOptions;

static NEXT_MOUNT: AtomicUsize = AtomicUsize::new(0);

struct Listener {
	target: EventTarget,
	kind: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

struct MountState {
	slot: DiagramSlot,
	layer: DomLayer,
}

struct MountInner {
	document: Document,
	container: HtmlElement,
	prefix: String,
	config: DiagramConfig,
	engine: Rc<VizLayout>,
	state: RefCell<MountState>,
	listeners: RefCell<Vec<Listener>>,
}

impl Drop for MountInner {
	fn drop(&mut self) {
		for listener in self.listeners.borrow_mut().drain(..) {
			let _ = listener
				.target
				.remove_event_listener_with_callback(listener.kind, listener.callback.as_ref().unchecked_ref());
		}
		log::debug!("schema-viz: detached {}", self.prefix);
	}
}

/// An interactive diagram living inside one container element.
#[derive(Clone)]
pub struct DiagramMount(Rc<MountInner>);

impl DiagramMount {
	/// Attach to the element with id `container_id`.
	pub fn attach(container_id: &str, config: DiagramConfig) -> Result<Self, DiagramError> {
		let window = web_sys::window().ok_or_else(|| DiagramError::Dom("no window".into()))?;
		let document = window
			.document()
			.ok_or_else(|| DiagramError::Dom("no document".into()))?;
		let container: HtmlElement = document
			.get_element_by_id(container_id)
			.and_then(|el| el.dyn_into().ok())
			.ok_or_else(|| DiagramError::MissingMount(container_id.to_string()))?;

		let prefix = format!("sd{}", NEXT_MOUNT.fetch_add(1, Ordering::Relaxed));
		let inner = Rc::new(MountInner {
			document: document.clone(),
			container: container.clone(),
			state: RefCell::new(MountState {
				slot: DiagramSlot::new(),
				layer: DomLayer::new(document.clone(), container.clone(), &prefix),
			}),
			prefix,
			config,
			engine: Rc::new(VizLayout::new()),
			listeners: RefCell::new(Vec::new()),
		});

		let weak = Rc::downgrade(&inner);
		let mut listeners = Vec::new();
		for kind in ["mousedown", "mouseleave", "click", "dblclick"] {
			listeners.push(listen(&container, kind, false, &weak)?);
		}
		listeners.push(listen(&container, "wheel", true, &weak)?);
		for kind in ["mousemove", "mouseup"] {
			listeners.push(listen(&window, kind, false, &weak)?);
		}
		listeners.push(listen(&document, "keydown", false, &weak)?);
		*inner.listeners.borrow_mut() = listeners;

		log::info!(
			"schema-viz: attached {} to #{container_id}",
			inner.prefix
		);
		Ok(Self(inner))
	}

	/// Replace the diagram with a fresh rendering of `dot`.
	///
	/// The previous diagram disappears immediately; the new one (or an error
	/// banner) appears once layout finishes. Nodes selected before keep their
	/// selection when they still exist.
	pub fn render(&self, dot: &str) {
		let inner = &self.0;
		let (ticket, selected) = {
			let mut state = inner.state.borrow_mut();
			state.layer.reset();
			state.slot.begin()
		};
		inner.container.set_inner_html("");

		let weak = Rc::downgrade(inner);
		let engine = inner.engine.clone();
		let config = inner.config.clone();
		let prefix = inner.prefix.clone();
		let dot = dot.to_string();
		wasm_bindgen_futures::spawn_local(async move {
			let opts = RewriteOptions {
				prefix: &prefix,
				config: &config,
				selected: &selected,
			};
			let outcome = render_dot(engine.as_ref(), &dot, &opts).await;
			let Some(inner) = weak.upgrade() else {
				log::debug!("schema-viz: {prefix} was detached while rendering");
				return;
			};
			let applied = inner
				.state
				.borrow_mut()
				.slot
				.apply(ticket, outcome, &inner.config);
			match applied {
				Applied::Stale => {}
				Applied::Cleared => inner.container.set_inner_html(""),
				Applied::Mounted { markup } | Applied::Failed { banner: markup } => {
					inner.container.set_inner_html(&markup)
				}
			}
		});
	}

	/// Download the diagram as currently shown. Returns the file name.
	pub fn export_current_view(&self, document_name: Option<&str>) -> Result<String, DiagramError> {
		let inner = &self.0;
		let svg = inner
			.state
			.borrow()
			.layer
			.svg()
			.ok_or(DiagramError::MissingGraph)?;
		let default = &inner.config.export.document_name;
		let name = sanitize_document_name(document_name.unwrap_or(default.as_str()), default);
		download_svg(&svg, &name, inner.config.export.revoke_delay_ms)
	}

	/// Identifiers of the currently selected nodes.
	pub fn selected_ids(&self) -> Vec<String> {
		self.0
			.state
			.borrow()
			.slot
			.session()
			.map(|s| s.selected_ids())
			.unwrap_or_default()
	}
}

fn listen(
	target: &EventTarget,
	kind: &'static str,
	active: bool,
	mount: &Weak<MountInner>,
) -> Result<Listener, DiagramError> {
	let mount = mount.clone();
	let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
		if let Some(inner) = mount.upgrade() {
			inner.on_dom_event(kind, &event);
		}
	});
	if active {
		let options = AddEventListenerOptions::new();
		options.set_passive(false);
		target.add_event_listener_with_callback_and_add_event_listener_options(
			kind,
			callback.as_ref().unchecked_ref(),
			&options,
		)?;
	} else {
		target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
	}
	Ok(Listener {
		target: target.clone(),
		kind,
		callback,
	})
}

fn modifiers(event: &MouseEvent) -> Modifiers {
	Modifiers {
		ctrl: event.ctrl_key(),
		shift: event.shift_key(),
		alt: event.alt_key(),
		meta: event.meta_key(),
	}
}

fn client_point(event: &MouseEvent) -> Point {
	Point::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

impl MountInner {
	fn on_dom_event(&self, kind: &str, event: &Event) {
		let outbound = {
			let Ok(mut state) = self.state.try_borrow_mut() else {
				log::debug!("schema-viz: ignoring nested {kind}");
				return;
			};
			let MountState { slot, layer } = &mut *state;
			let Some(session) = slot.session_mut() else {
				return;
			};
			let Some(input) = self.input_event(kind, event, session.diagram()) else {
				return;
			};
			if let Some((client, scroll)) = layer.screen() {
				session.set_screen(client, scroll);
			}
			session.handle(input, layer)
		};
		self.publish(&outbound);
	}

	fn input_event(&self, kind: &str, event: &Event, diagram: &Diagram) -> Option<InputEvent> {
		if kind == "keydown" {
			let key = event.dyn_ref::<KeyboardEvent>()?;
			return Some(InputEvent::Key(KeyInput {
				key: key.key(),
				modifiers: Modifiers {
					ctrl: key.ctrl_key(),
					shift: key.shift_key(),
					alt: key.alt_key(),
					meta: key.meta_key(),
				},
				in_form_control: focus_in_form_control(&self.document),
			}));
		}

		let mouse = event.dyn_ref::<MouseEvent>()?;
		let input = match kind {
			"mousedown" => {
				if mouse.button() != 0 {
					return None;
				}
				let hit = resolve_hit(event.target(), diagram);
				// Keeps text from being selected while dragging.
				event.prevent_default();
				InputEvent::PointerDown {
					hit,
					at: client_point(mouse),
					modifiers: modifiers(mouse),
				}
			}
			"mousemove" => InputEvent::PointerMove {
				at: client_point(mouse),
			},
			"mouseup" => InputEvent::PointerUp {
				at: client_point(mouse),
			},
			"mouseleave" => InputEvent::PointerLeave,
			"click" => InputEvent::Click {
				hit: resolve_hit(event.target(), diagram),
				modifiers: modifiers(mouse),
			},
			"dblclick" => {
				event.prevent_default();
				InputEvent::DoubleClick {
					hit: resolve_hit(event.target(), diagram),
				}
			}
			"wheel" => {
				let wheel = event.dyn_ref::<WheelEvent>()?;
				event.prevent_default();
				InputEvent::Wheel {
					at: client_point(mouse),
					delta_y: wheel.delta_y(),
				}
			}
			_ => return None,
		};
		Some(input)
	}

	fn publish(&self, events: &[DiagramEvent]) {
		for event in events {
			log::debug!("schema-viz: {} from {}", event.name(), self.prefix);
			if let Err(err) = dispatch(&self.container, event) {
				log::warn!("schema-viz: cannot dispatch {}: {err}", event.name());
			}
		}
	}
}

/// JavaScript-facing handle to one diagram.
///
/// Failures never surface as exceptions: a missing container leaves an inert
/// handle that logs and ignores calls, and an invalid config falls back to
/// the defaults.
///
/// ```js
/// const diagram = new DiagramHandle("graph", null);
/// diagram.render("digraph { a -> b }");
/// document.getElementById("graph").addEventListener("nodeClicked", e => console.log(e.detail));
/// ```
#[wasm_bindgen]
pub struct DiagramHandle {
	mount: Option<DiagramMount>,
}

#[wasm_bindgen]
impl DiagramHandle {
	/// Attach to the element with id `container_id`, optionally overriding defaults with JSON config.
	#[wasm_bindgen(constructor)]
	pub fn new(container_id: &str, config_json: Option<String>) -> DiagramHandle {
		let config = handle_config(config_json.as_deref());
		match DiagramMount::attach(container_id, config) {
			Ok(mount) => DiagramHandle { mount: Some(mount) },
			Err(e) => {
				log::error!("schema-viz: {e}");
				DiagramHandle { mount: None }
			}
		}
	}

	/// Render new DOT text; an empty string clears the diagram.
	pub fn render(&self, dot: &str) {
		match &self.mount {
			Some(mount) => mount.render(dot),
			None => log::warn!("schema-viz: render ignored, diagram is not attached"),
		}
	}

	/// Download the current view as SVG and return the file name, or
	/// `undefined` when nothing could be exported.
	#[wasm_bindgen(js_name = exportCurrentView)]
	pub fn export_current_view(&self, document_name: Option<String>) -> Option<String> {
		let Some(mount) = &self.mount else {
			log::warn!("schema-viz: export ignored, diagram is not attached");
			return None;
		};
		match mount.export_current_view(document_name.as_deref()) {
			Ok(filename) => Some(filename),
			Err(e) => {
				log::error!("schema-viz: export failed: {e}");
				None
			}
		}
	}

	/// Identifiers of the currently selected nodes.
	#[wasm_bindgen(js_name = selectedNodes)]
	pub fn selected_nodes(&self) -> Vec<String> {
		self.mount
			.as_ref()
			.map(DiagramMount::selected_ids)
			.unwrap_or_default()
	}
}

/// Config for a JavaScript host; blank means defaults, invalid JSON is logged and ignored.
fn handle_config(config_json: Option<&str>) -> DiagramConfig {
	match config_json {
		Some(text) if !text.trim().is_empty() => DiagramConfig::from_json(text).unwrap_or_else(|e| {
			log::error!("schema-viz: invalid diagram config, using defaults: {e}");
			DiagramConfig::default()
		}),
		_ => DiagramConfig::default(),
	}
}
