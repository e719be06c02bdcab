//! DOT text to mounted diagram.
//!
//! [`render_dot`] is the only asynchronous step: it waits for the layout
//! engine and then runs the pure rewrite pass. [`DiagramSlot`] sits around it
//! and makes sure a slow render that finishes after a newer one started is
//! thrown away instead of replacing the newer result.

use super::config::DiagramConfig;
use super::controller::InteractionSession;
use super::error::DiagramError;
use super::layout::LayoutEngine;
use super::rewrite::{RewriteOptions, Rewritten, push_text, rewrite};
use super::style::DiagramStyle;

/// Result of one render before it is applied to the page.
#[derive(Debug)]
pub enum RenderOutcome {
	/// DOT text was empty; the area should simply be blank.
	Cleared,
	Rendered(Box<Rewritten>),
	Failed(DiagramError),
}

/// Lay out `dot` and build the interactive diagram from the result.
pub async fn render_dot<E: LayoutEngine>(
	engine: &E,
	dot: &str,
	opts: &RewriteOptions<'_>,
) -> RenderOutcome {
	if dot.trim().is_empty() {
		log::debug!("schema-viz: empty DOT, clearing {}", opts.prefix);
		return RenderOutcome::Cleared;
	}
	let svg = match engine.layout(dot).await {
		Ok(svg) => svg,
		Err(err) => {
			log::error!("schema-viz: layout failed: {err}");
			return RenderOutcome::Failed(err);
		}
	};
	match rewrite(&svg, opts) {
		Ok(rewritten) => {
			log::info!(
				"schema-viz: rendered {} nodes and {} links into {}",
				rewritten.diagram.node_count(),
				rewritten.diagram.link_count(),
				opts.prefix
			);
			RenderOutcome::Rendered(Box::new(rewritten))
		}
		Err(err) => {
			log::error!("schema-viz: cannot make layout output interactive: {err}");
			RenderOutcome::Failed(err)
		}
	}
}

/// Inline HTML shown in place of the diagram when rendering failed.
pub fn error_banner(err: &DiagramError, style: &DiagramStyle) -> String {
	let mut html = format!(
		r#"<div class="schema-diagram-error" style="color: {}">Please check DOT syntax.<br>"#,
		style.error.to_css()
	);
	push_text(&mut html, &err.to_string());
	html.push_str("</div>");
	html
}

/// Identifies one render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// What the mount should put in the container.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
	/// A newer render was started; leave the container alone.
	Stale,
	Cleared,
	Mounted { markup: String },
	Failed { banner: String },
}

/// Owns the live session of one diagram area across re-renders.
#[derive(Debug, Default)]
pub struct DiagramSlot {
	generation: u64,
	session: Option<InteractionSession>,
	/// Selection carried from the last discarded session into the next render.
	retained_selection: Vec<String>,
}

impl DiagramSlot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a render: drops the current session and returns the ticket plus
	/// the identifiers that should come back selected.
	pub fn begin(&mut self) -> (Ticket, Vec<String>) {
		self.generation += 1;
		if let Some(session) = self.session.take() {
			self.retained_selection = session.selected_ids();
		}
		(Ticket(self.generation), self.retained_selection.clone())
	}

	pub fn apply(&mut self, ticket: Ticket, outcome: RenderOutcome, config: &DiagramConfig) -> Applied {
		if ticket.0 != self.generation {
			log::debug!(
				"schema-viz: dropping render {} superseded by {}",
				ticket.0,
				self.generation
			);
			return Applied::Stale;
		}
		match outcome {
			RenderOutcome::Cleared => {
				self.retained_selection.clear();
				Applied::Cleared
			}
			RenderOutcome::Failed(err) => Applied::Failed {
				banner: error_banner(&err, &config.style),
			},
			RenderOutcome::Rendered(rewritten) => {
				let Rewritten {
					markup,
					diagram,
					view_box,
				} = *rewritten;
				self.session = Some(InteractionSession::new(diagram, view_box, config.viewport.clone()));
				Applied::Mounted { markup }
			}
		}
	}

	pub fn session(&self) -> Option<&InteractionSession> {
		self.session.as_ref()
	}

	pub fn session_mut(&mut self) -> Option<&mut InteractionSession> {
		self.session.as_mut()
	}
}
