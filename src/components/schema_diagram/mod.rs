//! Interactive schema diagrams from Graphviz DOT.
//!
//! DOT text is laid out by Graphviz (the page's `Viz` global) and the static
//! SVG is rewritten into an interactive one:
//! - Tables can be dragged, alone or as a selection, with row-anchored
//!   connectors following them
//! - Click, Ctrl/Cmd-click and repeated clicks select and double-mark tables
//! - Checkbox glyphs inside labels toggle through a small color palette
//! - Wheel zooms about the pointer, dragging the background pans
//! - Interactions are reported to the host as bubbling DOM `CustomEvent`s
//!
//! # Example
//!
//! ```ignore
//! use schema_viz::SchemaDiagram;
//!
//! let dot = RwSignal::new("digraph { A -> B }".to_string());
//! view! { <SchemaDiagram dot=dot fullscreen=true /> }
//! ```

mod anchor;
mod checkbox;
mod component;
pub mod config;
pub mod controller;
mod dom;
mod error;
pub mod events;
mod export;
#[cfg(test)]
mod fixtures;
pub mod geometry;
mod layout;
pub mod model;
mod mount;
mod path;
pub mod pipeline;
mod rewrite;
mod static_svg;
pub mod style;
mod visual;

pub use component::{DiagramRef, SchemaDiagram};
pub use config::DiagramConfig;
pub use controller::{InputEvent, InteractionSession, KeyInput, Modifiers};
pub use error::DiagramError;
pub use events::{CheckboxToggled, DiagramEvent, KeyPressed, NodeClicked};
pub use layout::{LayoutEngine, VizLayout};
pub use model::{Diagram, Hit};
pub use mount::{DiagramHandle, DiagramMount};
pub use pipeline::{RenderOutcome, render_dot};
pub use rewrite::{RewriteOptions, Rewritten, rewrite};
pub use style::DiagramStyle;
pub use visual::VisualLayer;
