//! UI components.

pub mod schema_diagram;
