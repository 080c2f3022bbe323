//! Rendering of [`BindingModel`]s for tooling and visualization.
//!
//! JSON and YAML go through serde and need the `graph-export` feature; the
//! Graphviz DOT rendering is always available.

use std::fmt::Write as _;

use super::model::BindingModel;
use crate::error::{DiError, DiResult};

/// Export formats supported for binding models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format for web UIs and APIs
    Json,
    /// YAML format for human-readable review
    Yaml,
    /// DOT format for Graphviz visualization
    Dot,
}

impl BindingModel {
    /// Renders the model in `format`.
    pub fn export(&self, format: ExportFormat) -> DiResult<String> {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Yaml => self.to_yaml(),
            ExportFormat::Dot => Ok(self.to_dot()),
        }
    }

    /// Pretty-printed JSON. Types are rendered by name.
    #[cfg(feature = "graph-export")]
    pub fn to_json(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DiError::Export(e.to_string()))
    }

    #[cfg(not(feature = "graph-export"))]
    pub fn to_json(&self) -> DiResult<String> {
        Err(DiError::Export("JSON export requires the `graph-export` feature".to_string()))
    }

    /// YAML document. Types are rendered by name.
    #[cfg(feature = "graph-export")]
    pub fn to_yaml(&self) -> DiResult<String> {
        serde_yaml::to_string(self).map_err(|e| DiError::Export(e.to_string()))
    }

    #[cfg(not(feature = "graph-export"))]
    pub fn to_yaml(&self) -> DiResult<String> {
        Err(DiError::Export("YAML export requires the `graph-export` feature".to_string()))
    }

    /// Graphviz digraph: one node per binding and per redirect key, solid
    /// edges for declared dependencies, dashed edges for redirects.
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph BindingModel {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box];\n\n");

        for binding in self.bindings() {
            let color = if binding.is_singleton() { "lightblue" } else { "lightyellow" };
            let peripheries = if self.entry_points().contains(&binding.ty()) { 2 } else { 1 };
            let _ = writeln!(
                output,
                "  \"{}\" [label=\"{}\", style=filled, fillcolor={}, peripheries={}];",
                binding.ty().name(),
                binding.ty().short_name(),
                color,
                peripheries
            );
        }
        for (requested, _) in self.redirects().iter() {
            let _ = writeln!(
                output,
                "  \"{}\" [label=\"{}\", shape=ellipse];",
                requested.name(),
                requested.short_name()
            );
        }
        output.push('\n');

        for binding in self.bindings() {
            for dep in binding.dependencies() {
                let _ = writeln!(output, "  \"{}\" -> \"{}\";", binding.ty().name(), dep.name());
            }
        }
        for (requested, provided) in self.redirects().iter() {
            let _ = writeln!(
                output,
                "  \"{}\" -> \"{}\" [style=dashed, label=\"binds\"];",
                requested.name(),
                provided.name()
            );
        }

        output.push_str("}\n");
        output
    }
}
