//! Mermaid diagram synthesis.
//!
//! Three dialects, one per [`DiagramType`]:
//!
//! | Type | Mermaid dialect | Source |
//! |------|-----------------|--------|
//! | architecture | `graph TD` | file groups + import graph |
//! | class_hierarchy | `classDiagram` | class units |
//! | call_flow | `sequenceDiagram` | call graph |
//!
//! Output is a pure function of its inputs: no clocks, no hash-order
//! iteration, so two runs over the same files render byte-identical text.

pub mod architecture;
pub mod call_flow;
pub mod class_diagram;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DiagramLimits;
use crate::graph::{CallGraph, ImportGraph};
use crate::ingest::ParsedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    Architecture,
    ClassHierarchy,
    CallFlow,
}

impl DiagramType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramType::Architecture => "architecture",
            DiagramType::ClassHierarchy => "class_hierarchy",
            DiagramType::CallFlow => "call_flow",
        }
    }

    /// First line of every body of this type.
    pub fn header(&self) -> &'static str {
        match self {
            DiagramType::Architecture => "graph TD",
            DiagramType::ClassHierarchy => "classDiagram",
            DiagramType::CallFlow => "sequenceDiagram",
        }
    }
}

/// One rendered diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub diagram_type: DiagramType,
    pub title: String,
    /// Mermaid source, starting with [`DiagramType::header`]
    pub body: String,
    /// One-sentence plain-language summary
    pub description: String,
}

impl Diagram {
    /// The body as a fenced Markdown block.
    pub fn to_markdown(&self) -> String {
        format!("```mermaid\n{}```\n", self.body)
    }
}

/// Render every diagram the inputs support, in type order.
pub fn synthesize(
    files: &[ParsedFile],
    call_graph: &CallGraph,
    import_graph: &ImportGraph,
    limits: &DiagramLimits,
) -> Vec<Diagram> {
    let mut diagrams = Vec::new();
    diagrams.extend(architecture::render(files, import_graph, limits));
    diagrams.extend(class_diagram::render(files, limits));
    diagrams.extend(call_flow::render(call_graph, limits));
    debug!(count = diagrams.len(), "diagrams synthesized");
    diagrams
}

/// Mermaid identifier: ASCII alphanumerics and `_` only.
pub(crate) fn sanitize_id(raw: &str) -> String {
    let id: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if id.starts_with(|c: char| c.is_ascii_digit()) || id.is_empty() {
        format!("_{}", id)
    } else {
        id
    }
}

/// Label text safe inside `"..."`.
pub(crate) fn escape_label(raw: &str) -> String {
    raw.replace('"', "'")
}
