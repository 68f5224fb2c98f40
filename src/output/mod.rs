//! Output rendering for CLI commands
//!
//! JSON responses are schema-versioned envelopes; the human format is plain
//! text with diagrams as fenced Mermaid blocks.

pub mod command;
pub mod human;

pub use command::{
    generate_execution_id, output_json, render_json, AnalyzeResponse, DiagramsResponse,
    JsonResponse, OutputFormat, ParseResponse, VESPUCCI_JSON_SCHEMA_VERSION,
};
pub use human::{render_diagrams, render_file, render_summary};
