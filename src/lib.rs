//! Vespucci: structural source mapping with Mermaid diagrams
//!
//! Vespucci parses a snapshot of source files into semantic units
//! (functions, classes, methods, imports), links them into a call graph and
//! an import graph, and renders a handful of bounded Mermaid diagrams.
//!
//! # Position Conventions
//!
//! - **Line positions**: 1-indexed (line 1 is the first line)
//! - **Byte offsets**: 0-indexed from file start, always on char boundaries
//!
//! # Extraction strategies
//!
//! Every file goes through exactly one of:
//! - **grammar**: tree-sitter walk driven by the language's profile
//! - **fallback**: line-oriented heuristics (indentation or brace matching)
//! - **whole_file**: a single module unit covering the file
//!
//! Nothing in [`analyze`] fails: a file the grammar cannot handle falls
//! through to the next strategy and records why.
//!
//! # Example
//!
//! ```rust
//! use vespucci::{analyze, AnalysisConfig, ParserRegistry, SourceInput};
//!
//! let inputs = vec![
//!     SourceInput::new("app.py", "from util import helper\n\ndef main():\n    helper()\n"),
//!     SourceInput::new("util.py", "def helper():\n    pass\n"),
//! ];
//! let analysis = analyze(&inputs, &ParserRegistry::new(), &AnalysisConfig::default());
//! assert_eq!(analysis.call_graph.callees("app.py:main"), ["util.py:helper"]);
//! ```

pub mod common;
pub mod config;
pub mod diagram;
pub mod error;
pub mod error_codes;
pub mod graph;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod version;

pub use config::{AnalysisConfig, DiagramLimits, FallbackLimits};
pub use diagram::{Diagram, DiagramType};
pub use error::{ConfigError, ParseError};
pub use graph::{CallGraph, CallNode, ImportGraph};
pub use ingest::{
    detect_language, parse_source, CodeUnit, Language, ParseStrategy, ParsedFile, ParserRegistry,
    ParserSet, SourceInput, UnitType,
};
pub use output::OutputFormat;
pub use pipeline::{analyze, parse_files, Analysis, AnalysisSummary};
pub use scan::{scan_directory, ScanProgress, ScanResult};
