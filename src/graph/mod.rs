//! Cross-reference graphs derived from parsed files.
//!
//! Both graphs are built in one reduce step after every file has been parsed,
//! since resolution needs the complete name and file index. They are
//! immutable once built.

pub mod calls;
pub mod imports;

pub use calls::{CallGraph, CallNode};
pub use imports::ImportGraph;

use crate::ingest::ParsedFile;

/// Build the call graph and the import graph over the same file set.
pub fn cross_reference(files: &[ParsedFile]) -> (CallGraph, ImportGraph) {
    (CallGraph::build(files), ImportGraph::build(files))
}
