//! Analysis pipeline: parse, barrier, cross-reference, diagrams.
//!
//! # Phases
//!
//! 1. Parse: every [`SourceInput`] is parsed independently on a rayon pool.
//!    Each worker owns one [`ParserSet`]; nothing is shared but the
//!    read-only registry and config. Results keep input order.
//! 2. Barrier: the parse phase completes before anything else starts.
//! 3. Cross-reference: call graph and import graph over all files.
//! 4. Diagrams: single-threaded, bounded by [`crate::config::DiagramLimits`].
//!
//! Nothing here returns an error. A file that fails every extractor still
//! contributes its whole-file module unit.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::diagram::{synthesize, Diagram};
use crate::graph::{cross_reference, CallGraph, ImportGraph};
use crate::ingest::{parse_source, CodeUnit, ParsedFile, ParserRegistry, ParserSet, SourceInput};

/// Result of one analysis run. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub files: Vec<ParsedFile>,
    pub call_graph: CallGraph,
    pub import_graph: ImportGraph,
    pub diagrams: Vec<Diagram>,
}

/// Counts describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub files: usize,
    /// Files per language key
    pub languages: BTreeMap<String, usize>,
    /// Sum of [`ParsedFile::total_units`]
    pub total_units: usize,
    pub classes: usize,
    /// Functions and methods
    pub callables: usize,
    pub imports: usize,
    /// Files whose grammar parse failed and fell back
    pub failed_parses: usize,
    /// Files per extraction strategy
    pub strategies: BTreeMap<String, usize>,
    pub call_edges: usize,
    pub import_edges: usize,
    pub diagrams: usize,
}

impl Analysis {
    pub fn summary(&self) -> AnalysisSummary {
        let mut summary = AnalysisSummary {
            files: self.files.len(),
            call_edges: self.call_graph.edge_count(),
            import_edges: self.import_graph.edge_count(),
            diagrams: self.diagrams.len(),
            ..AnalysisSummary::default()
        };
        for file in &self.files {
            *summary.languages.entry(file.language.clone()).or_insert(0) += 1;
            *summary
                .strategies
                .entry(file.strategy.as_str().to_string())
                .or_insert(0) += 1;
            summary.total_units += file.total_units();
            summary.classes += file.classes.len();
            summary.callables += file.callables().count();
            summary.imports += file.imports.len();
            if !file.parse_success {
                summary.failed_parses += 1;
            }
        }
        summary
    }

    /// Non-import units in file order, split into batches of `size`.
    ///
    /// A `size` of zero is treated as one.
    pub fn unit_batches(&self, size: usize) -> Vec<Vec<&CodeUnit>> {
        let units: Vec<&CodeUnit> = self.files.iter().flat_map(ParsedFile::units).collect();
        units.chunks(size.max(1)).map(<[&CodeUnit]>::to_vec).collect()
    }

    pub fn file(&self, file_path: &str) -> Option<&ParsedFile> {
        self.files.iter().find(|f| f.file_path == file_path)
    }
}

/// Parse every input, in parallel when a pool can be built.
///
/// Output order equals input order.
pub fn parse_files(
    inputs: &[SourceInput],
    registry: &ParserRegistry,
    config: &AnalysisConfig,
) -> Vec<ParsedFile> {
    let workers = config.effective_workers();
    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| {
            inputs
                .par_iter()
                .map_init(
                    || ParserSet::new(registry),
                    |parsers, input| parse_source(parsers, input, config),
                )
                .collect()
        }),
        Err(e) => {
            warn!(error = %e, "thread pool unavailable, parsing sequentially");
            let mut parsers = ParserSet::new(registry);
            inputs
                .iter()
                .map(|input| parse_source(&mut parsers, input, config))
                .collect()
        }
    }
}

/// Run the full pipeline over a fixed snapshot of files.
pub fn analyze(inputs: &[SourceInput], registry: &ParserRegistry, config: &AnalysisConfig) -> Analysis {
    let started = Instant::now();

    let files = parse_files(inputs, registry, config);
    let (call_graph, import_graph) = cross_reference(&files);
    let diagrams = synthesize(&files, &call_graph, &import_graph, &config.diagrams);

    let analysis = Analysis {
        files,
        call_graph,
        import_graph,
        diagrams,
    };
    let summary = analysis.summary();
    info!(
        files = summary.files,
        units = summary.total_units,
        failed = summary.failed_parses,
        call_edges = summary.call_edges,
        import_edges = summary.import_edges,
        diagrams = summary.diagrams,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis complete"
    );
    analysis
}
