//! Analysis configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields the stock limits.
//!
//! ## Example
//!
//! ```toml
//! max_file_bytes = 524288
//! workers = 4
//!
//! [fallback]
//! brace_line_cap = 80
//!
//! [diagrams]
//! max_classes = 20
//! entry_keywords = ["main", "handler", "cli"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the per-project config file picked up by [`AnalysisConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "vespucci.toml";

/// Limits for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Files larger than this skip straight to the whole-file unit
    pub max_file_bytes: usize,
    /// Any line longer than this marks the file as minified
    pub max_line_bytes: usize,
    /// Parse-phase worker count; `None` means available cores
    pub workers: Option<usize>,
    pub fallback: FallbackLimits,
    pub diagrams: DiagramLimits,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_line_bytes: 20_000,
            workers: None,
            fallback: FallbackLimits::default(),
            diagrams: DiagramLimits::default(),
        }
    }
}

/// Caps for the heuristic extractors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackLimits {
    /// Maximum characters kept in a whole-file module unit
    pub module_char_cap: usize,
    /// Lines scanned for a matching `}` before giving up
    pub brace_line_cap: usize,
    /// Lines after a signature in which the opening `{` must appear
    pub brace_open_window: usize,
}

impl Default for FallbackLimits {
    fn default() -> Self {
        Self {
            module_char_cap: 50_000,
            brace_line_cap: 50,
            brace_open_window: 3,
        }
    }
}

/// Caps for diagram synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramLimits {
    pub max_classes: usize,
    pub max_methods_per_class: usize,
    pub max_entry_points: usize,
    pub max_trace_depth: usize,
    pub max_branches: usize,
    /// Traces with fewer edges are not rendered
    pub min_trace_edges: usize,
    /// Representative names shown in an architecture group node
    pub max_group_labels: usize,
    /// Name words (`get_route`, `getRoute`: `get`, `route`) that mark an entry point
    pub entry_keywords: Vec<String>,
}

impl Default for DiagramLimits {
    fn default() -> Self {
        Self {
            max_classes: 15,
            max_methods_per_class: 4,
            max_entry_points: 3,
            max_trace_depth: 5,
            max_branches: 3,
            min_trace_edges: 2,
            max_group_labels: 3,
            entry_keywords: ["main", "app", "handler", "route", "api", "endpoint", "index", "server"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `vespucci.toml` from `root` when present, otherwise defaults.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Worker count to use for the parse phase.
    pub fn effective_workers(&self) -> usize {
        self.workers
            .filter(|n| *n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
    }
}
