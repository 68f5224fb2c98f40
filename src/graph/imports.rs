//! Import graph construction and queries.
//!
//! Each import unit's text is matched against an ordered list of reference
//! patterns; the referenced module is resolved by path segment against an
//! index of the analysed files. Anything that does not resolve (standard
//! library, third-party packages) is silently left without an edge.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ingest::ParsedFile;

/// How a captured reference is split into segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefStyle {
    /// `./lib/util.js`, `sys/types.h`: split on `/`
    FilePath,
    /// `app.models`, `crate::graph`, `App\Models`: split on `.`, `::` or `\`
    ModulePath,
}

struct ReferencePattern {
    regex: Regex,
    style: RefStyle,
}

fn pattern(re: &str, style: RefStyle) -> ReferencePattern {
    ReferencePattern {
        regex: Regex::new(re).expect("Invalid import reference regex"),
        style,
    }
}

/// Tried in order; the first pattern that captures anything wins.
static REFERENCE_PATTERNS: Lazy<Vec<ReferencePattern>> = Lazy::new(|| {
    vec![
        // from .models import User / from . import models
        pattern(r"^\s*from\s+(\.+[\w.]*\w)\s+import\b", RefStyle::ModulePath),
        pattern(r"^\s*from\s+\.+\s+import\s+(\w+)", RefStyle::ModulePath),
        // import a.b / from a.b import c
        pattern(r"^\s*(?:from\s+([\w.]+)\s+import\b|import\s+(?:static\s+)?([\w.]+)\s*;?\s*$)", RefStyle::ModulePath),
        // require('./x'), require_relative 'x', require_once "x.php"
        pattern(r#"\brequire(?:_relative|_once)?\s*\(?\s*['"]([^'"]+)['"]"#, RefStyle::FilePath),
        // import x from './x', export * from "./x", import "fmt"
        pattern(r#"\b(?:from|import)\s*\(?\s*['"]([^'"]+)['"]"#, RefStyle::FilePath),
        // #include "x.h"
        pattern(r#"#\s*include\s*[<"]([^>"]+)[>"]"#, RefStyle::FilePath),
        // use crate::x::y; mod x; use App\Models\User;
        pattern(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:use|mod)\s+([\w:\\]+)", RefStyle::ModulePath),
    ]
});

/// Go `import ( ... )` block: every quoted path is a reference.
static IMPORT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\s*\(").expect("Invalid import block regex"));
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("Invalid quoted regex"));

/// Path segments that carry no module name.
const SKIP_SEGMENTS: &[&str] = &["", ".", "..", "crate", "self", "super"];

/// Leading segments that root a module path in the importing crate.
const LOCAL_ROOTS: &[&str] = &["crate", "self", "super"];

/// File stems that stand for their directory.
const DIRECTORY_MODULES: &[&str] = &["index", "__init__", "mod", "lib"];

/// A module reference extracted from one import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    segments: Vec<String>,
    style: RefStyle,
    /// Rooted at `crate`, `self` or `super`
    local: bool,
}

impl Reference {
    fn new(raw: &str, style: RefStyle) -> Option<Self> {
        let segments: Vec<String> = match style {
            RefStyle::FilePath => raw.split('/').map(str::to_string).collect(),
            RefStyle::ModulePath => raw
                .replace("::", ".")
                .replace('\\', ".")
                .split('.')
                .map(str::to_string)
                .collect(),
        };
        let local = style == RefStyle::ModulePath
            && segments.first().is_some_and(|s| LOCAL_ROOTS.contains(&s.as_str()));
        let segments: Vec<String> = segments
            .into_iter()
            .filter(|s| !SKIP_SEGMENTS.contains(&s.as_str()))
            .collect();
        (!segments.is_empty()).then_some(Self { segments, style, local })
    }

    /// Joined segments as a path suffix, e.g. `app/models`.
    fn suffix(&self) -> String {
        self.segments.join("/")
    }
}

fn references(text: &str) -> Vec<Reference> {
    if IMPORT_BLOCK.is_match(text) {
        return QUOTED
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .filter_map(|m| Reference::new(m.as_str(), RefStyle::FilePath))
            .collect();
    }
    for pattern in REFERENCE_PATTERNS.iter() {
        let found: Vec<Reference> = pattern
            .regex
            .captures_iter(text)
            .filter_map(|c| c.iter().skip(1).flatten().next())
            .filter_map(|m| Reference::new(m.as_str(), pattern.style))
            .collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

fn strip_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => &path[..dot],
        _ => path,
    }
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}

/// Basename lookup over the analysed files.
struct FileIndex<'f> {
    by_name: HashMap<String, BTreeSet<&'f str>>,
}

impl<'f> FileIndex<'f> {
    fn new(files: &'f [ParsedFile]) -> Self {
        let mut by_name: HashMap<String, BTreeSet<&'f str>> = HashMap::new();
        for file in files {
            let path = file.file_path.as_str();
            let Some(base) = Path::new(path).file_name().map(|b| b.to_string_lossy()) else {
                continue;
            };
            let stem = strip_extension(&base).to_string();
            by_name.entry(base.to_string()).or_default().insert(path);
            if DIRECTORY_MODULES.contains(&stem.as_str()) {
                if let Some(dir) = Path::new(path)
                    .parent()
                    .and_then(Path::file_name)
                    .map(|d| d.to_string_lossy().into_owned())
                {
                    by_name.entry(dir).or_default().insert(path);
                }
            }
            by_name.entry(stem).or_default().insert(path);
        }
        Self { by_name }
    }

    /// Resolve `reference` as imported from `importer`.
    ///
    /// References resolve their last segment. Crate-local module paths walk
    /// back from there, so `use crate::graph::calls::CallGraph` resolves to
    /// `calls.rs` while `use std::fmt::Display` never reaches a local `fmt.rs`.
    fn resolve(&self, importer: &str, reference: &Reference) -> Option<&'f str> {
        let tried = if reference.local { reference.segments.len() } else { 1 };
        for depth in 0..tried {
            let end = reference.segments.len() - depth;
            let segment = &reference.segments[end - 1];
            let Some(candidates) = self.by_name.get(segment.as_str()) else {
                continue;
            };
            let partial = Reference {
                segments: reference.segments[..end].to_vec(),
                ..reference.clone()
            };
            if let Some(best) = choose(importer, &partial.suffix(), candidates) {
                return Some(best);
            }
        }
        None
    }
}

/// Pick one candidate: full-path match, then same directory, then first.
///
/// A single-segment suffix carries no directory information and skips the
/// full-path rule.
fn choose<'f>(importer: &str, suffix: &str, candidates: &BTreeSet<&'f str>) -> Option<&'f str> {
    let others: Vec<&'f str> = candidates.iter().copied().filter(|c| *c != importer).collect();
    let full_match = others.iter().copied().filter(|_| suffix.contains('/')).find(|c| {
        let stem = strip_extension(c);
        [*c, stem, parent_dir(c)]
            .iter()
            .any(|p| *p == suffix || p.ends_with(&format!("/{}", suffix)))
    });
    let importer_dir = parent_dir(importer);
    full_match
        .or_else(|| others.iter().copied().find(|c| parent_dir(c) == importer_dir))
        .or_else(|| others.first().copied())
}

/// File path to sorted, deduplicated dependency file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl ImportGraph {
    pub fn build(files: &[ParsedFile]) -> Self {
        let index = FileIndex::new(files);
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut unresolved = 0usize;

        for file in files {
            for import in &file.imports {
                for reference in references(&import.name) {
                    match index.resolve(&file.file_path, &reference) {
                        Some(target) => {
                            edges
                                .entry(file.file_path.clone())
                                .or_default()
                                .insert(target.to_string());
                        }
                        None => unresolved += 1,
                    }
                }
            }
        }

        let graph = Self {
            edges: edges
                .into_iter()
                .map(|(file, deps)| (file, deps.into_iter().collect()))
                .collect(),
        };
        debug!(edges = graph.edge_count(), unresolved, "import graph built");
        graph
    }

    /// Files `file` imports.
    pub fn dependencies(&self, file: &str) -> &[String] {
        self.edges.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files that import `file`, sorted.
    pub fn dependents_of(&self, file: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, deps)| deps.iter().any(|d| d == file))
            .map(|(importer, _)| importer.as_str())
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn edges(&self) -> &BTreeMap<String, Vec<String>> {
        &self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::ingest::{parse_source, ParserRegistry, ParserSet, SourceInput};

    fn graph(sources: &[(&str, &str)]) -> ImportGraph {
        let registry = ParserRegistry::new();
        let mut parsers = ParserSet::new(&registry);
        let config = AnalysisConfig::default();
        let files: Vec<ParsedFile> = sources
            .iter()
            .map(|(path, content)| parse_source(&mut parsers, &SourceInput::new(*path, *content), &config))
            .collect();
        ImportGraph::build(&files)
    }

    fn segments(text: &str) -> Vec<Vec<String>> {
        references(text).into_iter().map(|r| r.segments).collect()
    }

    #[test]
    fn test_reference_patterns() {
        assert_eq!(segments("from .models import User"), vec![vec!["models"]]);
        assert_eq!(segments("from . import views"), vec![vec!["views"]]);
        assert_eq!(segments("from app.core import run"), vec![vec!["app", "core"]]);
        assert_eq!(segments("import com.acme.Widget;"), vec![vec!["com", "acme", "Widget"]]);
        assert_eq!(segments("const x = require('../lib/x.js')"), vec![vec!["lib", "x.js"]]);
        assert_eq!(segments("import { a } from './util'"), vec![vec!["util"]]);
        assert_eq!(segments("#include \"net/socket.h\""), vec![vec!["net", "socket.h"]]);
        assert_eq!(segments("use crate::graph::calls;"), vec![vec!["graph", "calls"]]);
        assert_eq!(segments("import (\n\t\"fmt\"\n\t\"app/store\"\n)"), vec![vec!["fmt"], vec!["app", "store"]]);
        assert!(segments("import React").len() == 1);
    }

    #[test]
    fn test_relative_js_import() {
        let g = graph(&[
            ("src/a.ts", "import { baz } from './b';\nexport function a() { baz(); }\n"),
            ("src/b.ts", "export function baz() {}\n"),
        ]);
        assert_eq!(g.dependencies("src/a.ts"), ["src/b.ts".to_string()]);
        assert_eq!(g.dependents_of("src/b.ts"), vec!["src/a.ts"]);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_unresolved_imports_have_no_edge() {
        let g = graph(&[("main.py", "import os\nfrom typing import List\n\ndef main():\n    pass\n")]);
        assert_eq!(g.edge_count(), 0);
        assert!(g.dependencies("main.py").is_empty());
    }

    #[test]
    fn test_no_self_loop() {
        let g = graph(&[("util.py", "import util\n\ndef f():\n    pass\n")]);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_full_path_preferred_over_directory() {
        let g = graph(&[
            ("app/main.py", "from core.models import User\n"),
            ("app/models.py", "class Local:\n    pass\n"),
            ("core/models.py", "class User:\n    pass\n"),
        ]);
        assert_eq!(g.dependencies("app/main.py"), ["core/models.py".to_string()]);
    }

    #[test]
    fn test_same_directory_preferred() {
        let g = graph(&[
            ("b/run.py", "import helpers\n"),
            ("a/helpers.py", "def h():\n    pass\n"),
            ("b/helpers.py", "def h():\n    pass\n"),
        ]);
        assert_eq!(g.dependencies("b/run.py"), ["b/helpers.py".to_string()]);
    }

    #[test]
    fn test_rust_use_walks_back_to_module() {
        let g = graph(&[
            ("src/main.rs", "use crate::graph::calls::CallGraph;\n\nfn main() {}\n"),
            ("src/graph/calls.rs", "pub struct CallGraph;\n"),
        ]);
        assert_eq!(g.dependencies("src/main.rs"), ["src/graph/calls.rs".to_string()]);
    }

    #[test]
    fn test_external_paths_do_not_walk_back() {
        let g = graph(&[
            ("src/main.rs", "use std::fmt::Display;
use super::store::Store;

fn main() {}
"),
            ("src/fmt.rs", "pub fn pad() {}
"),
            ("src/store.rs", "pub struct Store;
"),
        ]);
        assert_eq!(g.dependencies("src/main.rs"), ["src/store.rs".to_string()]);
    }

    #[test]
    fn test_local_roots() {
        let local = |text: &str| references(text).into_iter().map(|r| r.local).collect::<Vec<_>>();
        assert_eq!(local("use crate::graph::calls;"), vec![true]);
        assert_eq!(local("use self::walker::walk;"), vec![true]);
        assert_eq!(local("use std::fmt::Display;"), vec![false]);
        assert_eq!(local("from .models import User"), vec![false]);
        assert_eq!(local("import { a } from './util'"), vec![false]);
    }

    #[test]
    fn test_directory_module_index_file() {
        let g = graph(&[
            ("web/app.js", "import ui from './components';\nfunction app() {}\n"),
            ("web/components/index.js", "function render() {}\n"),
        ]);
        assert_eq!(g.dependencies("web/app.js"), ["web/components/index.js".to_string()]);
    }

    #[test]
    fn test_c_include() {
        let g = graph(&[
            ("src/main.c", "#include \"util.h\"\n#include <stdio.h>\nint main() { return 0; }\n"),
            ("src/util.h", "int add(int a, int b);\n"),
        ]);
        assert_eq!(g.dependencies("src/main.c"), ["src/util.h".to_string()]);
    }
}
