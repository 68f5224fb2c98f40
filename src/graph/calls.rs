//! Call graph construction and queries.
//!
//! Name-based and best effort. Every function and method is indexed under its
//! simple and qualified names; a call site resolves to *every* unit with a
//! matching name. Two files that both define `helper` therefore both receive
//! an edge from any caller of `helper`. No type information is consulted.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ingest::{CodeUnit, ParsedFile, UnitType};

/// `name(`, `obj.name(`, `Type::name(`, `ptr->name(`
static CALL_SITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_][A-Za-z0-9_]*(?:(?:\.|::|->)[A-Za-z_][A-Za-z0-9_]*)*)\s*\(")
        .expect("Invalid call site regex")
});

/// Label data for one indexed function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    pub file_path: String,
    pub qualified_name: String,
    pub unit_type: UnitType,
}

impl CallNode {
    /// Final segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(self.qualified_name.as_str())
    }
}

/// Caller key to sorted, deduplicated callee keys.
///
/// Keys are `"file_path:qualified_name"`. Only callers with at least one edge
/// appear in the edge map; every indexed callable appears in the node table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraph {
    edges: BTreeMap<String, Vec<String>>,
    nodes: BTreeMap<String, CallNode>,
}

impl CallGraph {
    /// Build the graph over every callable unit of every file.
    pub fn build(files: &[ParsedFile]) -> Self {
        let mut nodes = BTreeMap::new();
        let mut index: HashMap<&str, BTreeSet<String>> = HashMap::new();

        for unit in files.iter().flat_map(ParsedFile::callables) {
            let key = unit.key();
            index.entry(unit.name.as_str()).or_default().insert(key.clone());
            index
                .entry(unit.qualified_name.as_str())
                .or_default()
                .insert(key.clone());
            nodes.entry(key).or_insert_with(|| CallNode {
                file_path: unit.file_path.clone(),
                qualified_name: unit.qualified_name.clone(),
                unit_type: unit.unit_type,
            });
        }

        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for unit in files.iter().flat_map(ParsedFile::callables) {
            let key = unit.key();
            let callees = resolve_calls(unit, &key, &index);
            if !callees.is_empty() {
                edges.entry(key).or_default().extend(callees);
            }
        }

        let graph = Self {
            edges: edges
                .into_iter()
                .map(|(caller, callees)| (caller, callees.into_iter().collect()))
                .collect(),
            nodes,
        };
        debug!(
            callables = graph.nodes.len(),
            callers = graph.edges.len(),
            edges = graph.edge_count(),
            "call graph built"
        );
        graph
    }

    /// Callees of `key`, empty when it calls nothing known.
    pub fn callees(&self, key: &str) -> &[String] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys whose callee list contains `key`, sorted.
    pub fn callers_of(&self, key: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, callees)| callees.iter().any(|c| c == key))
            .map(|(caller, _)| caller.as_str())
            .collect()
    }

    /// Number of distinct callers per callee.
    pub fn call_in_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for callee in self.edges.values().flatten() {
            *counts.entry(callee.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn edges(&self) -> &BTreeMap<String, Vec<String>> {
        &self.edges
    }

    pub fn node(&self, key: &str) -> Option<&CallNode> {
        self.nodes.get(key)
    }

    /// Every indexed callable, by key.
    pub fn nodes(&self) -> &BTreeMap<String, CallNode> {
        &self.nodes
    }
}

/// Body openers; text before the earliest one is the unit's header.
const BODY_OPENERS: &[&str] = &["{", "=>", ":\n", ":\r\n"];

/// Byte offset where the unit's body begins, or the code length.
fn header_end(code: &str) -> usize {
    BODY_OPENERS
        .iter()
        .filter_map(|opener| code.find(opener))
        .min()
        .unwrap_or(code.len())
}

/// Callee keys referenced from `unit`'s code, excluding `caller` itself.
///
/// A site naming the unit inside its header (`def fact(`, `fn run(`) is the
/// declaration, not a call. Headers without `name(` (`const save = () =>`,
/// `fn run<T>(`) skip nothing.
fn resolve_calls(
    unit: &CodeUnit,
    caller: &str,
    index: &HashMap<&str, BTreeSet<String>>,
) -> BTreeSet<String> {
    let mut callees = BTreeSet::new();
    let header_end = header_end(&unit.code);
    let mut signature_seen = false;

    for caps in CALL_SITE.captures_iter(&unit.code) {
        let Some(site) = caps.get(1) else { continue };
        let dotted = site.as_str().replace("::", ".").replace("->", ".");
        let last = dotted.rsplit('.').next().unwrap_or(dotted.as_str());

        if !signature_seen && site.start() < header_end && last == unit.name {
            signature_seen = true;
            continue;
        }

        let targets = index.get(dotted.as_str()).or_else(|| index.get(last));
        if let Some(targets) = targets {
            callees.extend(targets.iter().filter(|t| t.as_str() != caller).cloned());
        }
    }
    callees
}
