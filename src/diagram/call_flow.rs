//! Call flow: sequence diagrams traced from likely entry points.
//!
//! The trace is an iterative depth-first walk over the call graph with an
//! explicit stack, bounded by `max_trace_depth` and `max_branches`, and a
//! per-trace visited set so cycles end the branch.

use std::cmp::Reverse;
use std::collections::HashSet;

use super::{Diagram, DiagramType};
use crate::config::DiagramLimits;
use crate::graph::CallGraph;

/// One rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'g> {
    /// Request arrow, drawn on descent
    Call { from: &'g str, to: &'g str },
    /// Dashed return arrow, drawn on ascent
    Return { from: &'g str, to: &'g str },
}

enum Frame<'g> {
    Enter { key: &'g str, depth: usize },
    Call { caller: &'g str, callee: &'g str },
    Exit { caller: &'g str, callee: &'g str },
}

/// Lowercased words of an identifier, split on `_`, `-` and camelCase humps.
///
/// `getUserRoute` gives `get`, `user`, `route`; `HTTPServer` gives `http`, `server`.
fn name_segments(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Entry point candidates, best first.
///
/// A callable qualifies when a word of its simple name equals an entry
/// keyword or when at least two distinct callers reach it. Ranked by call-in
/// count descending, then key.
pub fn entry_points<'g>(graph: &'g CallGraph, limits: &DiagramLimits) -> Vec<&'g str> {
    let in_counts = graph.call_in_counts();
    let mut candidates: Vec<(&'g str, usize)> = graph
        .nodes()
        .iter()
        .filter_map(|(key, node)| {
            let count = in_counts.get(key.as_str()).copied().unwrap_or(0);
            let segments = name_segments(node.simple_name());
            let keyword = limits
                .entry_keywords
                .iter()
                .any(|k| segments.iter().any(|s| s.eq_ignore_ascii_case(k)));
            (keyword || count >= 2).then_some((key.as_str(), count))
        })
        .collect();
    candidates.sort_by_key(|(key, count)| (Reverse(*count), *key));
    candidates.into_iter().map(|(key, _)| key).collect()
}

/// Trace calls from `root`.
pub fn trace<'g>(graph: &'g CallGraph, root: &'g str, limits: &DiagramLimits) -> Vec<Step<'g>> {
    let mut steps = Vec::new();
    let mut visited: HashSet<&'g str> = HashSet::from([root]);
    let mut stack = vec![Frame::Enter { key: root, depth: 0 }];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter { key, depth } => {
                if depth >= limits.max_trace_depth {
                    continue;
                }
                let children: Vec<&'g str> = graph
                    .callees(key)
                    .iter()
                    .map(String::as_str)
                    .filter(|c| !visited.contains(c))
                    .take(limits.max_branches)
                    .collect();
                // Reversed so the first callee is popped first.
                for child in children.into_iter().rev() {
                    visited.insert(child);
                    stack.push(Frame::Exit { caller: key, callee: child });
                    stack.push(Frame::Enter { key: child, depth: depth + 1 });
                    stack.push(Frame::Call { caller: key, callee: child });
                }
            }
            Frame::Call { caller, callee } => steps.push(Step::Call { from: caller, to: callee }),
            Frame::Exit { caller, callee } => steps.push(Step::Return { from: callee, to: caller }),
        }
    }
    steps
}

fn call_count(steps: &[Step<'_>]) -> usize {
    steps.iter().filter(|s| matches!(s, Step::Call { .. })).count()
}

/// Participant index for `key`, assigned in first-appearance order.
fn participant<'a>(order: &mut Vec<&'a str>, key: &'a str) -> usize {
    match order.iter().position(|k| *k == key) {
        Some(id) => id,
        None => {
            order.push(key);
            order.len() - 1
        }
    }
}

fn render_trace<'a>(graph: &CallGraph, root: &'a str, steps: &[Step<'a>]) -> Diagram {
    let mut order: Vec<&'a str> = vec![root];
    let mut messages = String::new();
    for step in steps {
        match *step {
            Step::Call { from, to } => {
                let (a, b) = (participant(&mut order, from), participant(&mut order, to));
                messages.push_str(&format!("    p{}->>p{}: {}()\n", a, b, label(graph, to, true)));
            }
            Step::Return { from, to } => {
                let (a, b) = (participant(&mut order, from), participant(&mut order, to));
                messages.push_str(&format!("    p{}-->>p{}: return\n", a, b));
            }
        }
    }

    let mut body = String::from(DiagramType::CallFlow.header());
    body.push('\n');
    for (id, key) in order.iter().enumerate() {
        body.push_str(&format!("    participant p{} as {}\n", id, label(graph, key, false)));
    }
    body.push_str(&messages);

    let root_label = label(graph, root, false);
    Diagram {
        diagram_type: DiagramType::CallFlow,
        title: format!("Call flow from {}", root_label),
        body,
        description: format!(
            "{} calls across {} functions starting at {}.",
            call_count(steps),
            order.len(),
            root
        ),
    }
}

/// Qualified name (or simple name) for a key, falling back to the key itself.
fn label(graph: &CallGraph, key: &str, simple: bool) -> String {
    let text = match graph.node(key) {
        Some(node) if simple => node.simple_name().to_string(),
        Some(node) => node.qualified_name.clone(),
        None => key.to_string(),
    };
    text.replace([';', '#'], "_")
}

/// Trace the top `max_entry_points` candidates; short traces are dropped,
/// not replaced by lower-ranked candidates.
pub fn render(graph: &CallGraph, limits: &DiagramLimits) -> Vec<Diagram> {
    let mut diagrams = Vec::new();
    for root in entry_points(graph, limits).into_iter().take(limits.max_entry_points) {
        let steps = trace(graph, root, limits);
        if call_count(&steps) < limits.min_trace_edges {
            continue;
        }
        diagrams.push(render_trace(graph, root, &steps));
    }
    diagrams
}
