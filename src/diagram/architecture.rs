//! Architecture overview: one node per top-level directory.

use std::collections::BTreeSet;

use super::{escape_label, Diagram, DiagramType};
use crate::config::DiagramLimits;
use crate::graph::ImportGraph;
use crate::ingest::{ParsedFile, UnitType};

/// Group for files directly under the analysis root.
pub const ROOT_GROUP: &str = "(root)";

/// First path segment, or [`ROOT_GROUP`] for top-level files.
pub fn group_of(file_path: &str) -> &str {
    let trimmed = file_path.trim_start_matches("./");
    match trimmed.split_once('/') {
        Some((first, _)) if !first.is_empty() => first,
        _ => ROOT_GROUP,
    }
}

#[derive(Debug)]
struct Group<'f> {
    name: &'f str,
    labels: Vec<&'f str>,
}

/// Groups in first-appearance order, each with its representative names.
fn groups<'f>(files: &'f [ParsedFile], max_labels: usize) -> Vec<Group<'f>> {
    let mut groups: Vec<Group<'f>> = Vec::new();
    for file in files {
        let name = group_of(&file.file_path);
        let idx = match groups.iter().position(|g| g.name == name) {
            Some(idx) => idx,
            None => {
                groups.push(Group {
                    name,
                    labels: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        let candidates = file.classes.iter().chain(
            file.functions
                .iter()
                .filter(|u| u.unit_type == UnitType::Function),
        );
        for unit in candidates {
            if group.labels.len() >= max_labels {
                break;
            }
            if !group.labels.contains(&unit.name.as_str()) {
                group.labels.push(&unit.name);
            }
        }
    }
    groups
}

/// Render the `graph TD` overview; None when there are no files.
pub fn render(files: &[ParsedFile], imports: &ImportGraph, limits: &DiagramLimits) -> Option<Diagram> {
    let groups = groups(files, limits.max_group_labels);
    if groups.is_empty() {
        return None;
    }
    let index_of = |path: &str| {
        let name = group_of(path);
        groups.iter().position(|g| g.name == name)
    };

    let mut edges = BTreeSet::new();
    for (importer, deps) in imports.edges() {
        let Some(from) = index_of(importer.as_str()) else { continue };
        for dep in deps {
            match index_of(dep.as_str()) {
                Some(to) if to != from => {
                    edges.insert((from, to));
                }
                _ => {}
            }
        }
    }

    let mut body = String::from(DiagramType::Architecture.header());
    body.push('\n');
    for (i, group) in groups.iter().enumerate() {
        let label = if group.labels.is_empty() {
            group.name.to_string()
        } else {
            format!("{}: {}", group.name, group.labels.join(", "))
        };
        body.push_str(&format!("    g{}[\"{}\"]\n", i, escape_label(&label)));
    }
    if edges.is_empty() {
        for i in 1..groups.len() {
            body.push_str(&format!("    g{} -.-> g{}\n", i - 1, i));
        }
    } else {
        for (from, to) in &edges {
            body.push_str(&format!("    g{} --> g{}\n", from, to));
        }
    }

    let description = format!(
        "{} files in {} groups with {} cross-group import links.",
        files.len(),
        groups.len(),
        edges.len()
    );
    Some(Diagram {
        diagram_type: DiagramType::Architecture,
        title: "Architecture overview".to_string(),
        body,
        description,
    })
}
