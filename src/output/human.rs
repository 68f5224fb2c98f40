//! Plain-text rendering for the human output format.

use crate::diagram::Diagram;
use crate::ingest::{CodeUnit, ParsedFile};
use crate::pipeline::AnalysisSummary;

fn unit_line(unit: &CodeUnit, indent: &str) -> String {
    let doc = unit
        .docstring
        .as_deref()
        .and_then(|d| d.lines().next())
        .map(|first| format!("  # {}", first))
        .unwrap_or_default();
    format!(
        "{}{} {} [{}-{}]{}\n",
        indent,
        unit.unit_type.as_str(),
        unit.qualified_name,
        unit.line_start,
        unit.line_end,
        doc
    )
}

/// Unit tree of one file.
pub fn render_file(file: &ParsedFile) -> String {
    let mut out = format!(
        "{} ({}, {}, {} units)\n",
        file.file_path,
        file.language,
        file.strategy.as_str(),
        file.total_units()
    );
    if let Some(error) = &file.parse_error {
        out.push_str(&format!("  ! {}\n", error));
    }
    if let Some(doc) = file.module_doc.as_deref().and_then(|d| d.lines().next()) {
        out.push_str(&format!("  \"{}\"\n", doc));
    }
    for import in &file.imports {
        out.push_str(&format!("  import {}\n", import.name.lines().next().unwrap_or("")));
    }
    for unit in &file.functions {
        out.push_str(&unit_line(unit, "  "));
    }
    for class in &file.classes {
        out.push_str(&unit_line(class, "  "));
        for method in &class.children {
            out.push_str(&unit_line(method, "    "));
        }
    }
    out
}

pub fn render_summary(summary: &AnalysisSummary) -> String {
    let mut out = format!(
        "{} files, {} units ({} classes, {} functions/methods, {} imports)\n",
        summary.files, summary.total_units, summary.classes, summary.callables, summary.imports
    );
    let languages: Vec<String> = summary
        .languages
        .iter()
        .map(|(lang, n)| format!("{} {}", lang, n))
        .collect();
    if !languages.is_empty() {
        out.push_str(&format!("languages: {}\n", languages.join(", ")));
    }
    let strategies: Vec<String> = summary
        .strategies
        .iter()
        .map(|(s, n)| format!("{} {}", s, n))
        .collect();
    if !strategies.is_empty() {
        out.push_str(&format!("strategies: {}\n", strategies.join(", ")));
    }
    if summary.failed_parses > 0 {
        out.push_str(&format!("grammar failures: {}\n", summary.failed_parses));
    }
    out.push_str(&format!(
        "call edges: {}, import edges: {}, diagrams: {}\n",
        summary.call_edges, summary.import_edges, summary.diagrams
    ));
    out
}

pub fn render_diagrams(diagrams: &[Diagram]) -> String {
    diagrams
        .iter()
        .map(|d| format!("## {}\n\n{}\n\n{}", d.title, d.description, d.to_markdown()))
        .collect::<Vec<_>>()
        .join("\n")
}
