//! Class hierarchy: selected classes with a few methods and base links.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{sanitize_id, Diagram, DiagramType};
use crate::config::DiagramLimits;
use crate::ingest::{CodeUnit, ParsedFile};

/// `class Foo(Base, Mixin):`
static PAREN_BASES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*class\s+\w+\s*\(([^)]*)\)\s*:\s*$").expect("Invalid paren bases regex"));
/// `extends Base`, `implements A, B`
static EXTENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:extends|implements)\s+([\w.$]+(?:\s*<[^>]*>)?(?:\s*,\s*[\w.$]+(?:\s*<[^>]*>)?)*)")
        .expect("Invalid extends regex")
});
/// `class Foo : public Base`, `class Foo : Base, IThing`
static COLON_BASES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:class|struct|object)\s+\w+(?:<[^>]*>)?\s*(?:\([^)]*\))?\s*:\s*([^{]+)")
        .expect("Invalid colon bases regex")
});

/// Access and inheritance modifiers that precede a base name.
const BASE_MODIFIERS: &[&str] = &["public", "private", "protected", "virtual", "open"];

/// Text before the class body opens: up to `{`, or a line ending in `:`.
fn header(code: &str) -> &str {
    let brace = code.find('{').unwrap_or(code.len());
    let colon_line = code.find(":\n").map(|i| i + 1).unwrap_or(code.len());
    &code[..brace.min(colon_line)]
}

/// Base names written in a class header, simple names only.
pub fn base_names(code: &str) -> Vec<String> {
    let header = header(code);
    let raw = PAREN_BASES
        .captures(header)
        .or_else(|| EXTENDS.captures(header))
        .or_else(|| COLON_BASES.captures(header))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    let mut names = Vec::new();
    for part in raw.split(',') {
        if part.contains('=') {
            continue;
        }
        let Some(token) = part
            .split_whitespace()
            .find(|w| !BASE_MODIFIERS.contains(w))
        else {
            continue;
        };
        let token = token.split('<').next().unwrap_or(token);
        let token = token.split('(').next().unwrap_or(token);
        let simple = token
            .rsplit(|c: char| c == '.' || c == ':')
            .next()
            .unwrap_or(token)
            .trim();
        if !simple.is_empty() && simple != "object" {
            names.push(simple.to_string());
        }
    }
    names
}

/// A class box: one or more same-named class units of one file merged.
#[derive(Debug)]
struct ClassBox<'f> {
    name: &'f str,
    file: &'f str,
    methods: Vec<&'f str>,
    bases: Vec<String>,
}

fn select<'f>(files: &'f [ParsedFile], limits: &DiagramLimits) -> Vec<ClassBox<'f>> {
    let mut boxes: Vec<ClassBox<'f>> = Vec::new();
    for file in files {
        for class in &file.classes {
            let existing = boxes
                .iter()
                .position(|b| b.name == class.name && b.file == file.file_path);
            let idx = match existing {
                Some(idx) => idx,
                None if boxes.len() < limits.max_classes => {
                    boxes.push(ClassBox {
                        name: &class.name,
                        file: &file.file_path,
                        methods: Vec::new(),
                        bases: Vec::new(),
                    });
                    boxes.len() - 1
                }
                None => continue,
            };
            merge(&mut boxes[idx], class, limits.max_methods_per_class);
        }
    }
    boxes
}

/// Mermaid ids: the class name, or `Name__path` when the name is in several files.
fn box_ids(boxes: &[ClassBox<'_>]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for b in boxes {
        *seen.entry(b.name).or_default() += 1;
    }
    boxes
        .iter()
        .map(|b| {
            if seen.get(b.name).copied().unwrap_or(0) > 1 {
                sanitize_id(&format!("{}__{}", b.name, b.file))
            } else {
                sanitize_id(b.name)
            }
        })
        .collect()
}

/// Box a base name refers to from box `from`: same file first, then the
/// first selected box with that name.
fn base_target(boxes: &[ClassBox<'_>], from: usize, base: &str) -> Option<usize> {
    let candidates = || {
        boxes
            .iter()
            .enumerate()
            .filter(move |(idx, b)| *idx != from && b.name == base)
    };
    candidates()
        .find(|(_, b)| b.file == boxes[from].file)
        .or_else(|| candidates().next())
        .map(|(idx, _)| idx)
}

fn merge<'f>(target: &mut ClassBox<'f>, class: &'f CodeUnit, max_methods: usize) {
    for method in &class.children {
        if target.methods.len() >= max_methods {
            break;
        }
        if !target.methods.contains(&method.name.as_str()) {
            target.methods.push(&method.name);
        }
    }
    for base in base_names(&class.code) {
        if !target.bases.contains(&base) {
            target.bases.push(base);
        }
    }
}

/// Render the `classDiagram`; None with fewer than two class boxes.
pub fn render(files: &[ParsedFile], limits: &DiagramLimits) -> Option<Diagram> {
    let boxes = select(files, limits);
    if boxes.len() < 2 {
        return None;
    }
    let ids = box_ids(&boxes);

    let mut body = String::from(DiagramType::ClassHierarchy.header());
    body.push('\n');
    for (b, id) in boxes.iter().zip(&ids) {
        if b.methods.is_empty() {
            body.push_str(&format!("    class {}\n", id));
        } else {
            body.push_str(&format!("    class {} {{\n", id));
            for method in &b.methods {
                body.push_str(&format!("        +{}()\n", method));
            }
            body.push_str("    }\n");
        }
    }

    let mut links = 0;
    for (idx, b) in boxes.iter().enumerate() {
        for base in &b.bases {
            if let Some(target) = base_target(&boxes, idx, base) {
                body.push_str(&format!("    {} <|-- {}\n", ids[target], ids[idx]));
                links += 1;
            }
        }
    }

    let description = format!(
        "{} classes with up to {} methods each and {} inheritance links.",
        boxes.len(),
        limits.max_methods_per_class,
        links
    );
    Some(Diagram {
        diagram_type: DiagramType::ClassHierarchy,
        title: "Class hierarchy".to_string(),
        body,
        description,
    })
}
