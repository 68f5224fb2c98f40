//! Structural walker over tree-sitter syntax trees.
//!
//! Only the top-level children of the root are classified, plus one nesting
//! level for class bodies and export/decorator wrappers. Every decision is
//! driven by the language's [`GrammarProfile`]; nothing here branches on a
//! language.

use tree_sitter::Node;
use tracing::debug;

use super::fallback;
use super::pool::ParserSet;
use super::profile::{GrammarProfile, IDENTIFIER_KINDS};
use super::{CodeUnit, Extraction, Language, SourceText, UnitType};
use crate::common::{clean_comment, safe_str_slice, strip_string_quotes};
use crate::config::AnalysisConfig;
use crate::error::ParseError;

/// Maximum steps when following `declarator` / `type` fields to a name.
pub const MAX_DECLARATOR_DEPTH: usize = 8;

/// Name used when a definition has no identifier (e.g. `export default function () {}`).
pub const ANONYMOUS: &str = "anonymous";

/// Node kinds that are names even though they have named children.
const COMPOSITE_NAME_KINDS: &[&str] = &["destructor_name", "operator_name", "scoped_identifier"];

/// Parse `src` with the registered grammar and extract its units.
///
/// A file with no function-like or class unit gets the whole-file module
/// unit, so the result always carries at least one unit.
pub fn parse_with_grammar(
    parsers: &mut ParserSet<'_>,
    language: Language,
    src: &SourceText<'_>,
    config: &AnalysisConfig,
) -> Result<Extraction, ParseError> {
    let tree = parsers
        .with_parser(language, |parser| parser.parse(src.content, None))?
        .ok_or(ParseError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        debug!(file = src.file_path, "syntax errors in tree, extracting what parsed");
    }

    let walker = Walker {
        profile: language.profile(),
        src,
    };
    let mut extraction = walker.extract(root)?;
    if extraction.is_structureless() {
        extraction.functions.push(fallback::module_unit(src, config));
    }
    Ok(extraction)
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

struct Walker<'s, 'a> {
    profile: &'static GrammarProfile,
    src: &'s SourceText<'a>,
}

impl<'s, 'a> Walker<'s, 'a> {
    fn extract(&self, root: Node<'_>) -> Result<Extraction, ParseError> {
        let children = named_children(root);
        let mut out = Extraction {
            module_doc: self.module_doc(&children)?,
            ..Extraction::default()
        };
        for child in children {
            self.visit_top_level(child, &mut out)?;
        }
        Ok(out)
    }

    fn visit_top_level(&self, node: Node<'_>, out: &mut Extraction) -> Result<(), ParseError> {
        let kind = node.kind();
        if self.profile.is_import(kind) {
            let text = self.text(node)?.trim_end();
            let unit = self
                .src
                .unit(UnitType::Import, text, None, node.start_byte(), node.end_byte())?;
            out.imports.push(unit);
        } else if self.profile.is_export(kind) {
            self.visit_export(node, out)?;
        } else if let Some(unit) = self.definition(node, node, None)? {
            push_unit(out, unit);
        } else if self.profile.is_declaration(kind) {
            out.functions.extend(self.assigned_functions(node, node)?);
        } else if node.is_error() {
            debug!(file = self.src.file_path, row = node.start_position().row + 1, "skipping ERROR node");
        }
        Ok(())
    }

    /// Export wrappers: look one level inside for a definition.
    fn visit_export(&self, node: Node<'_>, out: &mut Extraction) -> Result<(), ParseError> {
        for inner in named_children(node) {
            if let Some(unit) = self.definition(inner, node, None)? {
                push_unit(out, unit);
                return Ok(());
            }
            if self.profile.is_declaration(inner.kind()) {
                let units = self.assigned_functions(inner, node)?;
                if !units.is_empty() {
                    out.functions.extend(units);
                    return Ok(());
                }
            }
        }
        let text = self.text(node)?.trim_end();
        let unit = self
            .src
            .unit(UnitType::Export, text, None, node.start_byte(), node.end_byte())?
            .with_docstring(self.preceding_comment(node)?);
        out.functions.push(unit);
        Ok(())
    }

    /// Classify `node` as a definition.
    ///
    /// `outer` supplies the span and the doc-comment anchor, so decorators
    /// and export keywords stay inside the unit's code.
    fn definition(
        &self,
        node: Node<'_>,
        outer: Node<'_>,
        parent: Option<&str>,
    ) -> Result<Option<CodeUnit>, ParseError> {
        let kind = node.kind();
        let p = self.profile;

        if p.is_decorator(kind) {
            return match self.unwrap_decorated(node) {
                Some(inner) if !p.is_decorator(inner.kind()) => self.definition(inner, outer, parent),
                _ => Ok(None),
            };
        }

        let unit_type = if p.is_class(kind) && parent.is_none() {
            return self.class_unit(node, outer).map(Some);
        } else if p.is_function(kind) {
            if parent.is_some() {
                UnitType::Method
            } else {
                UnitType::Function
            }
        } else if p.is_interface(kind) && parent.is_none() {
            UnitType::Interface
        } else if p.is_type_alias(kind) && parent.is_none() {
            UnitType::TypeAlias
        } else {
            return Ok(None);
        };

        let name = self.name_of(node)?;
        let unit = self
            .src
            .unit(unit_type, name, parent, outer.start_byte(), outer.end_byte())?
            .with_docstring(self.docstring(node, outer)?);
        Ok(Some(unit))
    }

    fn class_unit(&self, node: Node<'_>, outer: Node<'_>) -> Result<CodeUnit, ParseError> {
        let name = self.name_of(node)?;
        let mut methods = Vec::new();
        if let Some(body) = self.class_body(node) {
            for member in named_children(body) {
                let is_method = self.profile.is_function(member.kind())
                    || (self.profile.is_decorator(member.kind())
                        && self
                            .unwrap_decorated(member)
                            .is_some_and(|inner| self.profile.is_function(inner.kind())));
                if !is_method {
                    continue;
                }
                if let Some(method) = self.definition(member, member, Some(&name))? {
                    methods.push(method);
                }
            }
        }

        let mut class = self
            .src
            .unit(UnitType::Class, name, None, outer.start_byte(), outer.end_byte())?
            .with_docstring(self.docstring(node, outer)?);
        class.children = methods;
        Ok(class)
    }

    /// First candidate body kind present on the class node.
    fn class_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let field_body = node.child_by_field_name("body");
        let children = named_children(node);
        self.profile.body_kinds.iter().find_map(|body_kind| {
            field_body
                .filter(|b| b.kind() == *body_kind)
                .or_else(|| children.iter().copied().find(|c| c.kind() == *body_kind))
        })
    }

    fn unwrap_decorated<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("definition").or_else(|| {
            named_children(node).into_iter().find(|c| {
                let k = c.kind();
                self.profile.is_function(k) || self.profile.is_class(k) || self.profile.is_decorator(k)
            })
        })
    }

    /// `const f = () => {}` style definitions inside a declaration.
    fn assigned_functions(
        &self,
        declaration: Node<'_>,
        outer: Node<'_>,
    ) -> Result<Vec<CodeUnit>, ParseError> {
        let declarators: Vec<Node<'_>> = named_children(declaration)
            .into_iter()
            .filter(|d| self.profile.is_declarator(d.kind()))
            .collect();
        let single = declarators.len() == 1;

        let mut units = Vec::new();
        for declarator in declarators {
            let Some(value) = declarator.child_by_field_name("value") else {
                continue;
            };
            if !self.profile.is_function(value.kind()) {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            if !IDENTIFIER_KINDS.contains(&name_node.kind()) {
                continue;
            }
            let span = if single { outer } else { declarator };
            let unit = self
                .src
                .unit(
                    UnitType::Function,
                    self.text(name_node)?,
                    None,
                    span.start_byte(),
                    span.end_byte(),
                )?
                .with_docstring(self.preceding_comment(if single { outer } else { declarator })?);
            units.push(unit);
        }
        Ok(units)
    }

    /// Name rule: `name` field, `declarator` chain, `type` field, then the
    /// first identifier-like child. Descent is bounded.
    fn name_of(&self, node: Node<'_>) -> Result<String, ParseError> {
        let start = node
            .child_by_field_name("name")
            .or_else(|| node.child_by_field_name("declarator"))
            .or_else(|| node.child_by_field_name("type"))
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|c| IDENTIFIER_KINDS.contains(&c.kind()))
            });
        match start {
            Some(n) => self.leaf_name(n),
            None => Ok(ANONYMOUS.to_string()),
        }
    }

    fn leaf_name(&self, node: Node<'_>) -> Result<String, ParseError> {
        let mut current = node;
        for _ in 0..MAX_DECLARATOR_DEPTH {
            let kind = current.kind();
            if IDENTIFIER_KINDS.contains(&kind)
                || COMPOSITE_NAME_KINDS.contains(&kind)
                || current.named_child_count() == 0
            {
                return Ok(self.text(current)?.to_string());
            }
            let next = current
                .child_by_field_name("name")
                .or_else(|| current.child_by_field_name("declarator"))
                .or_else(|| current.child_by_field_name("type"))
                .or_else(|| {
                    named_children(current)
                        .into_iter()
                        .find(|c| IDENTIFIER_KINDS.contains(&c.kind()))
                });
            match next {
                Some(n) => current = n,
                None => return Ok(self.text(current)?.to_string()),
            }
        }
        Err(ParseError::DepthExceeded(MAX_DECLARATOR_DEPTH))
    }

    /// First-statement string (when the profile uses that convention), else
    /// the preceding comment block of `outer`.
    fn docstring(&self, node: Node<'_>, outer: Node<'_>) -> Result<Option<String>, ParseError> {
        if self.profile.docstring_first_statement {
            if let Some(body) = node.child_by_field_name("body") {
                let first = named_children(body)
                    .into_iter()
                    .find(|c| !self.profile.is_comment(c.kind()));
                if let Some(doc) = first.map(|f| self.string_statement(f)).transpose()?.flatten() {
                    return Ok(Some(doc));
                }
            }
        }
        self.preceding_comment(outer)
    }

    /// `"""text"""` when `node` is a bare string-literal statement.
    fn string_statement(&self, node: Node<'_>) -> Result<Option<String>, ParseError> {
        if node.kind() != "expression_statement" || node.named_child_count() != 1 {
            return Ok(None);
        }
        match node.named_child(0) {
            Some(s) if s.kind() == "string" => Ok(strip_string_quotes(self.text(s)?)),
            _ => Ok(None),
        }
    }

    /// Contiguous comment siblings directly above `node`.
    ///
    /// Attribute siblings (`#[derive]`) between the comment and the node are
    /// skipped; trailing comments on a code line are not documentation.
    fn preceding_comment(&self, node: Node<'_>) -> Result<Option<String>, ParseError> {
        let mut block = Vec::new();
        let mut anchor_row = node.start_position().row;
        let mut cursor = node.prev_sibling();
        while let Some(sibling) = cursor {
            let kind = sibling.kind();
            if self.profile.is_attribute(kind) {
                anchor_row = sibling.start_position().row;
                cursor = sibling.prev_sibling();
                continue;
            }
            if !self.profile.is_comment(kind) || sibling.end_position().row + 1 < anchor_row {
                break;
            }
            let trailing = sibling
                .prev_sibling()
                .is_some_and(|before| before.end_position().row == sibling.start_position().row);
            if trailing {
                break;
            }
            block.push(self.text(sibling)?);
            anchor_row = sibling.start_position().row;
            cursor = sibling.prev_sibling();
        }
        if block.is_empty() {
            return Ok(None);
        }
        block.reverse();
        Ok(clean_comment(&block.join("\n")))
    }

    /// File-level documentation.
    fn module_doc(&self, children: &[Node<'_>]) -> Result<Option<String>, ParseError> {
        let Some(first) = children.first() else {
            return Ok(None);
        };
        if self.profile.docstring_first_statement {
            if let Some(doc) = self.string_statement(*first)? {
                return Ok(Some(doc));
            }
        }

        // Leading comment block, separated from the next item by a blank line
        let mut end = 0;
        while end < children.len() && self.profile.is_comment(children[end].kind()) {
            if end > 0 && children[end].start_position().row > children[end - 1].end_position().row + 1 {
                break;
            }
            end += 1;
        }
        if end == 0 {
            return Ok(None);
        }
        let last = children[end - 1];
        let detached = match children.get(end) {
            Some(next) => next.start_position().row > last.end_position().row + 1,
            None => true,
        };
        if !detached {
            return Ok(None);
        }
        let texts = children[..end]
            .iter()
            .map(|c| self.text(*c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clean_comment(&texts.join("\n")))
    }

    fn text(&self, node: Node<'_>) -> Result<&'a str, ParseError> {
        safe_str_slice(self.src.content, node.start_byte(), node.end_byte()).ok_or_else(|| {
            ParseError::InvalidSpan {
                path: self.src.file_path.to_string(),
                start: node.start_byte(),
                end: node.end_byte(),
            }
        })
    }
}

fn push_unit(out: &mut Extraction, unit: CodeUnit) {
    if unit.unit_type == UnitType::Class {
        out.classes.push(unit);
    } else {
        out.functions.push(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ParserRegistry;

    fn extract(path: &str, source: &str) -> Extraction {
        let registry = ParserRegistry::new();
        let mut parsers = ParserSet::new(&registry);
        let language = Language::from_path(path).unwrap();
        let src = SourceText::new(path, Some(language), source);
        parse_with_grammar(&mut parsers, language, &src, &AnalysisConfig::default()).unwrap()
    }

    fn names(units: &[CodeUnit]) -> Vec<&str> {
        units.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_python_class_methods_and_docstrings() {
        let source = r#""""Shapes module."""

import math
from os import path


class Circle(Shape):
    """A round shape."""

    def __init__(self, r):
        self.r = r

    @property
    def area(self):
        """Area of the circle."""
        return math.pi * self.r ** 2


def helper():
    return 1
"#;
        let ex = extract("shapes.py", source);
        assert_eq!(ex.module_doc.as_deref(), Some("Shapes module."));
        assert_eq!(ex.imports.len(), 2);
        assert_eq!(ex.imports[0].name, "import math");
        assert_eq!(ex.imports[1].name, "from os import path");

        assert_eq!(names(&ex.classes), vec!["Circle"]);
        let circle = &ex.classes[0];
        assert_eq!(circle.docstring.as_deref(), Some("A round shape."));
        assert_eq!(names(&circle.children), vec!["__init__", "area"]);

        let area = &circle.children[1];
        assert_eq!(area.unit_type, UnitType::Method);
        assert_eq!(area.qualified_name, "Circle.area");
        assert_eq!(area.parent_class.as_deref(), Some("Circle"));
        assert!(area.code.starts_with("@property"), "decorator kept in span: {}", area.code);
        assert_eq!(area.docstring.as_deref(), Some("Area of the circle."));

        assert_eq!(names(&ex.functions), vec!["helper"]);
        assert_eq!(ex.functions[0].line_start, 19);
        assert_eq!(ex.functions[0].line_end, 20);
    }

    #[test]
    fn test_python_decorated_function() {
        let source = "@app.route('/')\ndef index():\n    return 'hi'\n";
        let ex = extract("web.py", source);
        assert_eq!(ex.functions.len(), 1);
        let f = &ex.functions[0];
        assert_eq!(f.name, "index");
        assert_eq!(f.line_start, 1);
        assert_eq!(f.code, "@app.route('/')\ndef index():\n    return 'hi'");
    }

    #[test]
    fn test_python_comment_docstring_fallback() {
        let source = "x = 1\n\n# Compute things.\n# Twice.\ndef compute():\n    pass\n";
        let ex = extract("c.py", source);
        assert_eq!(ex.functions[0].docstring.as_deref(), Some("Compute things.\nTwice."));
        assert_eq!(ex.module_doc, None);
    }

    #[test]
    fn test_javascript_exports_and_arrows() {
        let source = r#"import { baz } from './b';

// Adds numbers.
export function add(a, b) { return a + b; }

export const twice = (x) => x * 2;

const local = function () { return 1; };

export default class Widget {
  render() { return baz(); }
  static create() { return new Widget(); }
}

export { add as plus };
"#;
        let ex = extract("w.js", source);
        assert_eq!(ex.imports.len(), 1);
        assert_eq!(ex.imports[0].name, "import { baz } from './b';");

        assert_eq!(names(&ex.functions), vec!["add", "twice", "local", "export { add as plus };"]);
        assert_eq!(ex.functions[0].docstring.as_deref(), Some("Adds numbers."));
        assert!(ex.functions[0].code.starts_with("export function add"));
        assert_eq!(ex.functions[3].unit_type, UnitType::Export);

        assert_eq!(names(&ex.classes), vec!["Widget"]);
        assert_eq!(names(&ex.classes[0].children), vec!["render", "create"]);
        assert_eq!(ex.classes[0].children[0].qualified_name, "Widget.render");
    }

    #[test]
    fn test_typescript_interfaces_and_aliases() {
        let source = r#"export interface Shape { area(): number; }
type Id = string;
abstract class Base {
  abstract run(): void;
  stop(): void {}
}
"#;
        let ex = extract("t.ts", source);
        let kinds: Vec<(&str, UnitType)> = ex
            .functions
            .iter()
            .map(|u| (u.name.as_str(), u.unit_type))
            .collect();
        assert_eq!(kinds, vec![("Shape", UnitType::Interface), ("Id", UnitType::TypeAlias)]);
        assert_eq!(names(&ex.classes), vec!["Base"]);
        assert_eq!(names(&ex.classes[0].children), vec!["run", "stop"]);
    }

    #[test]
    fn test_rust_items() {
        let source = r#"use std::fmt;

/// A point.
#[derive(Debug)]
pub struct Point { x: i32 }

impl Point {
    /// Origin.
    pub fn origin() -> Self { Point { x: 0 } }
    fn shift(&mut self) { self.x += 1; }
}

pub trait Draw { fn draw(&self); }

type Pair = (i32, i32);

fn main() { let p = Point::origin(); }
"#;
        let ex = extract("lib.rs", source);
        assert_eq!(ex.imports.len(), 1);
        assert_eq!(names(&ex.classes), vec!["Point", "Point"]);
        assert_eq!(ex.classes[0].docstring.as_deref(), Some("A point."));
        assert!(ex.classes[0].children.is_empty());
        assert_eq!(names(&ex.classes[1].children), vec!["origin", "shift"]);
        assert_eq!(ex.classes[1].children[0].docstring.as_deref(), Some("Origin."));

        let kinds: Vec<(&str, UnitType)> = ex
            .functions
            .iter()
            .map(|u| (u.name.as_str(), u.unit_type))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Draw", UnitType::Interface),
                ("Pair", UnitType::TypeAlias),
                ("main", UnitType::Function)
            ]
        );
    }

    #[test]
    fn test_c_declarator_names() {
        let source = "#include <stdio.h>\n\nstatic char *name_of(int id) {\n  return 0;\n}\n\nint main(void) { return 0; }\n";
        let ex = extract("m.c", source);
        assert_eq!(ex.imports[0].name, "#include <stdio.h>");
        assert_eq!(names(&ex.functions), vec!["name_of", "main"]);
        assert_eq!(ex.functions[0].line_start, 3);
        assert_eq!(ex.functions[0].line_end, 5);
    }

    #[test]
    fn test_cpp_class_and_template() {
        let source = r#"class Engine {
public:
  void start() { run(); }
  void run();
};

template <typename T>
T max_of(T a, T b) { return a > b ? a : b; }
"#;
        let ex = extract("e.cpp", source);
        assert_eq!(names(&ex.classes), vec!["Engine"]);
        assert_eq!(names(&ex.classes[0].children), vec!["start"]);
        assert_eq!(names(&ex.functions), vec!["max_of"]);
        assert!(ex.functions[0].code.starts_with("template"));
    }

    #[test]
    fn test_java_class_with_javadoc() {
        let source = r#"import java.util.List;

/** Entry point. */
public class App {
    public App() {}
    /** Runs it. */
    public static void main(String[] args) { run(); }
}
"#;
        let ex = extract("App.java", source);
        assert_eq!(ex.imports.len(), 1);
        let app = &ex.classes[0];
        assert_eq!(app.name, "App");
        assert_eq!(app.docstring.as_deref(), Some("Entry point."));
        assert_eq!(names(&app.children), vec!["App", "main"]);
        assert_eq!(app.children[1].docstring.as_deref(), Some("Runs it."));
    }

    #[test]
    fn test_structureless_file_gets_module_unit() {
        let ex = extract("consts.py", "import os\nX = 1\n");
        assert_eq!(ex.imports.len(), 1);
        assert_eq!(ex.functions.len(), 1);
        assert_eq!(ex.functions[0].unit_type, UnitType::Module);
        assert_eq!(ex.functions[0].code, "import os\nX = 1\n");
    }

    #[test]
    fn test_empty_file_gets_zero_length_module() {
        let ex = extract("empty.ts", "");
        assert_eq!(ex.functions.len(), 1);
        let module = &ex.functions[0];
        assert_eq!(module.unit_type, UnitType::Module);
        assert_eq!((module.byte_start, module.byte_end), (0, 0));
        assert_eq!((module.line_start, module.line_end), (1, 1));
    }

    #[test]
    fn test_leading_comment_module_doc() {
        let source = "// Utilities for strings.\n\n// Trim it.\nfunction trim(s) { return s; }\n";
        let ex = extract("u.js", source);
        assert_eq!(ex.module_doc.as_deref(), Some("Utilities for strings."));
        assert_eq!(ex.functions[0].docstring.as_deref(), Some("Trim it."));
    }

    #[test]
    fn test_syntax_errors_do_not_fail() {
        let ex = extract("broken.py", "def ok():\n    pass\n\ndef broken(:\n");
        assert!(ex.functions.iter().any(|f| f.name == "ok"));
    }
}
