pub mod detect;
pub mod fallback;
pub mod pool;
pub mod profile;
pub mod walker;

// Re-exports from submodules
pub use detect::{detect_language, Language};
pub use pool::{ParserRegistry, ParserSet};
pub use profile::{FallbackFamily, GrammarProfile};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::{
    content_hash, find_char_boundary_before, generate_unit_id, safe_str_slice, LineIndex,
};
use crate::config::AnalysisConfig;
use crate::error::ParseError;

/// Language key recorded for files no profile recognises.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Kind of semantic unit extracted from source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    /// Whole-file unit emitted when nothing finer was found
    Module,
    /// Top-level function (including assignment-style definitions)
    Function,
    /// Function inside a class body
    Method,
    /// Class, struct, enum or impl block
    Class,
    /// Import statement, recorded verbatim
    Import,
    /// Export wrapper that holds no function or class
    Export,
    /// Interface, trait or protocol
    Interface,
    TypeAlias,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Module => "module",
            UnitType::Function => "function",
            UnitType::Method => "method",
            UnitType::Class => "class",
            UnitType::Import => "import",
            UnitType::Export => "export",
            UnitType::Interface => "interface",
            UnitType::TypeAlias => "type_alias",
        }
    }

    /// Units that can make calls and be called.
    pub fn is_callable(&self) -> bool {
        matches!(self, UnitType::Function | UnitType::Method)
    }
}

/// One named, located piece of source structure.
///
/// `code` is always `content[byte_start..byte_end]` of the owning file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUnit {
    /// Position-based ID, see [`crate::common::generate_unit_id`]
    pub unit_id: String,
    pub unit_type: UnitType,
    pub name: String,
    /// `"Parent.name"` for methods, else `name`
    pub qualified_name: String,
    pub code: String,
    pub byte_start: usize,
    pub byte_end: usize,
    /// 1-indexed, inclusive
    pub line_start: usize,
    /// 1-indexed, inclusive
    pub line_end: usize,
    pub file_path: String,
    pub language: String,
    pub parent_class: Option<String>,
    pub docstring: Option<String>,
    /// Methods in source order; only populated for classes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CodeUnit>,
}

impl CodeUnit {
    /// Graph key: `"file_path:qualified_name"`.
    pub fn key(&self) -> String {
        unit_key(&self.file_path, &self.qualified_name)
    }

    pub fn with_docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring;
        self
    }
}

/// Build a graph key from its parts.
pub fn unit_key(file_path: &str, qualified_name: &str) -> String {
    format!("{}:{}", file_path, qualified_name)
}

/// Which extractor produced a file's units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    Grammar,
    Indentation,
    Brace,
    WholeFile,
}

impl ParseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStrategy::Grammar => "grammar",
            ParseStrategy::Indentation => "indentation",
            ParseStrategy::Brace => "brace",
            ParseStrategy::WholeFile => "whole_file",
        }
    }
}

/// One input file, as handed over by the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInput {
    pub file_path: String,
    pub content: String,
    pub language_hint: Option<String>,
}

impl SourceInput {
    pub fn new(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            content: content.into(),
            language_hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.language_hint = Some(hint.into());
        self
    }
}

/// One source file's parse result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub file_path: String,
    pub language: String,
    pub content: String,
    /// SHA-256 of `content`, hex
    pub content_hash: String,
    /// Top-level non-class units
    pub functions: Vec<CodeUnit>,
    /// Top-level classes, each carrying its methods
    pub classes: Vec<CodeUnit>,
    pub imports: Vec<CodeUnit>,
    pub module_doc: Option<String>,
    pub strategy: ParseStrategy,
    pub parse_success: bool,
    /// Coded message (`"VSP-PRS-001: ..."`) when the grammar path failed
    pub parse_error: Option<String>,
}

impl ParsedFile {
    /// `len(functions) + Σ(1 + len(children))` over classes
    pub fn total_units(&self) -> usize {
        self.functions.len()
            + self
                .classes
                .iter()
                .map(|c| 1 + c.children.len())
                .sum::<usize>()
    }

    /// Functions, classes, and methods in source order (imports excluded).
    pub fn units(&self) -> impl Iterator<Item = &CodeUnit> {
        self.functions.iter().chain(
            self.classes
                .iter()
                .flat_map(|c| std::iter::once(c).chain(c.children.iter())),
        )
    }

    /// Function and method units.
    pub fn callables(&self) -> impl Iterator<Item = &CodeUnit> {
        self.units().filter(|u| u.unit_type.is_callable())
    }
}

/// Units extracted by either the walker or the fallback.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub functions: Vec<CodeUnit>,
    pub classes: Vec<CodeUnit>,
    pub imports: Vec<CodeUnit>,
    pub module_doc: Option<String>,
}

impl Extraction {
    /// No function-like or class unit was found
    pub fn is_structureless(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty()
    }
}

/// Borrowed view of one file used while building units.
#[derive(Debug)]
pub struct SourceText<'a> {
    pub file_path: &'a str,
    pub language: Option<Language>,
    pub content: &'a str,
    pub lines: LineIndex,
}

impl<'a> SourceText<'a> {
    pub fn new(file_path: &'a str, language: Option<Language>, content: &'a str) -> Self {
        Self {
            file_path,
            language,
            content,
            lines: LineIndex::new(content),
        }
    }

    pub fn language_key(&self) -> &'static str {
        self.language.map(|l| l.key()).unwrap_or(UNKNOWN_LANGUAGE)
    }

    /// Build a unit over `content[start..end]`.
    pub fn unit(
        &self,
        unit_type: UnitType,
        name: impl Into<String>,
        parent_class: Option<&str>,
        start: usize,
        end: usize,
    ) -> Result<CodeUnit, ParseError> {
        let code = safe_str_slice(self.content, start, end).ok_or_else(|| ParseError::InvalidSpan {
            path: self.file_path.to_string(),
            start,
            end,
        })?;
        Ok(self.build(unit_type, name.into(), parent_class, start, end, code))
    }

    /// Build a unit after snapping the span onto character boundaries.
    ///
    /// Used by the heuristic extractors, whose spans come from line arithmetic.
    pub fn unit_clamped(
        &self,
        unit_type: UnitType,
        name: impl Into<String>,
        parent_class: Option<&str>,
        start: usize,
        end: usize,
    ) -> CodeUnit {
        let end = find_char_boundary_before(self.content, end);
        let start = find_char_boundary_before(self.content, start.min(end));
        let code = &self.content[start..end];
        self.build(unit_type, name.into(), parent_class, start, end, code)
    }

    fn build(
        &self,
        unit_type: UnitType,
        name: String,
        parent_class: Option<&str>,
        start: usize,
        end: usize,
        code: &str,
    ) -> CodeUnit {
        let qualified_name = match parent_class {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.clone(),
        };
        CodeUnit {
            unit_id: generate_unit_id(self.file_path, start, end),
            unit_type,
            name,
            qualified_name,
            code: code.to_string(),
            byte_start: start,
            byte_end: end,
            line_start: self.lines.line_of(start),
            line_end: self.lines.last_line_of(start, end),
            file_path: self.file_path.to_string(),
            language: self.language_key().to_string(),
            parent_class: parent_class.map(str::to_string),
            docstring: None,
            children: Vec::new(),
        }
    }
}

/// True when the input should bypass every structural extractor.
fn is_pathological(content: &str, config: &AnalysisConfig) -> bool {
    content.len() > config.max_file_bytes
        || content.lines().any(|line| line.len() > config.max_line_bytes)
}

/// Parse one file.
///
/// Never fails: grammar unavailability routes to the fallback silently,
/// grammar failures are recorded in `parse_error` and also route to the
/// fallback, and the fallback always yields at least one unit.
pub fn parse_source(
    parsers: &mut ParserSet<'_>,
    input: &SourceInput,
    config: &AnalysisConfig,
) -> ParsedFile {
    let language = detect_language(&input.file_path, input.language_hint.as_deref());
    let src = SourceText::new(&input.file_path, language, &input.content);

    let mut parse_error = None;
    let (extraction, strategy) = if is_pathological(&input.content, config) {
        debug!(file = %input.file_path, bytes = input.content.len(), "oversized or minified input");
        (fallback::whole_file(&src, config), ParseStrategy::WholeFile)
    } else {
        match language {
            Some(lang) => match walker::parse_with_grammar(parsers, lang, &src, config) {
                Ok(extraction) => (extraction, ParseStrategy::Grammar),
                Err(err) if err.is_unavailable() => {
                    debug!(file = %input.file_path, language = %lang, "no grammar, using fallback");
                    fallback::extract(&src, config)
                }
                Err(err) => {
                    warn!(file = %input.file_path, error = %err, "grammar parse failed, using fallback");
                    parse_error = Some(err.coded_message());
                    fallback::extract(&src, config)
                }
            },
            None => (fallback::whole_file(&src, config), ParseStrategy::WholeFile),
        }
    };

    debug!(
        file = %input.file_path,
        strategy = strategy.as_str(),
        functions = extraction.functions.len(),
        classes = extraction.classes.len(),
        imports = extraction.imports.len(),
        "parsed"
    );

    ParsedFile {
        file_path: input.file_path.clone(),
        language: src.language_key().to_string(),
        content: input.content.clone(),
        content_hash: content_hash(&input.content),
        functions: extraction.functions,
        classes: extraction.classes,
        imports: extraction.imports,
        module_doc: extraction.module_doc,
        strategy,
        parse_success: parse_error.is_none(),
        parse_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(path: &str, content: &str) -> ParsedFile {
        let registry = ParserRegistry::new();
        let mut parsers = ParserSet::new(&registry);
        parse_source(&mut parsers, &SourceInput::new(path, content), &AnalysisConfig::default())
    }

    #[test]
    fn test_unit_code_matches_span() {
        let src = SourceText::new("a.py", Some(Language::Python), "x = 1\ndef f():\n    pass\n");
        let unit = src.unit(UnitType::Function, "f", None, 6, 24).unwrap();
        assert_eq!(unit.code, "def f():\n    pass\n");
        assert_eq!(unit.line_start, 2);
        assert_eq!(unit.line_end, 3);
        assert_eq!(unit.qualified_name, "f");
        assert_eq!(unit.language, "python");
    }

    #[test]
    fn test_unit_invalid_span_is_error() {
        let src = SourceText::new("a.py", None, "abc");
        let err = src.unit(UnitType::Function, "f", None, 2, 10).unwrap_err();
        assert!(matches!(err, ParseError::InvalidSpan { .. }));
    }

    #[test]
    fn test_method_qualified_name() {
        let src = SourceText::new("a.py", None, "abc");
        let unit = src.unit(UnitType::Method, "run", Some("Job"), 0, 3).unwrap();
        assert_eq!(unit.qualified_name, "Job.run");
        assert_eq!(unit.key(), "a.py:Job.run");
        assert_eq!(unit.language, UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_grammar_strategy_for_linked_language() {
        let file = parse("m.py", "def f():\n    return 1\n");
        assert_eq!(file.strategy, ParseStrategy::Grammar);
        assert!(file.parse_success);
        assert_eq!(file.functions.len(), 1);
        assert_eq!(file.content_hash.len(), 64);
    }

    #[test]
    fn test_profile_only_language_routes_to_fallback() {
        let file = parse("main.go", "func main() {\n\tgo()\n}\n");
        assert_eq!(file.strategy, ParseStrategy::Brace);
        assert!(file.parse_success, "unavailable grammar is not a failure");
        assert!(file.parse_error.is_none());
        assert_eq!(file.functions[0].name, "main");
    }

    #[test]
    fn test_unknown_extension_is_whole_file() {
        let file = parse("notes.txt", "x = 1\ny = 2");
        assert_eq!(file.strategy, ParseStrategy::WholeFile);
        assert_eq!(file.language, UNKNOWN_LANGUAGE);
        assert_eq!(file.total_units(), 1);
        assert_eq!(file.functions[0].unit_type, UnitType::Module);
        assert_eq!(file.functions[0].code, "x = 1\ny = 2");
    }

    #[test]
    fn test_minified_line_skips_grammar() {
        let long_line = format!("var a = [{}];", "1,".repeat(15_000));
        let file = parse("bundle.min.js", &long_line);
        assert_eq!(file.strategy, ParseStrategy::WholeFile);
        assert_eq!(file.total_units(), 1);
    }

    #[test]
    fn test_total_units_counts_methods() {
        let file = parse(
            "shapes.py",
            "class Shape:\n    def area(self):\n        return 0\n    def name(self):\n        return 's'\n\ndef helper():\n    pass\n",
        );
        assert_eq!(file.classes.len(), 1);
        assert_eq!(file.classes[0].children.len(), 2);
        assert_eq!(file.total_units(), 4);
        assert_eq!(file.callables().count(), 3);
    }
}
