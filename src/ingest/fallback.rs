//! Heuristic fallback extraction.
//!
//! Used when a language has no usable grammar or the walker failed. Two
//! block heuristics exist, picked by the profile's [`FallbackFamily`]:
//!
//! - indentation: a block runs to the last following non-blank line indented
//!   deeper than the definition line
//! - brace: a block runs from its opening `{` to the matching `}`, counted
//!   outside string literals and comments, capped at `brace_line_cap` lines
//!
//! When neither applies or nothing is found, the whole file becomes one
//! `module` unit. That last step cannot fail, so every file yields a unit.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::profile::FallbackFamily;
use super::{CodeUnit, Extraction, ParseStrategy, SourceText, UnitType};
use crate::common::{char_cap_offset, clean_comment, strip_string_quotes};
use crate::config::AnalysisConfig;

/// Extract units heuristically.
///
/// The reported strategy is `WholeFile` whenever the module unit had to be
/// emitted.
pub fn extract(src: &SourceText<'_>, config: &AnalysisConfig) -> (Extraction, ParseStrategy) {
    let family = src
        .language
        .map(|l| l.family())
        .unwrap_or(FallbackFamily::WholeFile);
    let lines = split_lines(src.content);

    let (mut extraction, strategy) = match family {
        FallbackFamily::Indentation => (indentation::extract(src, &lines), ParseStrategy::Indentation),
        FallbackFamily::Brace => (brace::extract(src, &lines, config), ParseStrategy::Brace),
        FallbackFamily::WholeFile => (Extraction::default(), ParseStrategy::WholeFile),
    };
    if src.language.is_some() {
        extraction.imports = import_lines(src, &lines);
        extraction.module_doc = module_doc(&lines, family);
    }

    if extraction.is_structureless() {
        extraction.functions.push(module_unit(src, config));
        return (extraction, ParseStrategy::WholeFile);
    }
    (extraction, strategy)
}

/// Only the whole-file module unit.
pub fn whole_file(src: &SourceText<'_>, config: &AnalysisConfig) -> Extraction {
    Extraction {
        functions: vec![module_unit(src, config)],
        ..Extraction::default()
    }
}

/// Whole-file `module` unit, truncated to `module_char_cap` characters.
///
/// An empty file yields a zero-length unit on line 1.
pub fn module_unit(src: &SourceText<'_>, config: &AnalysisConfig) -> CodeUnit {
    let end = char_cap_offset(src.content, config.fallback.module_char_cap);
    let name = Path::new(src.file_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| src.file_path.to_string());
    src.unit_clamped(UnitType::Module, name, None, 0, end)
}

/// One source line without its terminator.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    start: usize,
    text: &'a str,
}

impl Line<'_> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn split_lines(content: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for piece in content.split_inclusive('\n') {
        let text = piece.trim_end_matches('\n').trim_end_matches('\r');
        lines.push(Line { start, text });
        start += piece.len();
    }
    lines
}

/// Contiguous comment lines directly above `idx`, skipping annotation lines.
fn comment_above(lines: &[Line<'_>], idx: usize, markers: &[&str]) -> Option<String> {
    let mut k = idx;
    while k > 0 {
        let t = lines[k - 1].text.trim_start();
        if t.starts_with('@') || t.starts_with("#[") {
            k -= 1;
        } else {
            break;
        }
    }
    let end = k;
    while k > 0 {
        let t = lines[k - 1].text.trim_start();
        if markers.iter().any(|m| t.starts_with(m)) {
            k -= 1;
        } else {
            break;
        }
    }
    if k == end {
        return None;
    }
    let block: Vec<&str> = lines[k..end].iter().map(|l| l.text).collect();
    clean_comment(&block.join("\n"))
}

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:import\b|from\s+\S+\s+import\b|#\s*include\b|use\s+\S|using\s+[\w.]+\s*;|require(?:_relative|_once)?\b|include(?:_once)?\s*[('"]|extern\s+crate\b)"#,
    )
    .expect("Invalid import line regex")
});

static IMPORT_BLOCK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s*\(\s*$").expect("Invalid import block regex"));

/// Un-indented import statements, verbatim. `import (` blocks are one unit.
fn import_lines(src: &SourceText<'_>, lines: &[Line<'_>]) -> Vec<CodeUnit> {
    let mut units = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if IMPORT_BLOCK_OPEN.is_match(line.text) {
            let close = (i + 1..lines.len())
                .find(|&k| lines[k].text.trim() == ")")
                .unwrap_or(lines.len() - 1);
            let end = lines[close].end();
            units.push(src.unit_clamped(UnitType::Import, &src.content[line.start..end], None, line.start, end));
            i = close + 1;
            continue;
        }
        if IMPORT_LINE.is_match(line.text) {
            let text = line.text.trim_end();
            units.push(src.unit_clamped(UnitType::Import, text, None, line.start, line.start + text.len()));
        }
        i += 1;
    }
    units
}

/// File-level documentation: a leading triple-quoted string (indentation
/// family) or a leading comment block followed by a blank line.
fn module_doc(lines: &[Line<'_>], family: FallbackFamily) -> Option<String> {
    let first = lines.iter().position(|l| !l.is_blank())?;
    if family == FallbackFamily::Indentation {
        if let Some((doc, _)) = indentation::triple_quoted(lines, first) {
            return Some(doc);
        }
        return None;
    }
    let mut end = first;
    while end < lines.len() && is_comment_line(lines[end].text) {
        end += 1;
    }
    if end == first || (end < lines.len() && !lines[end].is_blank()) {
        return None;
    }
    let block: Vec<&str> = lines[first..end].iter().map(|l| l.text).collect();
    clean_comment(&block.join("\n"))
}

fn is_comment_line(text: &str) -> bool {
    let t = text.trim_start();
    BRACE_COMMENT_MARKERS.iter().any(|m| t.starts_with(m))
}

const BRACE_COMMENT_MARKERS: &[&str] = &["//", "/*", "*"];

mod indentation {
    use super::*;

    static DEF: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(\s*)(?:async\s+)?def\s+([A-Za-z_]\w*)").expect("Invalid def regex")
    });
    static CLASS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(\s*)class\s+([A-Za-z_]\w*)").expect("Invalid class regex"));
    static DECORATOR: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\s*@").expect("Invalid decorator regex"));

    fn indent_width(text: &str) -> usize {
        text.chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum()
    }

    /// Index of the last non-blank line indented deeper than `base`.
    fn block_end(lines: &[Line<'_>], def_idx: usize, base: usize) -> usize {
        let mut last = def_idx;
        for (j, line) in lines.iter().enumerate().skip(def_idx + 1) {
            if line.is_blank() {
                continue;
            }
            if indent_width(line.text) > base {
                last = j;
            } else {
                break;
            }
        }
        last
    }

    /// First line of the decorator run directly above `idx`.
    fn decorator_start(lines: &[Line<'_>], idx: usize, indent: usize) -> usize {
        let mut k = idx;
        while k > 0
            && DECORATOR.is_match(lines[k - 1].text)
            && indent_width(lines[k - 1].text) == indent
        {
            k -= 1;
        }
        k
    }

    /// Triple-quoted string starting on line `idx`, with the line it closes on.
    pub(super) fn triple_quoted(lines: &[Line<'_>], idx: usize) -> Option<(String, usize)> {
        let t = lines[idx].text.trim_start();
        let body = t.trim_start_matches(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B'));
        let quote = ["\"\"\"", "'''"].into_iter().find(|q| body.starts_with(q))?;
        let mut parts = vec![body];
        let mut close = idx;
        if body[3..].contains(quote) {
            return strip_string_quotes(body).map(|doc| (doc, idx));
        }
        for (k, line) in lines.iter().enumerate().skip(idx + 1) {
            parts.push(line.text.trim());
            close = k;
            if line.text.contains(quote) {
                break;
            }
        }
        let joined = parts.join("\n");
        strip_string_quotes(&joined).map(|doc| (doc, close))
    }

    fn docstring(lines: &[Line<'_>], def_idx: usize, end_idx: usize, start_idx: usize) -> Option<String> {
        let first_body = (def_idx + 1..=end_idx).find(|&k| !lines[k].is_blank());
        first_body
            .and_then(|k| triple_quoted(lines, k))
            .map(|(doc, _)| doc)
            .or_else(|| comment_above(lines, start_idx, &["#"]))
    }

    pub(super) fn extract(src: &SourceText<'_>, lines: &[Line<'_>]) -> Extraction {
        let mut out = Extraction::default();
        let mut i = 0;
        while i < lines.len() {
            let text = lines[i].text;
            if let Some(caps) = CLASS.captures(text) {
                let base = indent_width(text);
                let end = block_end(lines, i, base);
                let start = decorator_start(lines, i, base);
                let name = caps[2].to_string();

                let mut class = src
                    .unit_clamped(UnitType::Class, &name, None, lines[start].start, lines[end].end())
                    .with_docstring(docstring(lines, i, end, start));
                class.children = methods(src, lines, i, end, base, &name);
                out.classes.push(class);
                i = end + 1;
            } else if let Some(caps) = DEF.captures(text) {
                let base = indent_width(text);
                let end = block_end(lines, i, base);
                let start = decorator_start(lines, i, base);
                let unit = src
                    .unit_clamped(UnitType::Function, &caps[2], None, lines[start].start, lines[end].end())
                    .with_docstring(docstring(lines, i, end, start));
                out.functions.push(unit);
                i = end + 1;
            } else {
                i += 1;
            }
        }
        out
    }

    fn methods(
        src: &SourceText<'_>,
        lines: &[Line<'_>],
        class_idx: usize,
        class_end: usize,
        class_indent: usize,
        class_name: &str,
    ) -> Vec<CodeUnit> {
        let mut methods = Vec::new();
        let mut j = class_idx + 1;
        while j <= class_end {
            let text = lines[j].text;
            let indent = indent_width(text);
            if CLASS.is_match(text) {
                j = block_end(lines, j, indent) + 1;
            } else if let Some(caps) = DEF.captures(text).filter(|_| indent > class_indent) {
                let end = block_end(lines, j, indent);
                let start = decorator_start(lines, j, indent);
                let unit = src
                    .unit_clamped(
                        UnitType::Method,
                        &caps[2],
                        Some(class_name),
                        lines[start].start,
                        lines[end].end(),
                    )
                    .with_docstring(docstring(lines, j, end, start));
                methods.push(unit);
                j = end + 1;
            } else {
                j += 1;
            }
        }
        methods
    }
}

mod brace {
    use super::*;

    /// Definition patterns, tried in order; group 1 is the name.
    static FUNCTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            // JavaScript / PHP `function`
            r"^\s*(?:export\s+)?(?:default\s+)?(?:(?:public|private|protected|static|final|abstract)\s+)*(?:async\s+)?function\s*\*?\s*&?\s*([A-Za-z_$][\w$]*)\s*\(",
            // Rust `fn`
            r#"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:(?:const|async|unsafe|extern(?:\s+"[^"]*")?)\s+)*fn\s+([A-Za-z_]\w*)"#,
            // Go / Swift `func`
            r"^\s*(?:(?:public|private|internal|fileprivate|open|static|override|final|class|mutating)\s+)*func\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)",
            // Kotlin `fun`
            r"^\s*(?:(?:public|private|protected|internal|override|open|abstract|suspend|inline|operator)\s+)*fun\s+(?:<[^>]*>\s*)?(?:[\w.]+\.)?([A-Za-z_]\w*)\s*\(",
            // Scala `def`
            r"^\s*(?:(?:override|private|protected|final|implicit)\s+)*def\s+([A-Za-z_]\w*)",
            // JavaScript arrow / function-expression assignment
            r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)",
            // C-like typed signature
            r"^\s*(?:[\w:<>,\[\]*&]+\s+)+\**&?([A-Za-z_]\w*)\s*\([^;]*$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid function pattern"))
        .collect()
    });

    /// `name(args) {` shorthand, only recognised inside class bodies.
    static METHOD_SHORTHAND: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*(?:static\s+)?(?:async\s+)?(?:get\s+|set\s+)?\*?([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*\{")
            .expect("Invalid method shorthand regex")
    });

    static CLASS_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^\s*(?:export\s+)?(?:default\s+)?(?:(?:public|private|protected|internal|abstract|final|static|sealed|partial|open|data|case|inner|pub(?:\([^)]*\))?)\s+)*(?:enum\s+)?(?P<kw>class|struct|interface|trait|protocol|enum|object|impl|extension)(?:<[^>]*>)?\s+(?:[\w:<>, ]+?\s+for\s+)?(?P<name>[A-Za-z_]\w*)",
        )
        .expect("Invalid class pattern")
    });

    static GO_TYPE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*type\s+(?P<name>[A-Za-z_]\w*)\s+(?P<kw>struct|interface)\b")
            .expect("Invalid Go type pattern")
    });

    /// Names that look like calls in signatures but are control flow.
    const KEYWORD_NAMES: &[&str] = &[
        "if", "for", "while", "switch", "catch", "return", "else", "new", "throw", "case",
        "sizeof", "do", "try", "using", "lock", "foreach", "synchronized", "when", "typeof",
        "delete", "await", "yield", "function", "match", "elif", "with",
    ];

    /// Leading tokens that rule out a typed signature.
    const EXCLUDED_FIRST_TOKENS: &[&str] = &[
        "return", "else", "new", "throw", "case", "await", "yield", "delete", "goto", "typedef",
        "using", "import", "package", "echo", "print",
    ];

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Opening {
        /// Offset of `{` and its line
        Brace(usize, usize),
        /// Expression-bodied form; the unit is the signature line
        Expression,
        /// Forward declaration or not a definition
        Declaration,
    }

    /// Name of the function defined on `text`, with the offset just past it.
    fn match_function(text: &str, inside_class: bool) -> Option<(String, usize)> {
        let first_token = text.split_whitespace().next().unwrap_or("");
        if EXCLUDED_FIRST_TOKENS.contains(&first_token) {
            return None;
        }
        let patterns = FUNCTION_PATTERNS.iter();
        let shorthand = inside_class.then_some(&*METHOD_SHORTHAND);
        for re in patterns.chain(shorthand) {
            if let Some(caps) = re.captures(text) {
                let Some(name) = caps.get(1) else {
                    continue;
                };
                if KEYWORD_NAMES.contains(&name.as_str()) {
                    continue;
                }
                return Some((name.as_str().to_string(), name.end()));
            }
        }
        None
    }

    fn match_class(text: &str) -> Option<(String, UnitType, usize)> {
        let caps = CLASS_PATTERN.captures(text).or_else(|| GO_TYPE.captures(text))?;
        let whole = caps.get(0)?;
        let name = caps.name("name")?.as_str().to_string();
        let unit_type = match caps.name("kw")?.as_str() {
            "interface" | "trait" | "protocol" => UnitType::Interface,
            _ => UnitType::Class,
        };
        Some((name, unit_type, whole.end()))
    }

    fn is_definition_line(text: &str) -> bool {
        match_function(text, false).is_some() || match_class(text).is_some()
    }

    /// A `=` that is an assignment, not part of `==`, `=>`, `<=`, `!=`, ...
    fn has_lone_equals(text: &str) -> bool {
        let bytes = text.as_bytes();
        bytes.iter().enumerate().any(|(i, &b)| {
            b == b'='
                && !(i > 0 && b"=!<>+-*/%&|^:".contains(&bytes[i - 1]))
                && !bytes.get(i + 1).is_some_and(|n| *n == b'=' || *n == b'>')
        })
    }

    fn expression_bodied(tail: &str) -> bool {
        tail.contains("=>") || has_lone_equals(tail)
    }

    /// First `{` or `;` outside string literals and line comments.
    fn first_structural(text: &str) -> Option<(usize, u8)> {
        let bytes = text.as_bytes();
        let mut quote: Option<u8> = None;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) => {
                    if b == b'\\' {
                        i += 1;
                    } else if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'"' | b'`' => quote = Some(b),
                    b'/' if bytes.get(i + 1) == Some(&b'/') => return None,
                    b'{' | b';' => return Some((i, b)),
                    _ => {}
                },
            }
            i += 1;
        }
        None
    }

    fn find_open(lines: &[Line<'_>], idx: usize, from: usize, window: usize) -> Opening {
        let line = lines[idx];
        let tail = line.text.get(from..).unwrap_or("");
        match first_structural(tail) {
            Some((pos, b'{')) => return Opening::Brace(line.start + from + pos, idx),
            Some((pos, _)) => {
                return if expression_bodied(&tail[..pos]) {
                    Opening::Expression
                } else {
                    Opening::Declaration
                };
            }
            None if expression_bodied(tail) => return Opening::Expression,
            None => {}
        }
        let last = (idx + window).min(lines.len().saturating_sub(1));
        for (k, next) in lines.iter().enumerate().take(last + 1).skip(idx + 1) {
            if is_definition_line(next.text) {
                return Opening::Declaration;
            }
            match first_structural(next.text) {
                Some((pos, b'{')) => return Opening::Brace(next.start + pos, k),
                Some(_) => return Opening::Declaration,
                None => {}
            }
        }
        Opening::Declaration
    }

    /// Byte length of a char literal starting at `i`, if one is there.
    fn char_literal_len(bytes: &[u8], i: usize) -> Option<usize> {
        let first = *bytes.get(i + 1)?;
        if first == b'\\' {
            let close = (i + 2..(i + 12).min(bytes.len())).find(|&k| bytes[k] == b'\'')?;
            return Some(close - i + 1);
        }
        let width = match first {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            _ => 4,
        };
        (bytes.get(i + 1 + width) == Some(&b'\'')).then_some(width + 2)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum ScanState {
        Code,
        Str(u8),
        LineComment,
        BlockComment,
    }

    /// Offset just past the `}` matching the `{` at `open`.
    ///
    /// Returns None when no match is found by line index `line_limit`.
    pub(super) fn matching_brace(
        content: &str,
        open: usize,
        open_line: usize,
        line_limit: usize,
        single_quote_strings: bool,
    ) -> Option<usize> {
        let bytes = content.as_bytes();
        let mut depth = 0usize;
        let mut line = open_line;
        let mut state = ScanState::Code;
        let mut i = open;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b'\n' {
                line += 1;
                if line > line_limit {
                    return None;
                }
            }
            let next = bytes.get(i + 1).copied();
            match state {
                ScanState::Code => match b {
                    b'{' => depth += 1,
                    b'}' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return Some(i + 1);
                        }
                    }
                    b'"' | b'`' => state = ScanState::Str(b),
                    b'\'' if single_quote_strings => state = ScanState::Str(b),
                    b'\'' => {
                        if let Some(len) = char_literal_len(bytes, i) {
                            i += len;
                            continue;
                        }
                    }
                    b'/' if next == Some(b'/') => {
                        state = ScanState::LineComment;
                        i += 1;
                    }
                    b'/' if next == Some(b'*') => {
                        state = ScanState::BlockComment;
                        i += 1;
                    }
                    _ => {}
                },
                ScanState::Str(quote) => {
                    if b == b'\\' {
                        if next == Some(b'\n') {
                            line += 1;
                        }
                        i += 2;
                        continue;
                    } else if b == quote || (b == b'\n' && quote != b'`') {
                        state = ScanState::Code;
                    }
                }
                ScanState::LineComment => {
                    if b == b'\n' {
                        state = ScanState::Code;
                    }
                }
                ScanState::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        state = ScanState::Code;
                        i += 1;
                    }
                }
            }
            i += 1;
        }
        None
    }

    struct BraceExtractor<'s, 'a, 'l> {
        src: &'s SourceText<'a>,
        lines: &'l [Line<'a>],
        line_cap: usize,
        window: usize,
        single_quote_strings: bool,
    }

    /// Resolved extent of one definition.
    struct Block {
        end: usize,
        end_line: usize,
    }

    impl BraceExtractor<'_, '_, '_> {
        /// Extent of the definition on line `idx`, bounded by `limit_line`.
        fn block(&self, idx: usize, from: usize, limit_line: usize) -> Option<Block> {
            match find_open(self.lines, idx, from, self.window) {
                Opening::Declaration => None,
                Opening::Expression => Some(Block {
                    end: self.lines[idx].end(),
                    end_line: idx,
                }),
                Opening::Brace(open, open_line) => {
                    let cap_line = (idx + self.line_cap.max(1) - 1).min(limit_line);
                    match matching_brace(self.src.content, open, open_line, cap_line, self.single_quote_strings) {
                        Some(end) => Some(Block {
                            end,
                            end_line: self.src.lines.line_of(end.saturating_sub(1)) - 1,
                        }),
                        None => Some(Block {
                            end: self.lines[cap_line].end(),
                            end_line: cap_line,
                        }),
                    }
                }
            }
        }

        fn docstring(&self, idx: usize) -> Option<String> {
            comment_above(self.lines, idx, BRACE_COMMENT_MARKERS)
        }

        fn extract(&self) -> Extraction {
            let mut out = Extraction::default();
            let last_line = self.lines.len().saturating_sub(1);
            let mut i = 0;
            while i < self.lines.len() {
                let text = self.lines[i].text;
                if let Some((name, unit_type, from)) = match_class(text) {
                    if let Some(block) = self.block(i, from, last_line) {
                        let start = self.lines[i].start;
                        let mut unit = self
                            .src
                            .unit_clamped(unit_type, &name, None, start, block.end)
                            .with_docstring(self.docstring(i));
                        if unit_type == UnitType::Class {
                            unit.children = self.methods(i, &block, &name);
                            out.classes.push(unit);
                        } else {
                            out.functions.push(unit);
                        }
                        i = block.end_line + 1;
                        continue;
                    }
                } else if let Some((name, from)) = match_function(text, false) {
                    if let Some(block) = self.block(i, from, last_line) {
                        let unit = self
                            .src
                            .unit_clamped(UnitType::Function, name, None, self.lines[i].start, block.end)
                            .with_docstring(self.docstring(i));
                        out.functions.push(unit);
                        i = block.end_line + 1;
                        continue;
                    }
                }
                i += 1;
            }
            out
        }

        /// Methods on the lines strictly inside a class block.
        fn methods(&self, class_idx: usize, class: &Block, class_name: &str) -> Vec<CodeUnit> {
            let mut methods = Vec::new();
            let mut j = class_idx + 1;
            while j < class.end_line {
                let text = self.lines[j].text;
                if let Some((_, _, from)) = match_class(text) {
                    j = self
                        .block(j, from, class.end_line)
                        .map(|b| b.end_line + 1)
                        .unwrap_or(j + 1);
                    continue;
                }
                if let Some((name, from)) = match_function(text, true) {
                    if let Some(block) = self.block(j, from, class.end_line) {
                        let end = block.end.min(class.end);
                        let unit = self
                            .src
                            .unit_clamped(UnitType::Method, name, Some(class_name), self.lines[j].start, end)
                            .with_docstring(self.docstring(j));
                        methods.push(unit);
                        j = block.end_line + 1;
                        continue;
                    }
                }
                j += 1;
            }
            methods
        }
    }

    pub(super) fn extract(src: &SourceText<'_>, lines: &[Line<'_>], config: &AnalysisConfig) -> Extraction {
        let single_quote_strings = src
            .language
            .map(|l| l.profile().single_quote_strings)
            .unwrap_or(true);
        BraceExtractor {
            src,
            lines,
            line_cap: config.fallback.brace_line_cap,
            window: config.fallback.brace_open_window,
            single_quote_strings,
        }
        .extract()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Language;

    fn run(path: &str, source: &str) -> (Extraction, ParseStrategy) {
        let language = Language::from_path(path);
        let src = SourceText::new(path, language, source);
        extract(&src, &AnalysisConfig::default())
    }

    fn names(units: &[CodeUnit]) -> Vec<&str> {
        units.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_unknown_language_single_module_unit() {
        let (ex, strategy) = run("data.unknownext", "x = 1\ny = 2");
        assert_eq!(strategy, ParseStrategy::WholeFile);
        assert_eq!(ex.functions.len(), 1);
        let module = &ex.functions[0];
        assert_eq!(module.unit_type, UnitType::Module);
        assert_eq!(module.name, "data");
        assert_eq!(module.code, "x = 1\ny = 2");
        assert_eq!((module.line_start, module.line_end), (1, 2));
    }

    #[test]
    fn test_module_unit_cap_on_char_boundary() {
        let content = "é".repeat(60_000);
        let src = SourceText::new("big.txt", None, &content);
        let unit = module_unit(&src, &AnalysisConfig::default());
        assert_eq!(unit.code.chars().count(), 50_000);
        assert_eq!(unit.byte_end, 100_000);
    }

    #[test]
    fn test_indentation_blocks() {
        let source = r#"import os

class Repo:
    """Stores things."""

    @staticmethod
    def open(path):
        return Repo()

    def close(self):
        def inner():
            pass
        inner()

# Entry point.
async def main():
    r = Repo.open("x")

    r.close()
print("done")
"#;
        let (ex, strategy) = run("repo.py", source);
        assert_eq!(strategy, ParseStrategy::Indentation);
        assert_eq!(ex.imports.len(), 1);

        let repo = &ex.classes[0];
        assert_eq!(repo.name, "Repo");
        assert_eq!(repo.docstring.as_deref(), Some("Stores things."));
        assert_eq!((repo.line_start, repo.line_end), (3, 13));
        assert_eq!(names(&repo.children), vec!["open", "close"]);
        assert_eq!(repo.children[0].line_start, 6, "decorator included");
        assert_eq!(repo.children[1].qualified_name, "Repo.close");

        assert_eq!(names(&ex.functions), vec!["main"]);
        let main = &ex.functions[0];
        assert_eq!((main.line_start, main.line_end), (16, 19));
        assert_eq!(main.docstring.as_deref(), Some("Entry point."));
    }

    #[test]
    fn test_brace_string_literal_does_not_break_block() {
        let source = "function foo() {\n  const s = \"{\";\n  return s;\n}\nfunction bar() {}\n";
        let src = SourceText::new("a.php", Some(Language::Php), source);
        let (ex, strategy) = extract(&src, &AnalysisConfig::default());
        assert_eq!(strategy, ParseStrategy::Brace);
        assert_eq!(names(&ex.functions), vec!["foo", "bar"]);
        assert_eq!(ex.functions[0].code, "function foo() {\n  const s = \"{\";\n  return s;\n}");
        assert_eq!((ex.functions[1].line_start, ex.functions[1].line_end), (5, 5));
    }

    #[test]
    fn test_brace_class_methods_and_docs() {
        let source = r#"package main

import (
	"fmt"
	"strings"
)

// Server handles requests.
type Server struct {
	name string
}

// Start runs the server.
func (s *Server) Start() error {
	fmt.Println("{")
	return nil
}

func helper(x int) int { return x }
"#;
        let (ex, strategy) = run("server.go", source);
        assert_eq!(strategy, ParseStrategy::Brace);
        assert_eq!(ex.imports.len(), 1);
        assert!(ex.imports[0].name.contains("\"strings\""));
        assert_eq!(names(&ex.classes), vec!["Server"]);
        assert_eq!(ex.classes[0].docstring.as_deref(), Some("Server handles requests."));
        assert_eq!(names(&ex.functions), vec!["Start", "helper"]);
        assert_eq!(ex.functions[0].docstring.as_deref(), Some("Start runs the server."));
        assert_eq!((ex.functions[0].line_start, ex.functions[0].line_end), (14, 17));
    }

    #[test]
    fn test_brace_methods_inside_class() {
        let source = r#"public class Greeter {
    private String name;

    public Greeter(String name) {
        this.name = name;
    }

    public abstract void reset();

    public String greet() {
        if (name == null) {
            return "hi";
        }
        return "hi " + name;
    }
}
"#;
        let (ex, _) = run("Greeter.cs", source);
        let greeter = &ex.classes[0];
        assert_eq!(names(&greeter.children), vec!["Greeter", "greet"]);
        assert_eq!(greeter.children[1].line_end, 15);
        assert_eq!(greeter.line_end, 16);
    }

    #[test]
    fn test_expression_bodied_forms() {
        let source = "fun square(x: Int) = x * x\n\nfun main() {\n    println(square(2))\n}\n";
        let (ex, _) = run("m.kt", source);
        assert_eq!(names(&ex.functions), vec!["square", "main"]);
        assert_eq!(ex.functions[0].code, "fun square(x: Int) = x * x");
    }

    #[test]
    fn test_unclosed_brace_is_capped() {
        let mut source = String::from("func broken() {\n");
        for _ in 0..100 {
            source.push_str("\tx := 1\n");
        }
        let (ex, _) = run("b.go", &source);
        assert_eq!(ex.functions.len(), 1);
        assert_eq!(ex.functions[0].line_end, 50);
    }

    #[test]
    fn test_ruby_has_no_block_heuristic() {
        let (ex, strategy) = run("app.rb", "require 'json'\n\ndef go\n  1\nend\n");
        assert_eq!(strategy, ParseStrategy::WholeFile);
        assert_eq!(ex.imports.len(), 1);
        assert_eq!(ex.functions.len(), 1);
        assert_eq!(ex.functions[0].unit_type, UnitType::Module);
    }

    #[test]
    fn test_leading_comment_module_doc() {
        let (ex, _) = run("lib.swift", "// Networking helpers.\n\nfunc fetch() {\n}\n");
        assert_eq!(ex.module_doc.as_deref(), Some("Networking helpers."));
        assert_eq!(ex.functions[0].docstring, None);
    }
}
