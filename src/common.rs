//! Common utility functions shared by the walker, fallback and graph builders.
//!
//! Byte-offset helpers that never panic on malformed spans, line lookup, the
//! position-based unit ID, and docstring text cleanup.

use sha2::{Digest, Sha256};

/// Safely extract a UTF-8 string slice with bounds checking
///
/// Returns None if the slice range is invalid, exceeds source length,
/// or splits a multi-byte character.
///
/// # Example
/// ```rust
/// use vespucci::common::safe_str_slice;
/// assert_eq!(safe_str_slice("hello world", 0, 5), Some("hello"));
/// assert_eq!(safe_str_slice("hello", 3, 10), None);
/// ```
pub fn safe_str_slice(source: &str, start: usize, end: usize) -> Option<&str> {
    if start <= end && end <= source.len() {
        source.get(start..end)
    } else {
        None
    }
}

/// Find the nearest valid UTF-8 character boundary at or before the given byte offset
pub fn find_char_boundary_before(s: &str, offset: usize) -> usize {
    let mut pos = offset.min(s.len());
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Find the nearest valid UTF-8 character boundary at or after the given byte offset
pub fn find_char_boundary_after(s: &str, offset: usize) -> usize {
    let mut pos = offset;
    let len = s.len();
    while pos < len && !s.is_char_boundary(pos) {
        pos += 1;
    }
    pos.min(len)
}

/// Byte offset at which `s` holds at most `max_chars` characters.
///
/// Returns `s.len()` when the text is already short enough.
pub fn char_cap_offset(s: &str, max_chars: usize) -> usize {
    s.char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

/// Line lookup table for one source text.
///
/// Lines are 1-indexed. A byte offset sitting on a `\n` belongs to the line
/// the newline terminates.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line starts
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            starts,
            len: text.len(),
        }
    }

    /// Number of lines (a trailing newline does not open a new line)
    pub fn line_count(&self) -> usize {
        match self.starts.last() {
            Some(&last) if last == self.len && self.starts.len() > 1 => self.starts.len() - 1,
            _ => self.starts.len(),
        }
    }

    /// 1-indexed line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Line holding the last byte of the half-open range ending at `end`.
    pub fn last_line_of(&self, start: usize, end: usize) -> usize {
        if end > start {
            self.line_of(end - 1)
        } else {
            self.line_of(start)
        }
    }

    /// Byte offset of the first byte of a 1-indexed line.
    pub fn line_start(&self, line: usize) -> usize {
        self.starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(self.len)
    }

    /// Byte offset just past the end of a 1-indexed line, excluding its `\n`.
    pub fn line_end(&self, line: usize) -> usize {
        match self.starts.get(line) {
            Some(&next) => next.saturating_sub(1),
            None => self.len,
        }
    }
}

/// Position-based unit identifier
///
/// ```text
/// input = file_path + ":" + byte_start + ":" + byte_end
/// unit_id = first 8 bytes of SHA256(input), as 16 hex characters
/// ```
///
/// Stable across content changes at the same position; changes when the
/// position or the path changes.
pub fn generate_unit_id(file_path: &str, byte_start: usize, byte_end: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_path.as_bytes());
    hasher.update(b":");
    hasher.update(byte_start.to_be_bytes());
    hasher.update(b":");
    hasher.update(byte_end.to_be_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

/// SHA-256 of the full file content, hex encoded.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Strip comment markers from a block of comment text.
///
/// Handles `//`, `///`, `//!`, `#`, `--`, and `/* ... */` / `/** ... */`
/// with leading `*` gutters. Returns None when nothing but markers remain.
pub fn clean_comment(raw: &str) -> Option<String> {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let mut l = line.trim();
        for prefix in ["///", "//!", "//", "/**", "/*", "#", "--"] {
            if let Some(rest) = l.strip_prefix(prefix) {
                l = rest;
                break;
            }
        }
        let l = l.strip_suffix("*/").unwrap_or(l).trim();
        let l = l.strip_prefix('*').map(str::trim).unwrap_or(l);
        lines.push(l);
    }
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Strip string-literal quotes (including Python triple quotes and string
/// prefixes such as `r`, `u`, `b`, `f`) from a docstring literal.
pub fn strip_string_quotes(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let body = trimmed.trim_start_matches(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F'));
    let inner = ["\"\"\"", "'''", "\"", "'", "`"].iter().find_map(|q| {
        body.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })?;
    let text = inner.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_str_slice_bounds() {
        let source = "fn hello() { return 42; }";
        assert_eq!(safe_str_slice(source, 3, 8), Some("hello"));
        assert_eq!(safe_str_slice(source, 8, 3), None);
        assert_eq!(safe_str_slice(source, 0, 100), None);
    }

    #[test]
    fn test_safe_str_slice_splits_char() {
        let source = "abc\u{1f44b}xyz";
        assert_eq!(safe_str_slice(source, 4, source.len()), None);
        assert_eq!(safe_str_slice(source, 3, 7), Some("\u{1f44b}"));
    }

    #[test]
    fn test_find_char_boundary_before() {
        let s = "a\u{1f44b}b";
        assert_eq!(find_char_boundary_before(s, 5), 5);
        assert_eq!(find_char_boundary_before(s, 4), 1);
        assert_eq!(find_char_boundary_before(s, 2), 1);
        assert_eq!(find_char_boundary_before(s, 0), 0);
        assert_eq!(find_char_boundary_before(s, 99), s.len());
    }

    #[test]
    fn test_find_char_boundary_after() {
        let s = "a\u{1f44b}b";
        assert_eq!(find_char_boundary_after(s, 0), 0);
        assert_eq!(find_char_boundary_after(s, 2), 5);
        assert_eq!(find_char_boundary_after(s, 4), 5);
        assert_eq!(find_char_boundary_after(s, 5), 5);
    }

    #[test]
    fn test_char_cap_offset_counts_characters() {
        assert_eq!(char_cap_offset("hello", 10), 5);
        assert_eq!(char_cap_offset("hello", 2), 2);
        // 3-byte CJK characters
        assert_eq!(char_cap_offset("你好世界", 2), 6);
    }

    #[test]
    fn test_line_index_lookup() {
        let text = "one\ntwo\n\nfour";
        let idx = LineIndex::new(text);
        assert_eq!(idx.line_count(), 4);
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(3), 1); // the '\n' of line 1
        assert_eq!(idx.line_of(4), 2);
        assert_eq!(idx.line_of(8), 3);
        assert_eq!(idx.line_of(9), 4);
        assert_eq!(idx.line_start(2), 4);
        assert_eq!(idx.line_end(2), 7);
        assert_eq!(idx.line_end(4), text.len());
    }

    #[test]
    fn test_line_index_trailing_newline() {
        let idx = LineIndex::new("a\nb\n");
        assert_eq!(idx.line_count(), 2);
        assert_eq!(idx.last_line_of(0, 4), 2);
        assert_eq!(LineIndex::new("").line_count(), 1);
    }

    #[test]
    fn test_unit_id_is_deterministic() {
        let id1 = generate_unit_id("test.rs", 10, 20);
        let id2 = generate_unit_id("test.rs", 10, 20);
        let id3 = generate_unit_id("test.rs", 10, 21);
        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1.len(), 16);
        assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_content_hash_is_full_sha256() {
        assert_eq!(content_hash("").len(), 64);
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    #[test]
    fn test_clean_comment_markers() {
        assert_eq!(clean_comment("/// Adds two numbers").as_deref(), Some("Adds two numbers"));
        assert_eq!(
            clean_comment("/**\n * Line one\n * Line two\n */").as_deref(),
            Some("Line one\nLine two")
        );
        assert_eq!(clean_comment("# hello\n# world").as_deref(), Some("hello\nworld"));
        assert_eq!(clean_comment("//").as_deref(), None);
    }

    #[test]
    fn test_strip_string_quotes() {
        assert_eq!(strip_string_quotes("\"\"\"Doc here.\"\"\"").as_deref(), Some("Doc here."));
        assert_eq!(strip_string_quotes("'single'").as_deref(), Some("single"));
        assert_eq!(strip_string_quotes("r\"\"\"raw\"\"\"").as_deref(), Some("raw"));
        assert_eq!(strip_string_quotes("\"\"").as_deref(), None);
        assert_eq!(strip_string_quotes("not a string").as_deref(), None);
    }
}
