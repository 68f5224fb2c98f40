//! Language detection from file extensions and caller-supplied hints.
//!
//! Detection happens once per file; everything downstream keys off the
//! resulting [`Language`] value and its [`GrammarProfile`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::profile::{self, FallbackFamily, GrammarProfile};

/// Languages with a grammar profile.
///
/// Having a profile does not mean a grammar is linked in; see
/// [`crate::ingest::pool::ParserRegistry`] for runtime availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Java,
    C,
    Cpp,
    Rust,
    Go,
    Ruby,
    Php,
    CSharp,
    Kotlin,
    Swift,
    Scala,
}

impl Language {
    /// Every language with a profile, in table order.
    pub const ALL: [Language; 15] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Tsx,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::Rust,
        Language::Go,
        Language::Ruby,
        Language::Php,
        Language::CSharp,
        Language::Kotlin,
        Language::Swift,
        Language::Scala,
    ];

    /// Stable lowercase key used in `CodeUnit::language` and JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::CSharp => "csharp",
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
            Language::Scala => "scala",
        }
    }

    /// Detect a language from a file extension.
    ///
    /// # Supported Extensions
    /// - `.py`, `.pyi` → Python
    /// - `.js`, `.jsx`, `.mjs`, `.cjs` → JavaScript
    /// - `.ts`, `.mts`, `.cts` → TypeScript
    /// - `.tsx` → Tsx
    /// - `.java` → Java
    /// - `.c`, `.h` → C
    /// - `.cpp`, `.cc`, `.cxx`, `.hpp`, `.hh`, `.hxx` → Cpp
    /// - `.rs` → Rust
    /// - `.go` → Go
    /// - `.rb` → Ruby
    /// - `.php` → Php
    /// - `.cs` → CSharp
    /// - `.kt`, `.kts` → Kotlin
    /// - `.swift` → Swift
    /// - `.scala`, `.sc` → Scala
    pub fn from_path(path: &str) -> Option<Language> {
        let ext = Path::new(path).extension().and_then(|e| e.to_str())?;
        let lang = match ext.to_ascii_lowercase().as_str() {
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "mts" | "cts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "rs" => Language::Rust,
            "go" => Language::Go,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "cs" => Language::CSharp,
            "kt" | "kts" => Language::Kotlin,
            "swift" => Language::Swift,
            "scala" | "sc" => Language::Scala,
            _ => return None,
        };
        Some(lang)
    }

    /// Parse a free-form language hint (case-insensitive).
    ///
    /// Accepts the stable keys plus common aliases (`py`, `js`, `ts`,
    /// `c++`, `c#`, `golang`, ...).
    pub fn from_hint(hint: &str) -> Option<Language> {
        let lang = match hint.trim().to_ascii_lowercase().as_str() {
            "python" | "py" | "python3" => Language::Python,
            "javascript" | "js" | "jsx" | "node" => Language::JavaScript,
            "typescript" | "ts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" | "c++" | "cxx" => Language::Cpp,
            "rust" | "rs" => Language::Rust,
            "go" | "golang" => Language::Go,
            "ruby" | "rb" => Language::Ruby,
            "php" => Language::Php,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "kotlin" | "kt" => Language::Kotlin,
            "swift" => Language::Swift,
            "scala" => Language::Scala,
            _ => return None,
        };
        Some(lang)
    }

    /// Grammar profile for this language.
    pub fn profile(&self) -> &'static GrammarProfile {
        profile::profile_for(*self)
    }

    /// Which heuristic extractor applies when no grammar is usable.
    pub fn family(&self) -> FallbackFamily {
        self.profile().fallback
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolve the language for one input file.
///
/// A recognised hint wins over the extension; an unrecognised hint is
/// ignored and the extension decides.
pub fn detect_language(file_path: &str, hint: Option<&str>) -> Option<Language> {
    hint.and_then(Language::from_hint)
        .or_else(|| Language::from_path(file_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_common_extensions() {
        assert_eq!(Language::from_path("src/main.rs"), Some(Language::Rust));
        assert_eq!(Language::from_path("app/models.py"), Some(Language::Python));
        assert_eq!(Language::from_path("web/index.tsx"), Some(Language::Tsx));
        assert_eq!(Language::from_path("lib/util.mjs"), Some(Language::JavaScript));
        assert_eq!(Language::from_path("include/x.HPP"), Some(Language::Cpp));
        assert_eq!(Language::from_path("Main.kt"), Some(Language::Kotlin));
    }

    #[test]
    fn test_from_path_unknown() {
        assert_eq!(Language::from_path("notes.txt"), None);
        assert_eq!(Language::from_path("Makefile"), None);
    }

    #[test]
    fn test_hint_aliases() {
        assert_eq!(Language::from_hint("C++"), Some(Language::Cpp));
        assert_eq!(Language::from_hint(" c# "), Some(Language::CSharp));
        assert_eq!(Language::from_hint("golang"), Some(Language::Go));
        assert_eq!(Language::from_hint("cobol"), None);
    }

    #[test]
    fn test_hint_wins_over_extension() {
        assert_eq!(detect_language("script.txt", Some("python")), Some(Language::Python));
        assert_eq!(detect_language("a.js", Some("typescript")), Some(Language::TypeScript));
        assert_eq!(detect_language("a.js", Some("unknown-thing")), Some(Language::JavaScript));
        assert_eq!(detect_language("data.cfg", None), None);
    }

    #[test]
    fn test_keys_round_trip_through_hints() {
        for lang in Language::ALL {
            assert_eq!(Language::from_hint(lang.key()), Some(lang), "{:?}", lang);
        }
    }
}
