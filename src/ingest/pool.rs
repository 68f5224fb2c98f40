//! Parser registry and per-worker parser sets.
//!
//! # Design
//!
//! - [`ParserRegistry`]: which grammars are linked for this run. Built once,
//!   shared read-only by every worker. Never process-global.
//! - [`ParserSet`]: one worker's `tree_sitter::Parser` instances, created
//!   lazily on first use per language and reused across files.
//! - No locks: each worker owns its set exclusively.
//!
//! # Usage
//!
//! ```rust
//! use vespucci::ingest::{Language, ParserRegistry, ParserSet};
//!
//! let registry = ParserRegistry::new();
//! let mut parsers = ParserSet::new(&registry);
//! let tree = parsers
//!     .with_parser(Language::Rust, |parser| parser.parse("fn main() {}", None))
//!     .unwrap();
//! assert!(tree.is_some());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tree_sitter::Parser;

use crate::error::ParseError;
use crate::ingest::detect::Language;

/// Grammar compiled into this binary for a language, if any.
fn linked_grammar(language: Language) -> Option<tree_sitter::Language> {
    let grammar = match language {
        Language::Rust => tree_sitter_rust::language(),
        Language::Python => tree_sitter_python::language(),
        Language::C => tree_sitter_c::language(),
        Language::Cpp => tree_sitter_cpp::language(),
        Language::Java => tree_sitter_java::language(),
        Language::JavaScript => tree_sitter_javascript::language(),
        Language::TypeScript => tree_sitter_typescript::language_typescript(),
        Language::Tsx => tree_sitter_typescript::language_tsx(),
        Language::Go
        | Language::Ruby
        | Language::Php
        | Language::CSharp
        | Language::Kotlin
        | Language::Swift
        | Language::Scala => return None,
    };
    Some(grammar)
}

/// The set of grammars available to one analysis run.
#[derive(Clone)]
pub struct ParserRegistry {
    grammars: BTreeMap<Language, tree_sitter::Language>,
}

impl ParserRegistry {
    /// Register every grammar linked into the binary.
    pub fn new() -> Self {
        let grammars = Language::ALL
            .iter()
            .filter_map(|lang| linked_grammar(*lang).map(|g| (*lang, g)))
            .collect();
        Self { grammars }
    }

    /// A registry with no grammars; every file goes to the fallback.
    pub fn empty() -> Self {
        Self {
            grammars: BTreeMap::new(),
        }
    }

    /// Drop one grammar, forcing that language onto the fallback.
    pub fn without(mut self, language: Language) -> Self {
        self.grammars.remove(&language);
        self
    }

    pub fn grammar(&self, language: Language) -> Option<&tree_sitter::Language> {
        self.grammars.get(&language)
    }

    pub fn is_available(&self, language: Language) -> bool {
        self.grammars.contains_key(&language)
    }

    /// Registered languages in table order.
    pub fn languages(&self) -> Vec<Language> {
        self.grammars.keys().copied().collect()
    }

    /// Try loading every registered grammar into a throwaway parser.
    ///
    /// Returns the failures; an empty vector means every grammar is usable.
    pub fn check(&self) -> Vec<ParseError> {
        let mut parsers = ParserSet::new(self);
        self.languages()
            .into_iter()
            .filter_map(|lang| parsers.with_parser(lang, |_| ()).err())
            .collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

/// One worker's lazily created parsers.
pub struct ParserSet<'r> {
    registry: &'r ParserRegistry,
    parsers: HashMap<Language, Parser>,
}

impl<'r> ParserSet<'r> {
    pub fn new(registry: &'r ParserRegistry) -> Self {
        Self {
            registry,
            parsers: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &'r ParserRegistry {
        self.registry
    }

    /// Run `f` with this worker's parser for `language`.
    ///
    /// # Errors
    ///
    /// - [`ParseError::GrammarUnavailable`] when the registry lacks the grammar
    /// - [`ParseError::GrammarLoad`] when tree-sitter rejects it
    pub fn with_parser<F, R>(&mut self, language: Language, f: F) -> Result<R, ParseError>
    where
        F: FnOnce(&mut Parser) -> R,
    {
        let registry = self.registry;
        let parser = match self.parsers.entry(language) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                let grammar = registry
                    .grammar(language)
                    .ok_or(ParseError::GrammarUnavailable(language))?;
                let mut parser = Parser::new();
                parser
                    .set_language(grammar)
                    .map_err(|e| ParseError::GrammarLoad {
                        language,
                        reason: e.to_string(),
                    })?;
                entry.insert(parser)
            }
        };
        Ok(f(parser))
    }

    /// Number of parsers created so far.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
