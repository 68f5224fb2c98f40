//! Error types for parsing and configuration.
//!
//! None of these escape [`crate::pipeline::analyze`]; parse errors are
//! recorded on the file they concern and the fallback takes over.

use std::path::PathBuf;

use crate::error_codes::*;
use crate::ingest::detect::Language;

/// Grammar-level failure for one file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no grammar available for {0}")]
    GrammarUnavailable(Language),

    #[error("failed to load {language} grammar: {reason}")]
    GrammarLoad { language: Language, reason: String },

    #[error("parser produced no tree")]
    NoTree,

    #[error("node span {start}..{end} is not valid in {path}")]
    InvalidSpan {
        path: String,
        start: usize,
        end: usize,
    },

    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),
}

impl ParseError {
    /// Stable error code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::GrammarUnavailable(_) => VSP_GRM_001_UNAVAILABLE,
            ParseError::GrammarLoad { .. } => VSP_GRM_002_LOAD_FAILED,
            ParseError::NoTree => VSP_PRS_001_NO_TREE,
            ParseError::InvalidSpan { .. } => VSP_PRS_002_INVALID_SPAN,
            ParseError::DepthExceeded(_) => VSP_PRS_003_DEPTH_EXCEEDED,
        }
    }

    /// `"VSP-PRS-001: parser produced no tree"`
    pub fn coded_message(&self) -> String {
        format!("{}: {}", self.code(), self)
    }

    /// Unavailability is routing, not failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ParseError::GrammarUnavailable(_))
    }
}

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{}: cannot read {path}: {source}", VSP_CFG_001_IO)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: invalid configuration: {0}", VSP_CFG_002_INVALID_TOML)]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_message_prefix() {
        let err = ParseError::NoTree;
        assert_eq!(err.coded_message(), "VSP-PRS-001: parser produced no tree");

        let err = ParseError::GrammarUnavailable(Language::Go);
        assert!(err.coded_message().starts_with("VSP-GRM-001: "));
        assert!(err.coded_message().contains("go"));
    }

    #[test]
    fn test_only_unavailable_is_routing() {
        assert!(ParseError::GrammarUnavailable(Language::Ruby).is_unavailable());
        assert!(!ParseError::DepthExceeded(8).is_unavailable());
        assert!(!ParseError::GrammarLoad {
            language: Language::Rust,
            reason: "abi".into()
        }
        .is_unavailable());
    }

    #[test]
    fn test_invalid_span_display() {
        let err = ParseError::InvalidSpan {
            path: "a.rs".into(),
            start: 4,
            end: 2,
        };
        assert_eq!(err.code(), VSP_PRS_002_INVALID_SPAN);
        assert_eq!(err.to_string(), "node span 4..2 is not valid in a.rs");
    }
}
