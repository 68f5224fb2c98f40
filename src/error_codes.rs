//! Vespucci error codes
//!
//! Error codes follow the pattern: VSP-{CATEGORY}-{3-digit number}
//!
//! Categories (1-3 uppercase letters):
//! - GRM: Grammar availability and loading
//! - PRS: Structural walking of a parsed tree
//! - CFG: Configuration loading
//!
//! Each error code is stable and should not be reused. Codes prefix the
//! `parse_error` strings recorded on a `ParsedFile`.

/// No grammar linked for the language
pub const VSP_GRM_001_UNAVAILABLE: &str = "VSP-GRM-001";

/// tree-sitter rejected the grammar (ABI mismatch)
pub const VSP_GRM_002_LOAD_FAILED: &str = "VSP-GRM-002";

/// Parser returned no tree
pub const VSP_PRS_001_NO_TREE: &str = "VSP-PRS-001";

/// Node span falls outside the source or splits a character
pub const VSP_PRS_002_INVALID_SPAN: &str = "VSP-PRS-002";

/// Nesting bound exceeded while walking
pub const VSP_PRS_003_DEPTH_EXCEEDED: &str = "VSP-PRS-003";

/// Configuration file could not be read
pub const VSP_CFG_001_IO: &str = "VSP-CFG-001";

/// Configuration file is not valid TOML for the schema
pub const VSP_CFG_002_INVALID_TOML: &str = "VSP-CFG-002";

/// Error code documentation
///
/// # Grammar Errors (VSP-GRM-*)
///
/// | Code | Description | Remediation |
/// |------|-------------|-------------|
/// | VSP-GRM-001 | Grammar unavailable | Expected for profile-only languages; fallback output is used |
/// | VSP-GRM-002 | Grammar failed to load | Align tree-sitter and grammar crate versions |
///
/// # Parse Errors (VSP-PRS-*)
///
/// | Code | Description | Remediation |
/// |------|-------------|-------------|
/// | VSP-PRS-001 | No tree produced | Input may be too large; fallback output is used |
/// | VSP-PRS-002 | Invalid span | Check the input is the exact text that was parsed |
/// | VSP-PRS-003 | Depth exceeded | Deeply nested declarators; fallback output is used |
///
/// # Config Errors (VSP-CFG-*)
///
/// | Code | Description | Remediation |
/// |------|-------------|-------------|
/// | VSP-CFG-001 | Config I/O | Check the config path and permissions |
/// | VSP-CFG-002 | Invalid TOML | Fix the reported key or value |
pub const ERROR_CODE_DOCUMENTATION: &str = "Error code documentation available in source";

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CODES: &[&str] = &[
        VSP_GRM_001_UNAVAILABLE,
        VSP_GRM_002_LOAD_FAILED,
        VSP_PRS_001_NO_TREE,
        VSP_PRS_002_INVALID_SPAN,
        VSP_PRS_003_DEPTH_EXCEEDED,
        VSP_CFG_001_IO,
        VSP_CFG_002_INVALID_TOML,
    ];

    #[test]
    fn test_error_codes_are_unique() {
        let mut unique = std::collections::HashSet::new();
        for code in ALL_CODES {
            assert!(unique.insert(code), "Duplicate error code detected: {}", code);
        }
    }

    #[test]
    fn test_error_code_format() {
        for code in ALL_CODES {
            assert!(code.starts_with("VSP-"), "Error code must start with 'VSP-': {}", code);
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "Error code must have 3 parts: {}", code);
            assert!(
                !parts[1].is_empty() && parts[1].len() <= 3,
                "Category must be 1-3 chars: {}",
                code
            );
            assert!(parts[1].chars().all(|c| c.is_ascii_uppercase()));
            assert_eq!(parts[2].len(), 3, "Number must be 3 digits: {}", code);
            assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
