//! JSON output types for CLI commands
//!
//! Every JSON response is wrapped in a [`JsonResponse`] envelope carrying a
//! schema version and an execution ID, so consumers can detect format
//! changes and correlate runs.

use serde::{Deserialize, Serialize};

use crate::diagram::Diagram;
use crate::ingest::ParsedFile;
use crate::pipeline::{Analysis, AnalysisSummary};

/// Current JSON output schema version
pub const VESPUCCI_JSON_SCHEMA_VERSION: &str = "1.0.0";

/// Wrapper for all JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    /// Schema version for parsing stability
    pub schema_version: String,
    /// Unique execution ID for this run
    pub execution_id: String,
    /// Tool name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// RFC 3339 time the response was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Response data
    pub data: T,
}

impl<T> JsonResponse<T> {
    pub fn new(data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: VESPUCCI_JSON_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            tool: Some("vespucci".to_string()),
            timestamp: Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            data,
        }
    }
}

/// Response for `vespucci parse`
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse<'a> {
    pub file: &'a ParsedFile,
    pub total_units: usize,
}

/// Response for `vespucci analyze`
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse<'a> {
    pub summary: AnalysisSummary,
    pub analysis: &'a Analysis,
}

/// Response for `vespucci diagrams`
#[derive(Debug, Clone, Serialize)]
pub struct DiagramsResponse<'a> {
    pub diagrams: &'a [Diagram],
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Human,
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}

impl OutputFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            "pretty" => Some(OutputFormat::Pretty),
            _ => None,
        }
    }
}

/// Generate a unique execution ID for this run
///
/// Uses timestamp + process ID for uniqueness.
pub fn generate_execution_id() -> String {
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let pid = process::id();

    format!("{:x}-{:x}", timestamp, pid)
}

/// Serialize `data` in the requested JSON flavour.
pub fn render_json<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(data)?,
        OutputFormat::Json | OutputFormat::Human => serde_json::to_string(data)?,
    })
}

/// Output JSON to stdout
pub fn output_json<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render_json(data, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_id_format() {
        let id = generate_execution_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 2);
        assert!(u64::from_str_radix(parts[0], 16).is_ok());
        assert!(u32::from_str_radix(parts[1], 16).is_ok());
    }

    #[test]
    fn test_json_response_serialization() {
        let diagrams: Vec<Diagram> = Vec::new();
        let response = JsonResponse::new(DiagramsResponse { diagrams: &diagrams }, "test-exec-123");

        let json = render_json(&response, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["schema_version"], VESPUCCI_JSON_SCHEMA_VERSION);
        assert_eq!(parsed["execution_id"], "test-exec-123");
        assert_eq!(parsed["tool"], "vespucci");
        assert_eq!(parsed["data"]["diagrams"].as_array().unwrap().len(), 0);
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_pretty_is_indented() {
        let response = JsonResponse::new(vec![1, 2], "x");
        let json = render_json(&response, OutputFormat::Pretty).unwrap();
        assert!(json.contains("\n  \"schema_version\""));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("pretty"), Some(OutputFormat::Pretty));
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::from_str("invalid"), None);
    }
}
