//! Parse command implementation
//!
//! Parses one file and prints its units.

use anyhow::{Context, Result};
use std::path::Path;
use vespucci::output::{
    generate_execution_id, output_json, render_file, JsonResponse, OutputFormat, ParseResponse,
};
use vespucci::{parse_source, AnalysisConfig, ParserRegistry, ParserSet, SourceInput};

pub fn run_parse(
    file: &Path,
    language: Option<String>,
    config: &AnalysisConfig,
    output_format: OutputFormat,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {} as UTF-8", file.display()))?;

    let mut input = SourceInput::new(file.to_string_lossy().replace('\\', "/"), content);
    if let Some(hint) = language {
        input = input.with_hint(hint);
    }

    let registry = ParserRegistry::new();
    let mut parsers = ParserSet::new(&registry);
    let parsed = parse_source(&mut parsers, &input, config);

    match output_format {
        OutputFormat::Human => print!("{}", render_file(&parsed)),
        OutputFormat::Json | OutputFormat::Pretty => {
            let response = ParseResponse {
                file: &parsed,
                total_units: parsed.total_units(),
            };
            output_json(&JsonResponse::new(response, &generate_execution_id()), output_format)?;
        }
    }
    Ok(())
}
