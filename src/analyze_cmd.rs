//! Analyze and diagrams command implementations
//!
//! Both scan a root directory, run the full pipeline, and differ only in
//! what they print.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::warn;
use vespucci::output::{
    generate_execution_id, output_json, render_diagrams, render_summary, AnalyzeResponse,
    DiagramsResponse, JsonResponse, OutputFormat,
};
use vespucci::{analyze, scan_directory, Analysis, AnalysisConfig, ParserRegistry};

/// Explicit `--config`, else `vespucci.toml` under the root, else defaults.
pub fn load_config(root: &Path, config_path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match config_path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => AnalysisConfig::discover(root)
            .with_context(|| format!("failed to load config under {}", root.display())),
    }
}

fn scan_and_analyze(root: &Path, config: &AnalysisConfig, show_progress: bool) -> Result<Analysis> {
    let bar = if show_progress {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reading")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );
    let progress = |current: usize, total: usize| {
        bar.set_length(total as u64);
        bar.set_position(current as u64);
    };
    let scan = scan_directory(root, Some(&progress))
        .with_context(|| format!("failed to scan {}", root.display()))?;
    bar.finish_and_clear();

    if scan.skipped_non_utf8 > 0 || scan.unreadable > 0 {
        warn!(
            non_utf8 = scan.skipped_non_utf8,
            unreadable = scan.unreadable,
            "some files were skipped"
        );
    }
    Ok(analyze(&scan.inputs, &ParserRegistry::new(), config))
}

pub fn run_analyze(root: &Path, config_path: Option<&PathBuf>, output_format: OutputFormat) -> Result<()> {
    let config = load_config(root, config_path)?;
    let analysis = scan_and_analyze(root, &config, output_format == OutputFormat::Human)?;
    let summary = analysis.summary();

    match output_format {
        OutputFormat::Human => {
            print!("{}", render_summary(&summary));
            if !analysis.diagrams.is_empty() {
                println!();
                print!("{}", render_diagrams(&analysis.diagrams));
            }
        }
        OutputFormat::Json | OutputFormat::Pretty => {
            let response = AnalyzeResponse {
                summary,
                analysis: &analysis,
            };
            output_json(&JsonResponse::new(response, &generate_execution_id()), output_format)?;
        }
    }
    Ok(())
}

pub fn run_diagrams(root: &Path, config_path: Option<&PathBuf>, output_format: OutputFormat) -> Result<()> {
    let config = load_config(root, config_path)?;
    let analysis = scan_and_analyze(root, &config, output_format == OutputFormat::Human)?;

    match output_format {
        OutputFormat::Human => {
            if analysis.diagrams.is_empty() {
                eprintln!("No diagrams: not enough structure found under {}", root.display());
            } else {
                print!("{}", render_diagrams(&analysis.diagrams));
            }
        }
        OutputFormat::Json | OutputFormat::Pretty => {
            let response = DiagramsResponse {
                diagrams: &analysis.diagrams,
            };
            output_json(&JsonResponse::new(response, &generate_execution_id()), output_format)?;
        }
    }
    Ok(())
}
