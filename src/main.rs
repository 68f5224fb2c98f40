//! Vespucci CLI - structural source mapping with Mermaid diagrams
//!
//! Usage: vespucci <command> [arguments]

mod analyze_cmd;
mod parse_cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vespucci::{AnalysisConfig, OutputFormat};

#[derive(Parser)]
#[command(name = "vespucci")]
#[command(version, long_version = vespucci::version::LONG_VERSION, about = "Map source files into units, call graphs and Mermaid diagrams")]
struct Cli {
    /// Log at debug level (overrides VESPUCCI_LOG / RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse one file and list its units
    Parse {
        /// Source file to parse
        file: PathBuf,
        /// Language hint (extension or name), overrides detection
        #[arg(long)]
        language: Option<String>,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format: human, json or pretty
        #[arg(long, default_value = "human", value_parser = parse_output_format)]
        output: OutputFormat,
    },
    /// Analyze a directory: summary plus diagrams
    Analyze {
        /// Directory to scan recursively
        #[arg(long)]
        root: PathBuf,
        /// TOML configuration file (default: <root>/vespucci.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format: human, json or pretty
        #[arg(long, default_value = "human", value_parser = parse_output_format)]
        output: OutputFormat,
    },
    /// Print only the Mermaid diagrams for a directory
    Diagrams {
        /// Directory to scan recursively
        #[arg(long)]
        root: PathBuf,
        /// TOML configuration file (default: <root>/vespucci.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format: human, json or pretty
        #[arg(long, default_value = "human", value_parser = parse_output_format)]
        output: OutputFormat,
    },
}

fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(s).ok_or_else(|| format!("unknown output format '{}' (human, json, pretty)", s))
}

/// Logs go to stderr so stdout stays clean for JSON.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        std::env::var("VESPUCCI_LOG")
            .ok()
            .and_then(|spec| EnvFilter::try_new(spec).ok())
            .unwrap_or_else(|| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    };
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Parse {
            file,
            language,
            config,
            output,
        } => {
            let config = match config {
                Some(path) => AnalysisConfig::load(&path)?,
                None => AnalysisConfig::default(),
            };
            parse_cmd::run_parse(&file, language, &config, output)
        }
        Command::Analyze { root, config, output } => {
            analyze_cmd::run_analyze(&root, config.as_ref(), output)
        }
        Command::Diagrams { root, config, output } => {
            analyze_cmd::run_diagrams(&root, config.as_ref(), output)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
