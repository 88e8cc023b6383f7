//! # trace_schema_validator entry point
//!
//! Parses command-line arguments, installs logging, runs the validation,
//! and maps the result to a process exit code.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tsv_cli::validate::{run_validate, ValidateArgs};
use tsv_cli::EXIT_ERROR;

/// Validate a git trace2 event log against a JSON-Schema.
///
/// Each line of the trace file must be a complete JSON event. Validation
/// stops at the first invalid event, which is reported with every schema
/// violation it contains.
#[derive(Parser, Debug)]
#[command(name = "trace_schema_validator", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    validate: ValidateArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, so progress and the final count show.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run_validate(&cli.validate) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
