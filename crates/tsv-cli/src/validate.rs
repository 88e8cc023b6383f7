//! # Validate Command
//!
//! Compiles the schema given by `--schema-file`, then streams every line of
//! `--trace2-event-file` through it.
//!
//! The schema is compiled in full before the trace file is opened, so a bad
//! schema never causes any trace input to be read.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tsv_schema::SchemaLocation;
use tsv_stream::{validate_stream, StreamConfig, StreamOutcome, TracingReporter};

use crate::{EXIT_INVALID_EVENT, EXIT_SUCCESS};

/// Arguments for a validation run.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// JSON-Schema file to validate against.
    #[arg(long, value_name = "PATH")]
    pub schema_file: PathBuf,

    /// trace2 event file (JSON-Lines, one event per line).
    #[arg(long = "trace2-event-file", value_name = "PATH")]
    pub trace2_event_file: PathBuf,

    /// Log a progress message each time this many lines have been validated.
    /// 0 disables progress messages.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub progress: u64,
}

impl ValidateArgs {
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig::new().with_progress(self.progress)
    }
}

/// Execute a validation run.
///
/// Returns exit code: 0 when every event is valid, 1 on the first invalid
/// event. Schema and I/O failures are returned as errors.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let location = SchemaLocation::from_path(&args.schema_file)
        .context("can't get absolute path for schema file")?;

    tracing::debug!(schema = %location, "loading schema");
    let schema = tsv_schema::compile(&location).context("problem loading schema")?;

    let trace_path = &args.trace2_event_file;
    let file = File::open(trace_path)
        .with_context(|| format!("problem opening trace file '{}'", trace_path.display()))?;

    tracing::debug!(
        trace = %trace_path.display(),
        progress = args.progress,
        "validating trace events"
    );

    let outcome = validate_stream(
        &schema,
        BufReader::new(file),
        args.stream_config(),
        &mut TracingReporter,
    )
    .with_context(|| format!("scanning error in '{}'", trace_path.display()))?;

    Ok(match outcome {
        StreamOutcome::Exhausted { .. } => EXIT_SUCCESS,
        StreamOutcome::Failed(_) => EXIT_INVALID_EVENT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: ValidateArgs,
    }

    const SCHEMA: &str = r#"{"type":"object","required":["event"]}"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn args(schema_file: PathBuf, trace2_event_file: PathBuf) -> ValidateArgs {
        ValidateArgs {
            schema_file,
            trace2_event_file,
            progress: 0,
        }
    }

    #[test]
    fn parses_all_flags() {
        let cli = TestCli::try_parse_from([
            "trace_schema_validator",
            "--schema-file",
            "schema.json",
            "--trace2-event-file",
            "trace.jsonl",
            "--progress",
            "100",
        ])
        .unwrap();
        assert_eq!(cli.args.schema_file, PathBuf::from("schema.json"));
        assert_eq!(cli.args.trace2_event_file, PathBuf::from("trace.jsonl"));
        assert_eq!(cli.args.stream_config().progress_interval(), 100);
    }

    #[test]
    fn progress_defaults_to_disabled() {
        let cli = TestCli::try_parse_from([
            "trace_schema_validator",
            "--schema-file=s.json",
            "--trace2-event-file=t.jsonl",
        ])
        .unwrap();
        assert_eq!(cli.args.progress, 0);
        assert_eq!(cli.args.stream_config(), StreamConfig::new());
    }

    #[test]
    fn missing_schema_flag_is_rejected() {
        let err = TestCli::try_parse_from([
            "trace_schema_validator",
            "--trace2-event-file",
            "t.jsonl",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn missing_trace_flag_is_rejected() {
        let err = TestCli::try_parse_from(["trace_schema_validator", "--schema-file", "s.json"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn negative_progress_is_rejected() {
        let result = TestCli::try_parse_from([
            "trace_schema_validator",
            "--schema-file",
            "s.json",
            "--trace2-event-file",
            "t.jsonl",
            "--progress=-5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn valid_trace_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let trace = write(
            dir.path(),
            "trace.jsonl",
            "{\"event\":\"start\"}\n{\"event\":\"end\"}\n",
        );
        assert_eq!(run_validate(&args(schema, trace)).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn empty_trace_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let trace = write(dir.path(), "trace.jsonl", "");
        assert_eq!(run_validate(&args(schema, trace)).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn invalid_event_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let trace = write(
            dir.path(),
            "trace.jsonl",
            "{\"event\":\"start\"}\n{\"foo\":\"bar\"}\n",
        );
        assert_eq!(
            run_validate(&args(schema, trace)).unwrap(),
            EXIT_INVALID_EVENT
        );
    }

    #[test]
    fn progress_does_not_change_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let trace = write(dir.path(), "trace.jsonl", &"{\"event\":1}\n".repeat(25));
        let mut a = args(schema, trace);
        a.progress = 10;
        assert_eq!(run_validate(&a).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn missing_schema_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let trace = write(dir.path(), "trace.jsonl", "{\"event\":\"start\"}\n");
        let err = run_validate(&args(dir.path().join("nope.json"), trace)).unwrap_err();
        assert!(
            format!("{err:#}").contains("problem loading schema"),
            "got: {err:#}"
        );
        assert!(err
            .downcast_ref::<tsv_schema::SchemaCompileError>()
            .is_some());
    }

    #[test]
    fn missing_trace_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let err = run_validate(&args(schema, dir.path().join("missing.jsonl"))).unwrap_err();
        assert!(
            format!("{err:#}").contains("problem opening trace file"),
            "got: {err:#}"
        );
    }

    #[test]
    fn relative_schema_path_is_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", SCHEMA);
        let trace = write(dir.path(), "trace.jsonl", "{\"event\":\"start\"}\n");

        let cwd = std::env::current_dir().unwrap();
        let relative = pathdiff(&schema, &cwd);
        assert_eq!(run_validate(&args(relative, trace)).unwrap(), EXIT_SUCCESS);
    }

    /// `target` expressed relative to `base` using `..` components.
    fn pathdiff(target: &Path, base: &Path) -> PathBuf {
        let target: Vec<_> = target.components().collect();
        let base: Vec<_> = base.components().collect();
        let common = target
            .iter()
            .zip(base.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let mut rel = PathBuf::new();
        for _ in common..base.len() {
            rel.push("..");
        }
        for c in &target[common..] {
            rel.push(c.as_os_str());
        }
        rel
    }
}
