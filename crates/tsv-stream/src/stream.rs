//! # Streaming Line Validation
//!
//! Validates a JSON-Lines stream one line at a time and stops at the first
//! invalid event.
//!
//! ## State Machine
//!
//! ```text
//! Reading --line--> Validating --valid--> Reading
//! Reading --end of stream--> Exhausted
//! Reading --read error--> Failed   (StreamError::Read)
//! Validating --invalid--> Failed   (StreamOutcome::Failed)
//! ```
//!
//! ## Invariants
//!
//! - The run counter is incremented once per line read, including the
//!   failing one, so the failure is reported at its 1-based ordinal.
//! - Progress is checked against the counter before it is incremented.
//! - Nothing after the first invalid line is read.
//! - A line that is not valid JSON is an invalid event, reported through
//!   the same path as a schema violation.

use std::io::{self, BufRead};

use serde_json::Value;
use thiserror::Error;
use tsv_schema::{EventValidator, ValidationOutcome, ValidationViolations, Violation};

use crate::config::StreamConfig;
use crate::report::Reporter;

/// Fatal failure of the input stream itself, distinct from an invalid event.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Reading the given 1-based line failed.
    #[error("error reading trace event line {line}")]
    Read {
        /// 1-based number of the line being read.
        line: u64,
        #[source]
        source: io::Error,
    },

    /// The validator was stepped after reaching a terminal state.
    #[error("line validator already stopped ({state:?})")]
    Halted {
        /// The terminal state it stopped in.
        state: StreamState,
    },
}

/// States of a [`LineValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Waiting for the next line.
    Reading,
    /// A line was read and is being checked.
    Validating,
    /// Stopped at an invalid event or a read error. Terminal.
    Failed,
    /// Every line was valid and the stream ended. Terminal.
    Exhausted,
}

impl StreamState {
    /// Returns true for `Failed` and `Exhausted`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Exhausted)
    }
}

/// The first event line that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEvent {
    /// 1-based position of the line in the stream.
    pub line_number: u64,
    /// Literal text of the line (lossily decoded if not UTF-8).
    pub line: String,
    /// Every violation, in the order the validator produced them.
    pub violations: ValidationViolations,
}

/// How a completed run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The stream ended and every line was valid.
    Exhausted {
        /// Number of lines validated.
        validated: u64,
    },
    /// The run stopped at an invalid event.
    Failed(InvalidEvent),
}

impl StreamOutcome {
    /// Returns true if every line was valid.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Lines processed, including the failing one.
    pub fn lines_processed(&self) -> u64 {
        match self {
            Self::Exhausted { validated } => *validated,
            Self::Failed(event) => event.line_number,
        }
    }
}

/// Result of a single [`LineValidator::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The line was valid; more may follow.
    Valid,
    /// The stream ended. Returned once.
    Exhausted {
        /// Number of lines validated.
        validated: u64,
    },
    /// The line was invalid. Returned once.
    Invalid(InvalidEvent),
}

/// Validates the lines of `input` against `validator`, one per step.
pub struct LineValidator<'v, V: ?Sized, R> {
    validator: &'v V,
    input: R,
    config: StreamConfig,
    state: StreamState,
    count: u64,
    line: Vec<u8>,
}

impl<'v, V, R> LineValidator<'v, V, R>
where
    V: EventValidator + ?Sized,
    R: BufRead,
{
    pub fn new(validator: &'v V, input: R, config: StreamConfig) -> Self {
        Self {
            validator,
            input,
            config,
            state: StreamState::Reading,
            count: 0,
            line: Vec::new(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Lines processed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Read and validate one line.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::Read` if the underlying reader fails; the
    /// validator is then in the `Failed` state. Returns
    /// `StreamError::Halted` if it already reached a terminal state.
    pub fn step(&mut self, reporter: &mut dyn Reporter) -> Result<Step, StreamError> {
        if self.state.is_terminal() {
            return Err(StreamError::Halted { state: self.state });
        }

        match self.read_line() {
            Ok(true) => {}
            Ok(false) => {
                self.state = StreamState::Exhausted;
                reporter.on_complete(self.count);
                return Ok(Step::Exhausted {
                    validated: self.count,
                });
            }
            Err(source) => {
                self.state = StreamState::Failed;
                return Err(StreamError::Read {
                    line: self.count + 1,
                    source,
                });
            }
        }

        self.state = StreamState::Validating;
        if self.config.progress_due(self.count) {
            reporter.on_progress(self.count);
        }

        let outcome = self.check_line();
        self.count += 1;

        match outcome {
            ValidationOutcome::Valid => {
                self.state = StreamState::Reading;
                Ok(Step::Valid)
            }
            ValidationOutcome::Invalid(violations) => {
                self.state = StreamState::Failed;
                let event = InvalidEvent {
                    line_number: self.count,
                    line: String::from_utf8_lossy(&self.line).into_owned(),
                    violations,
                };
                reporter.on_invalid(&event);
                Ok(Step::Invalid(event))
            }
        }
    }

    /// Step until the stream is exhausted or the first invalid line.
    pub fn run(mut self, reporter: &mut dyn Reporter) -> Result<StreamOutcome, StreamError> {
        loop {
            match self.step(reporter)? {
                Step::Valid => continue,
                Step::Exhausted { validated } => return Ok(StreamOutcome::Exhausted { validated }),
                Step::Invalid(event) => return Ok(StreamOutcome::Failed(event)),
            }
        }
    }

    /// Read the next line into the buffer without its terminator.
    /// Returns `false` at end of stream.
    fn read_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        if self.input.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        if self.line.last() == Some(&b'\n') {
            self.line.pop();
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
        }
        Ok(true)
    }

    fn check_line(&self) -> ValidationOutcome {
        match serde_json::from_slice::<Value>(&self.line) {
            Ok(value) => self.validator.validate(&value),
            Err(e) => ValidationOutcome::from_violations(vec![Violation::at_root(format!(
                "invalid JSON: {e}"
            ))]),
        }
    }
}

/// Validate every line of `input`, stopping at the first invalid one.
///
/// # Errors
///
/// Returns `StreamError::Read` if the input cannot be read. An invalid
/// event is not an error; it is returned as `StreamOutcome::Failed`.
pub fn validate_stream<V, R>(
    validator: &V,
    input: R,
    config: StreamConfig,
    reporter: &mut dyn Reporter,
) -> Result<StreamOutcome, StreamError>
where
    V: EventValidator + ?Sized,
    R: BufRead,
{
    LineValidator::new(validator, input, config).run(reporter)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::report::NullReporter;
    use proptest::prelude::*;
    use std::io::Cursor;

    /// Valid iff the value is an object carrying an `"event"` key.
    struct HasEvent;

    impl EventValidator for HasEvent {
        fn validate(&self, instance: &Value) -> ValidationOutcome {
            if instance.get("event").is_some() {
                ValidationOutcome::Valid
            } else {
                ValidationOutcome::from_violations(vec![Violation::at_root("missing event")])
            }
        }
    }

    #[derive(Default)]
    struct ProgressLog(Vec<u64>);

    impl Reporter for ProgressLog {
        fn on_progress(&mut self, validated: u64) {
            self.0.push(validated);
        }
        fn on_invalid(&mut self, _event: &InvalidEvent) {}
        fn on_complete(&mut self, _validated: u64) {}
    }

    /// One line per flag: a valid event for `true`, an invalid one for `false`.
    fn render(lines: &[bool]) -> String {
        lines
            .iter()
            .enumerate()
            .map(|(i, ok)| {
                if *ok {
                    format!("{{\"event\":\"cmd_start\",\"seq\":{i}}}\n")
                } else {
                    format!("{{\"seq\":{i}}}\n")
                }
            })
            .collect()
    }

    proptest! {
        /// An all-valid stream succeeds and counts every line.
        #[test]
        fn all_valid_counts_every_line(n in 0usize..200) {
            let input = render(&vec![true; n]);
            let outcome = validate_stream(
                &HasEvent,
                Cursor::new(input),
                StreamConfig::new(),
                &mut NullReporter,
            )
            .unwrap();
            prop_assert_eq!(outcome, StreamOutcome::Exhausted { validated: n as u64 });
        }

        /// The reported line is the first invalid one, 1-based.
        #[test]
        fn failure_reports_first_invalid_ordinal(
            lines in prop::collection::vec(any::<bool>(), 0..100)
        ) {
            let outcome = validate_stream(
                &HasEvent,
                Cursor::new(render(&lines)),
                StreamConfig::new(),
                &mut NullReporter,
            )
            .unwrap();
            match lines.iter().position(|ok| !ok) {
                Some(first) => {
                    prop_assert_eq!(outcome.lines_processed(), first as u64 + 1);
                    prop_assert!(!outcome.is_success());
                }
                None => {
                    prop_assert_eq!(
                        outcome,
                        StreamOutcome::Exhausted { validated: lines.len() as u64 }
                    );
                }
            }
        }

        /// Progress fires at 0, k, 2k, ... strictly below the line count.
        #[test]
        fn progress_at_multiples_below_line_count(m in 0u64..150, k in 1u64..20) {
            let input = render(&vec![true; m as usize]);
            let mut log = ProgressLog::default();
            validate_stream(
                &HasEvent,
                Cursor::new(input),
                StreamConfig::new().with_progress(k),
                &mut log,
            )
            .unwrap();
            let expected: Vec<u64> = (0..m).step_by(k as usize).collect();
            prop_assert_eq!(log.0, expected);
        }
    }
}
