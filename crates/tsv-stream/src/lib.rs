//! # tsv-stream — Streaming Line Validation
//!
//! Validates a JSON-Lines trace (one git trace2 event per line) against an
//! [`EventValidator`](tsv_schema::EventValidator), stopping at the first
//! invalid event.
//!
//! - [`LineValidator`] — the per-line state machine, driven by
//!   [`LineValidator::step`] or to completion by [`LineValidator::run`].
//! - [`validate_stream`] — convenience wrapper for a full run.
//! - [`Reporter`] — receives progress, failure, and completion
//!   notifications. [`TracingReporter`] logs them.
//!
//! ## Crate Policy
//!
//! - Sequential only: the first invalid line in stream order is the one
//!   reported.
//! - The validator never prints and never exits the process; callers map
//!   [`StreamOutcome`] and [`StreamError`] to exit codes.

pub mod config;
pub mod report;
pub mod stream;

pub use config::StreamConfig;
pub use report::{NullReporter, Reporter, TracingReporter};
pub use stream::{
    validate_stream, InvalidEvent, LineValidator, Step, StreamError, StreamOutcome, StreamState,
};
