//! # tsv-cli — trace2 Schema Validator CLI
//!
//! Provides the `trace_schema_validator` binary, which checks a git trace2
//! event log (as written with `GIT_TRACE2_EVENT` set) against a JSON-Schema:
//!
//! ```bash
//! trace_schema_validator \
//!     --trace2-event-file /path/to/trace/output \
//!     --schema-file /path/to/schema \
//!     --progress 10000
//! ```
//!
//! ## Exit Codes
//!
//! - `0` — every event is valid (including an empty log).
//! - `1` — an event failed validation; the first one is reported.
//! - `2` — operational failure: bad flags, schema compilation, or I/O.
//!
//! ## Crate Policy
//!
//! - Argument parsing and path handling live here; validation logic lives in
//!   `tsv-schema` and `tsv-stream`.
//! - Handlers return errors; only `main` turns them into an exit code.

pub mod validate;

/// Every event conformed to the schema.
pub const EXIT_SUCCESS: u8 = 0;

/// An event failed schema validation.
pub const EXIT_INVALID_EVENT: u8 = 1;

/// Configuration, schema, or I/O failure.
pub const EXIT_ERROR: u8 = 2;
