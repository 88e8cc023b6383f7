//! # tsv-schema — Schema Compilation
//!
//! Compiles a JSON-Schema document into an immutable validator for git
//! trace2 event lines.
//!
//! ## Compilation (`compile`)
//!
//! [`compile`] loads the document addressed by a [`SchemaLocation`],
//! resolves its `$ref`s from the local filesystem, and returns a
//! [`CompiledSchema`]. Every failure is fatal and reported as a
//! [`SchemaCompileError`].
//!
//! ## Validation (`validate`)
//!
//! [`EventValidator`] is the single-method interface the streaming
//! validator depends on. [`CompiledSchema`] implements it; tests can
//! substitute their own doubles.
//!
//! ## Crate Policy
//!
//! - Schema locations are absolute `file://` URLs; relative paths are
//!   normalized by [`SchemaLocation::from_path`].
//! - No network access during `$ref` resolution.

pub mod compile;
pub mod location;
pub mod validate;

pub use compile::{compile, compile_value, CompiledSchema, SchemaCompileError};
pub use location::SchemaLocation;
pub use validate::{EventValidator, ValidationOutcome, ValidationViolations, Violation};
