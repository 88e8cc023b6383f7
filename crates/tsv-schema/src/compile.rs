//! # Schema Compilation
//!
//! Loads a JSON-Schema document from a [`SchemaLocation`] and compiles it
//! into a [`CompiledSchema`] backed by the `jsonschema` crate.
//!
//! ## Reference Resolution
//!
//! The document's own URL is its base URI, so relative `$ref`s such as
//! `"defs.json#/definitions/thread"` resolve next to the schema file:
//!
//! - by default the URL is injected as `$id` (`id` for draft 3/4) when the
//!   document does not declare one;
//! - a draft 3–7 document with a root `$ref` ignores sibling keywords, so it
//!   is served to the engine under its URL and compiled through a root that
//!   only refers to it.
//!
//! A local retriever loads `file://` references from disk and refuses every
//! other scheme, so compilation never touches the network.
//!
//! Compilation is all-or-nothing: an unreadable document, malformed JSON, an
//! invalid keyword, or an unresolved `$ref` fails the whole build.

use std::collections::HashMap;
use std::fmt;

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::location::{file_path_of, SchemaLocation};
use crate::validate::{EventValidator, ValidationOutcome, Violation};

/// Error raised while turning a schema document into a validator.
#[derive(Error, Debug)]
pub enum SchemaCompileError {
    /// The schema path could not be turned into an absolute file URL.
    #[error("invalid schema location '{path}': {reason}")]
    Location {
        /// The path or URL as given.
        path: String,
        /// Why it could not be used.
        reason: String,
    },

    /// The schema document could not be read.
    #[error("cannot read schema '{url}'")]
    Load {
        /// URL of the document.
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The schema document is not well-formed JSON.
    #[error("schema '{url}' is not valid JSON")]
    Parse {
        /// URL of the document.
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The compiled validator could not be built (invalid keyword,
    /// unresolved `$ref`, ...).
    #[error("cannot compile schema '{url}': {reason}")]
    Build {
        /// URL of the document.
        url: String,
        /// Reason reported by the schema engine.
        reason: String,
    },
}

/// Read and parse a JSON document from a `file://` URL.
fn load_document(url: &Url) -> Result<Value, SchemaCompileError> {
    let path = file_path_of(url)?;
    let content = std::fs::read_to_string(&path).map_err(|source| SchemaCompileError::Load {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SchemaCompileError::Parse {
        url: url.to_string(),
        source,
    })
}

/// Resolves `$ref` URIs from the local filesystem.
///
/// Documents already held in memory are served from `preloaded`, keyed by
/// URL. Other `file://` URIs are read from disk. Anything else is an
/// unresolved reference and fails compilation.
struct LocalFileRetriever {
    preloaded: HashMap<String, Value>,
}

impl Retrieve for LocalFileRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let url = Url::parse(uri.as_str())?;
        if let Some(value) = self.preloaded.get(url.as_str()) {
            return Ok(value.clone());
        }
        if url.scheme() != "file" {
            return Err(format!("refusing to retrieve non-local reference '{url}'").into());
        }
        Ok(load_document(&url)?)
    }
}

/// Draft named by the document's `$schema`, for the drafts whose
/// identifier keyword or `$ref` handling differs from the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegacyDraft {
    /// Draft 3 and 4: identifier keyword is `id`.
    Draft4,
    /// Draft 6 and 7: `$id`, but keywords beside `$ref` are ignored.
    Draft7,
}

fn legacy_draft(document: &Value) -> Option<LegacyDraft> {
    let uri = document.get("$schema")?.as_str()?;
    if uri.contains("draft-03") || uri.contains("draft-04") {
        Some(LegacyDraft::Draft4)
    } else if uri.contains("draft-06") || uri.contains("draft-07") {
        Some(LegacyDraft::Draft7)
    } else {
        None
    }
}

/// An immutable, compiled JSON-Schema.
///
/// `CompiledSchema` is `Send + Sync`; validation borrows it immutably and
/// never mutates it.
pub struct CompiledSchema {
    location: SchemaLocation,
    validator: Validator,
}

impl CompiledSchema {
    /// Where the schema was loaded from.
    pub fn location(&self) -> &SchemaLocation {
        &self.location
    }

    /// Shortcut returning only whether `instance` is valid.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("location", &self.location.to_string())
            .finish_non_exhaustive()
    }
}

impl EventValidator for CompiledSchema {
    fn validate(&self, instance: &Value) -> ValidationOutcome {
        let violations = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        ValidationOutcome::from_violations(violations)
    }
}

/// Compile the schema document at `location`.
///
/// # Errors
///
/// - `SchemaCompileError::Load` if the document cannot be read.
/// - `SchemaCompileError::Parse` if it is not valid JSON.
/// - `SchemaCompileError::Build` if it is not a valid schema or one of its
///   references cannot be resolved.
pub fn compile(location: &SchemaLocation) -> Result<CompiledSchema, SchemaCompileError> {
    compile_value(location, load_document(location.url())?)
}

/// Compile an in-memory schema document as if it had been loaded from
/// `location`. Relative references resolve against `location`.
pub fn compile_value(
    location: &SchemaLocation,
    mut document: Value,
) -> Result<CompiledSchema, SchemaCompileError> {
    let url = location.url().to_string();
    let draft = legacy_draft(&document);
    let mut preloaded = HashMap::new();

    // Pre-2019 drafts ignore every keyword beside `$ref`, so an injected
    // identifier would be dropped. Serve the document under its own URL and
    // compile a root that points at it instead.
    let root = if draft.is_some() && document.get("$ref").is_some() {
        let mut root = serde_json::Map::new();
        if let Some(schema) = document.get("$schema") {
            root.insert("$schema".to_string(), schema.clone());
        }
        root.insert("$ref".to_string(), Value::String(url.clone()));
        preloaded.insert(url.clone(), document);
        Value::Object(root)
    } else {
        if let Value::Object(map) = &mut document {
            let keyword = match draft {
                Some(LegacyDraft::Draft4) => "id",
                _ => "$id",
            };
            if !map.contains_key(keyword) {
                map.insert(keyword.to_string(), Value::String(url.clone()));
            }
        }
        document
    };

    let mut opts = jsonschema::options();
    opts.with_retriever(LocalFileRetriever { preloaded });

    let validator = opts.build(&root).map_err(|e| SchemaCompileError::Build {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    tracing::debug!(schema = %location, ?draft, "compiled schema");

    Ok(CompiledSchema {
        location: location.clone(),
        validator,
    })
}
