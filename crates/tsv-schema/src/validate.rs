//! # Validation Outcomes
//!
//! The result of checking one JSON value against a compiled schema, and the
//! [`EventValidator`] seam the streaming validator is written against.
//!
//! A document that fails validation is described by an ordered, non-empty
//! list of [`Violation`]s, each naming the instance location, the schema
//! keyword location, and a human-readable message.

use std::fmt;

use serde_json::Value;

/// Anything that can check a JSON value against a schema.
///
/// Implementations must be safe to call repeatedly and from several
/// threads; the compiled schema is read-only once built.
pub trait EventValidator: Send + Sync {
    /// Validate a single JSON value.
    fn validate(&self, instance: &Value) -> ValidationOutcome;
}

impl<V: EventValidator + ?Sized> EventValidator for &V {
    fn validate(&self, instance: &Value) -> ValidationOutcome {
        (**self).validate(instance)
    }
}

impl<V: EventValidator + ?Sized> EventValidator for Box<V> {
    fn validate(&self, instance: &Value) -> ValidationOutcome {
        (**self).validate(instance)
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    /// A violation attached to the document root with no schema keyword,
    /// used for documents that could not be parsed at all.
    pub fn at_root(message: impl Into<String>) -> Self {
        Self {
            instance_path: String::new(),
            schema_path: String::new(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Non-empty, ordered collection of violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations. Never zero.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations. Never the case for an
    /// `Invalid` outcome.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations, in the order the engine produced them.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterates over the violations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "- {v}")?;
        }
        Ok(())
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The document satisfies the schema.
    Valid,
    /// The document violates the schema.
    Invalid(ValidationViolations),
}

impl ValidationOutcome {
    /// `Valid` when `violations` is empty, `Invalid` otherwise.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(ValidationViolations { violations })
        }
    }

    /// Returns true for `Valid`.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The violations of an invalid outcome.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::Valid => None,
            Self::Invalid(v) => Some(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_violations_are_valid() {
        assert_eq!(ValidationOutcome::from_violations(vec![]), ValidationOutcome::Valid);
    }

    #[test]
    fn non_empty_violations_are_invalid() {
        let outcome = ValidationOutcome::from_violations(vec![Violation::at_root("boom")]);
        assert!(!outcome.is_valid());
        let violations = outcome.violations().unwrap();
        assert_eq!(violations.len(), 1);
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_violation_display_format() {
        let v = Violation {
            instance_path: "/thread".to_string(),
            schema_path: "/properties/thread/type".to_string(),
            message: r#"42 is not of type "string""#.to_string(),
        };
        assert_eq!(v.to_string(), r#"/thread: 42 is not of type "string""#);
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""event" is a required property"#.to_string(),
        };
        assert!(v.to_string().starts_with("(root):"));
    }

    #[test]
    fn violations_display_one_entry_per_line() {
        let outcome = ValidationOutcome::from_violations(vec![
            Violation::at_root("first"),
            Violation::at_root("second"),
        ]);
        let text = outcome.violations().unwrap().to_string();
        assert_eq!(text, "- (root): first\n- (root): second");
    }
}
