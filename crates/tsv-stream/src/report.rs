//! # Reporting
//!
//! Progress, failure, and completion notifications emitted by the streaming
//! validator. The validator never writes output itself; it calls a
//! [`Reporter`].

use crate::stream::InvalidEvent;

/// Receives notifications from a validation run.
pub trait Reporter {
    /// A progress checkpoint: `validated` lines have been processed so far.
    fn on_progress(&mut self, validated: u64);

    /// The run stopped at an invalid event.
    fn on_invalid(&mut self, event: &InvalidEvent);

    /// The input was exhausted with every line valid.
    fn on_complete(&mut self, validated: u64);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn on_progress(&mut self, validated: u64) {
        (**self).on_progress(validated);
    }

    fn on_invalid(&mut self, event: &InvalidEvent) {
        (**self).on_invalid(event);
    }

    fn on_complete(&mut self, validated: u64) {
        (**self).on_complete(validated);
    }
}

/// Writes notifications through `tracing`.
///
/// Progress and completion are info-level; an invalid event is logged at
/// error level, one record for the offending line and one per violation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_progress(&mut self, validated: u64) {
        tracing::info!(validated, "Validated items: {validated}");
    }

    fn on_invalid(&mut self, event: &InvalidEvent) {
        tracing::error!(
            line = event.line_number,
            violations = event.violations.len(),
            "Trace event line {} is invalid: {}",
            event.line_number,
            event.line,
        );
        for violation in &event.violations {
            tracing::error!(
                instance_path = %violation.instance_path,
                schema_path = %violation.schema_path,
                "- {violation}"
            );
        }
    }

    fn on_complete(&mut self, validated: u64) {
        tracing::info!(validated, "Validated events: {validated}");
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_progress(&mut self, _validated: u64) {}
    fn on_invalid(&mut self, _event: &InvalidEvent) {}
    fn on_complete(&mut self, _validated: u64) {}
}
