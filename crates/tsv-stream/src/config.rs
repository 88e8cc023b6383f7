//! Run configuration for the streaming validator.

use std::num::NonZeroU64;

/// Explicit configuration passed into [`crate::LineValidator`].
///
/// Constructed once by the caller; the validator never reads
/// process-wide state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamConfig {
    progress: Option<NonZeroU64>,
}

impl StreamConfig {
    /// Progress reporting disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a progress notification every `every` lines. `0` disables it.
    pub fn with_progress(mut self, every: u64) -> Self {
        self.progress = NonZeroU64::new(every);
        self
    }

    /// Configured interval, `0` when disabled.
    pub fn progress_interval(&self) -> u64 {
        self.progress.map_or(0, NonZeroU64::get)
    }

    /// Whether a progress notification is due before processing the line
    /// with zero-based index `count`.
    pub fn progress_due(&self, count: u64) -> bool {
        match self.progress {
            Some(every) => count % every.get() == 0,
            None => false,
        }
    }
}
