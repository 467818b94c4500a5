//! Progress reporting for pipeline stages.
//!
//! Library code reports through [`ProgressCallback`]; binaries decide how
//! to render it (an `indicatif` bar, or nothing at all).

use std::sync::Arc;

/// Receives stage-level progress from long-running operations.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of steps.
    fn set_total(&self, total: u64);

    /// Advance by `delta` steps.
    fn inc(&self, delta: u64);

    /// Describe the step currently running.
    fn set_message(&self, msg: String);

    /// Mark the work as complete.
    fn finish(&self, msg: String);
}

/// Discards all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
