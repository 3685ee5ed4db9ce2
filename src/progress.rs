//! Progress and error observation for a conversion run.
//!
//! The pipeline reports through an injected observer whose lifecycle is
//! scoped to one run — no process-wide progress state. Reporting is not part
//! of the correctness contract; observers are called from the orchestrating
//! thread at chunk boundaries.

use crate::error::ConvertError;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// Observer for row-processing progress and per-row failures.
pub trait ProgressObserver: Sync {
    /// Called after each processed chunk with the running row count.
    fn on_progress(&self, done: usize, total: usize) {
        let _ = (done, total);
    }

    /// Called for each row that failed when the run continues past errors.
    fn on_error(&self, line: usize, error: &ConvertError) {
        let _ = (line, error);
    }
}

/// Observer that discards everything (`--hide-progress`).
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {}

/// Observer that logs through `tracing` at a bounded rate.
pub struct LogProgress {
    /// Emit a progress event roughly every this many rows.
    every: usize,
    last: AtomicUsize,
}

impl LogProgress {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            last: AtomicUsize::new(0),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, done: usize, total: usize) {
        let last = self.last.load(Ordering::Relaxed);
        if done == total || done.saturating_sub(last) >= self.every {
            self.last.store(done, Ordering::Relaxed);
            info!(done, total, "processed rows");
        }
    }

    fn on_error(&self, line: usize, error: &ConvertError) {
        warn!(line, %error, "row failed");
    }
}
