//! Upload progress reporting service
//!
//! This module separates progress reporting concerns from the transfer
//! logic, allowing different frontends to implement their own progress
//! handling.

use crate::tracing_config::events;
use instant::Instant;

/// Progress of a single file upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    /// File being uploaded
    pub file_name: String,
    /// Bytes sent so far
    pub sent: u64,
    /// Total bytes to send
    pub total: u64,
    /// Elapsed time since the upload started (milliseconds)
    pub elapsed_ms: u64,
}

impl UploadProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(file_name: &str, sent: u64, total: u64, start_time: Instant) -> Self {
        Self {
            file_name: file_name.to_string(),
            sent,
            total,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Rounded percentage of the upload completed (0-100)
    ///
    /// An empty upload counts as complete.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let ratio = (self.sent.min(self.total) as f64 * 100.0) / self.total as f64;
        ratio.round() as u8
    }
}

/// Trait for reporting upload progress
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update for one file
    fn report_progress(&self, update: UploadProgress);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: UploadProgress) {
        // Intentionally empty - discards progress updates
    }
}

/// Console progress reporter that logs through `tracing`
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// # Arguments
    /// * `verbose` - Whether to log every chunk or only completed uploads
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: UploadProgress) {
        let percent = update.percent();
        if self.verbose {
            events::upload_progress(&update.file_name, update.sent, update.total, percent);
        } else if percent == 100 {
            tracing::info!(file = %update.file_name, "📤 Upload complete");
        }
    }
}
