//! Progress reporting support.
//!
//! This module provides [`ProgressCallback`] for monitoring pipeline
//! progress and [`ProgressInfo`] for detailed per-frame snapshots. The CLI
//! uses these to drive its progress bar; library callers can plug in their
//! own sink.
//!
//! # Example
//!
//! ```
//! use skytag::{ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of work currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Extracting and tagging frames for one video/subtitle pair.
    FrameExtraction,
}

/// A snapshot of pipeline progress.
///
/// Delivered to [`ProgressCallback::on_progress`] once per processed frame.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many frames have been processed so far in this pair.
    pub current: u64,
    /// Total frames planned for this pair, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the pair started.
    pub elapsed: Duration,
    /// The frame index currently being processed.
    pub current_frame: Option<u64>,
    /// The clip elapsed time currently being processed.
    pub current_timestamp: Option<Duration>,
}

/// Trait for receiving progress updates during a pipeline run.
///
/// Implementations must be [`Send`] and [`Sync`].
///
/// Progress callbacks are **infallible** — they observe but cannot halt
/// the run.
pub trait ProgressCallback: Send + Sync {
    /// Called once per processed frame.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: Option<u64>) -> Self {
        Self {
            callback,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed frame and fire the callback.
    pub(crate) fn advance(&mut self, frame_index: u64, timestamp: Duration) {
        self.current += 1;

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        self.callback.on_progress(&ProgressInfo {
            operation: OperationType::FrameExtraction,
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_frame: Some(frame_index),
            current_timestamp: Some(timestamp),
        });
    }
}
