//! Pipeline configuration.
//!
//! [`PipelineOptions`] is a builder that threads output quality, time
//! bounds, sampling rate, and progress callbacks through the coordinator
//! without polluting every function signature.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use skytag::{JpegQuality, PipelineOptions};
//!
//! let options = PipelineOptions::new()
//!     .with_quality(JpegQuality::new(3)?)
//!     .with_start(Duration::from_secs(10))
//!     .with_sample_rate(2.0);
//! # Ok::<(), skytag::SkytagError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use crate::extract::JpegQuality;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Video filename extensions recognized during pair discovery.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

/// Configuration for a pipeline run.
///
/// All fields have sensible defaults — a default-constructed value
/// processes every pair end to end at near-original JPEG quality, sampling
/// every native frame.
#[derive(Clone)]
pub struct PipelineOptions {
    /// JPEG output quality. Defaults to 2.
    pub(crate) quality: JpegQuality,
    /// Extraction start bound. `None` means clip start.
    pub(crate) start: Option<Duration>,
    /// Extraction end bound. `None` means clip end.
    pub(crate) end: Option<Duration>,
    /// Frame sampling rate in frames per second. `None` (or zero) means the
    /// clip's native rate.
    pub(crate) sample_rate: Option<f64>,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for PipelineOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineOptions")
            .field("quality", &self.quality)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("sample_rate", &self.sample_rate)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            quality: JpegQuality::default(),
            start: None,
            end: None,
            sample_rate: None,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the JPEG output quality.
    #[must_use]
    pub fn with_quality(mut self, quality: JpegQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the extraction start bound (elapsed from clip start).
    #[must_use]
    pub fn with_start(mut self, start: Duration) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the extraction end bound (elapsed from clip start).
    #[must_use]
    pub fn with_end(mut self, end: Duration) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the frame sampling rate in frames per second.
    ///
    /// Zero is treated the same as not setting a rate: every native frame.
    #[must_use]
    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Attach a progress callback, invoked once per processed frame.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }
}
