//! Frame time planning.
//!
//! Given a clip's duration, optional start/end bounds, and a sampling rate,
//! [`FrameSchedule`] produces the ordered sequence of target elapsed times
//! at which frames must be extracted. The schedule is lazy (an iterator),
//! finite, and strictly increasing; each emitted [`FrameRequest`] carries
//! its 0-based position for deterministic output naming.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use skytag::FrameSchedule;
//!
//! // One frame per second over a five-second clip.
//! let schedule = FrameSchedule::new(Duration::from_secs(5), None, None, 1.0)?;
//! let times: Vec<f64> = schedule.map(|r| r.elapsed_time.as_secs_f64()).collect();
//! assert_eq!(times, [0.0, 1.0, 2.0, 3.0, 4.0]);
//! # Ok::<(), skytag::SkytagError>(())
//! ```

use std::time::Duration;

use crate::config::PipelineOptions;
use crate::error::SkytagError;
use crate::probe::ClipInfo;

/// One planned frame: the target elapsed time and its output ordinal.
///
/// Created by the planner, consumed once by the alignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    /// 0-based position in the output sequence.
    pub index: u64,
    /// Target seconds-from-start at which the frame must be produced.
    pub elapsed_time: Duration,
}

/// Lazy, finite schedule of [`FrameRequest`]s.
///
/// Emits exactly `ceil((end - start) · rate)` requests at
/// `start + index / rate`, all strictly before `end`.
#[derive(Debug, Clone)]
#[must_use]
pub struct FrameSchedule {
    start: Duration,
    sample_rate: f64,
    count: u64,
    next: u64,
}

impl FrameSchedule {
    /// Plan frame times over `[start, end)` at `sample_rate` frames per
    /// second.
    ///
    /// `start` defaults to zero and `end` to `duration`; both are clamped
    /// into `[0, duration]`.
    ///
    /// # Errors
    ///
    /// - [`SkytagError::InvalidSampleRate`] if `sample_rate` is not finite
    ///   and positive.
    /// - [`SkytagError::InvalidRange`] if `start >= end` after clamping.
    pub fn new(
        duration: Duration,
        start: Option<Duration>,
        end: Option<Duration>,
        sample_rate: f64,
    ) -> Result<Self, SkytagError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SkytagError::InvalidSampleRate(sample_rate));
        }

        let start = start.unwrap_or(Duration::ZERO).min(duration);
        let end = end.unwrap_or(duration).min(duration);

        if start >= end {
            return Err(SkytagError::InvalidRange { start, end });
        }

        let span = (end - start).as_secs_f64();
        let count = (span * sample_rate).ceil() as u64;

        log::debug!(
            "Planned {count} frames over [{start:?}, {end:?}) at {sample_rate} fps"
        );

        Ok(Self {
            start,
            sample_rate,
            count,
            next: 0,
        })
    }

    /// Plan frame times for a probed clip, resolving defaults from the
    /// pipeline options.
    ///
    /// An absent (or zero) sample rate option means "every native frame":
    /// the clip's own frame rate, discovered by the media-inspection
    /// collaborator, is used.
    ///
    /// # Errors
    ///
    /// Same as [`new`](FrameSchedule::new); a clip whose native rate could
    /// not be determined surfaces as [`SkytagError::InvalidSampleRate`].
    pub fn for_clip(clip: &ClipInfo, options: &PipelineOptions) -> Result<Self, SkytagError> {
        let rate = options
            .sample_rate
            .filter(|rate| *rate > 0.0)
            .unwrap_or(clip.frame_rate);
        Self::new(clip.duration, options.start, options.end, rate)
    }

    /// Total number of requests this schedule will emit.
    pub fn planned_frames(&self) -> u64 {
        self.count
    }
}

impl Iterator for FrameSchedule {
    type Item = FrameRequest;

    fn next(&mut self) -> Option<FrameRequest> {
        if self.next >= self.count {
            return None;
        }

        let index = self.next;
        self.next += 1;

        Some(FrameRequest {
            index,
            elapsed_time: self.start
                + Duration::from_secs_f64(index as f64 / self.sample_rate),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameSchedule {}
