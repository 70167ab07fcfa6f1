//! Telemetry track construction and interval lookup.
//!
//! A [`TelemetryTrack`] owns the ordered telemetry samples of one flight,
//! built once from one subtitle file, and answers "where was the aircraft at
//! elapsed time `t`" via binary search. Tracks may have gaps; [`lookup`]
//! surfaces them as `None` rather than guessing.
//!
//! [`lookup`]: TelemetryTrack::lookup
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use skytag::{CueSource, SrtFile, TelemetryTrack};
//!
//! let cues = SrtFile::new().parse("DJI_0042.srt".as_ref())?;
//! let track = TelemetryTrack::build(&cues)?;
//! if let Some(sample) = track.lookup(Duration::from_secs(12)) {
//!     println!("at 12s: {}, {}", sample.latitude, sample.longitude);
//! }
//! # Ok::<(), skytag::SkytagError>(())
//! ```

use std::path::Path;
use std::time::Duration;

use crate::cue::SubtitleCue;
use crate::error::SkytagError;
use crate::telemetry::{TelemetryParser, TelemetrySample};

/// Ordered, non-overlapping telemetry samples for one flight.
///
/// Invariants maintained by construction: at least one sample, sorted by
/// `start_time`, intervals disjoint. Coverage gaps are allowed.
#[derive(Debug, Clone)]
pub struct TelemetryTrack {
    samples: Vec<TelemetrySample>,
}

impl TelemetryTrack {
    /// Build a track from ordered subtitle cues.
    ///
    /// Every cue is parsed via [`TelemetryParser`]; cues that fail to parse
    /// are dropped with a warning. The surviving samples are re-sorted by
    /// start time (the source is expected ordered, but the track asserts the
    /// order rather than trusting it) and normalized to disjoint intervals.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::EmptyTrack`] if no cue yields a usable sample.
    pub fn build(cues: &[SubtitleCue]) -> Result<Self, SkytagError> {
        let parser = TelemetryParser::new();
        let mut samples = Vec::with_capacity(cues.len());

        for cue in cues {
            match parser.parse_cue(cue) {
                Ok(sample) => samples.push(sample),
                Err(error) => log::warn!("Dropping cue: {error}"),
            }
        }

        log::debug!("Built {} telemetry samples from {} cues", samples.len(), cues.len());
        Self::from_samples(samples)
    }

    /// Build a track directly from samples.
    ///
    /// Applies the same sorting and overlap normalization as
    /// [`build`](TelemetryTrack::build). Intended for synthetic tracks in
    /// tests and for callers with non-SRT telemetry sources.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::EmptyTrack`] if `samples` is empty or every
    /// sample is dropped during normalization.
    pub fn from_samples(mut samples: Vec<TelemetrySample>) -> Result<Self, SkytagError> {
        // Stable sort: cue order breaks start-time ties, which is what makes
        // the earliest-cue-wins overlap policy deterministic.
        samples.sort_by_key(|sample| sample.start_time);
        let samples = normalize(samples);

        if samples.is_empty() {
            return Err(SkytagError::EmptyTrack {
                path: Path::new("<samples>").to_path_buf(),
            });
        }

        Ok(Self { samples })
    }

    /// Attach the subtitle path to an [`EmptyTrack`](SkytagError::EmptyTrack)
    /// error for reporting.
    pub(crate) fn build_for(cues: &[SubtitleCue], path: &Path) -> Result<Self, SkytagError> {
        Self::build(cues).map_err(|error| match error {
            SkytagError::EmptyTrack { .. } => SkytagError::EmptyTrack {
                path: path.to_path_buf(),
            },
            other => other,
        })
    }

    /// Find the sample whose interval contains `elapsed`.
    ///
    /// Binary search over the sorted start times, then a containment check
    /// against the candidate's half-open interval. Returns `None` before the
    /// first sample, after the last, or inside a coverage gap.
    ///
    /// When the source data contained overlapping intervals, the sample with
    /// the earlier start time wins (enforced once at build time, so the
    /// result is deterministic regardless of query order).
    pub fn lookup(&self, elapsed: Duration) -> Option<&TelemetrySample> {
        let idx = self
            .samples
            .partition_point(|sample| sample.start_time <= elapsed);
        if idx == 0 {
            return None;
        }

        let candidate = &self.samples[idx - 1];
        candidate.contains(elapsed).then_some(candidate)
    }

    /// The samples in interval order.
    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    /// Number of samples in the track.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false` for a successfully built track.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The interval from the first sample's start to the last sample's end.
    ///
    /// Gaps inside this interval are still possible.
    pub fn coverage(&self) -> (Duration, Duration) {
        // Non-empty by construction.
        let first = self.samples.first().expect("non-empty track");
        let last = self.samples.last().expect("non-empty track");
        (first.start_time, last.end_time)
    }
}

/// Enforce disjoint intervals on start-time-sorted samples.
///
/// A later sample that ends inside prior coverage contributes nothing under
/// the earliest-start-wins policy and is dropped; one that extends past it
/// keeps only its uncovered tail. Samples with empty intervals are dropped.
fn normalize(samples: Vec<TelemetrySample>) -> Vec<TelemetrySample> {
    let mut normalized: Vec<TelemetrySample> = Vec::with_capacity(samples.len());
    let mut covered_until = Duration::ZERO;

    for mut sample in samples {
        if sample.start_time >= sample.end_time {
            log::warn!(
                "Dropping sample with empty interval at {:?}",
                sample.start_time
            );
            continue;
        }

        if !normalized.is_empty() && sample.start_time < covered_until {
            if sample.end_time <= covered_until {
                log::warn!(
                    "Dropping sample [{:?}, {:?}) swallowed by earlier coverage",
                    sample.start_time,
                    sample.end_time
                );
                continue;
            }
            log::warn!(
                "Clipping overlapping sample [{:?}, {:?}) to start at {:?}",
                sample.start_time,
                sample.end_time,
                covered_until
            );
            sample.start_time = covered_until;
        }

        covered_until = sample.end_time;
        normalized.push(sample);
    }

    normalized
}
