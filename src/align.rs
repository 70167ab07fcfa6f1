//! Temporal alignment of frame requests against a telemetry track.
//!
//! This is the core of the crate: frame extraction and telemetry run on
//! independent, only loosely synchronized time bases (planned elapsed times
//! vs. subtitle cue intervals). [`align`] joins them — for each planned
//! frame time, the matching telemetry sample is resolved by interval lookup
//! and emitted as a [`GeoTaggedFrame`].
//!
//! The engine never extrapolates: a frame time falling into a telemetry gap
//! yields `sample: None`, and the consumer decides what to do with an
//! untagged frame. One missing telemetry window must not abort extraction
//! of frames outside that window.
//!
//! Alignment is deterministic (same inputs, same output sequence, no hidden
//! state) and cheap: each lookup is `O(log n)` in track size, the whole
//! join `O(frames · log n)`, which matters when multi-minute clips sampled
//! at high rates produce thousands of requests.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use skytag::{align, FrameSchedule, TelemetryTrack, TelemetrySample};
//!
//! let track = TelemetryTrack::from_samples(vec![TelemetrySample {
//!     start_time: Duration::ZERO,
//!     end_time: Duration::from_secs(2),
//!     latitude: 1.0,
//!     longitude: 1.0,
//!     altitude: None,
//!     extra: Default::default(),
//! }])?;
//!
//! let schedule = FrameSchedule::new(Duration::from_secs(3), None, None, 1.0)?;
//! for frame in align(schedule, &track) {
//!     match frame.sample {
//!         Some(sample) => println!("{}: {}, {}", frame.request.index, sample.latitude, sample.longitude),
//!         None => println!("{}: no telemetry", frame.request.index),
//!     }
//! }
//! # Ok::<(), skytag::SkytagError>(())
//! ```

use crate::planner::FrameRequest;
use crate::telemetry::TelemetrySample;
use crate::track::TelemetryTrack;

/// One frame request joined with its resolved telemetry sample.
///
/// `sample` is `None` when no sample's interval contains the request's
/// elapsed time — absence is surfaced, not masked. Borrowed from the track,
/// which outlives the alignment pass.
#[derive(Debug, Clone, Copy)]
pub struct GeoTaggedFrame<'t> {
    /// The originating frame request.
    pub request: FrameRequest,
    /// The telemetry sample covering `request.elapsed_time`, if any.
    pub sample: Option<&'t TelemetrySample>,
}

/// Lazy alignment iterator returned by [`align`].
///
/// Emits exactly one [`GeoTaggedFrame`] per input request, in input order —
/// no drops, no duplicates, one-to-one by `index`.
#[derive(Debug)]
#[must_use]
pub struct Aligned<'t, I> {
    requests: I,
    track: &'t TelemetryTrack,
}

/// Join a sequence of frame requests against a telemetry track.
///
/// For each request in order, resolves `track.lookup(elapsed_time)` and
/// pairs the two up. The output sequence has the same length as the input.
pub fn align<I>(requests: I, track: &TelemetryTrack) -> Aligned<'_, I::IntoIter>
where
    I: IntoIterator<Item = FrameRequest>,
{
    Aligned {
        requests: requests.into_iter(),
        track,
    }
}

/// Materialize a full alignment pass.
///
/// Convenience for callers that want the whole join up front; the pipeline
/// itself consumes [`align`] lazily.
pub fn align_all<I>(requests: I, track: &TelemetryTrack) -> Vec<GeoTaggedFrame<'_>>
where
    I: IntoIterator<Item = FrameRequest>,
{
    align(requests, track).collect()
}

impl<'t, I> Iterator for Aligned<'t, I>
where
    I: Iterator<Item = FrameRequest>,
{
    type Item = GeoTaggedFrame<'t>;

    fn next(&mut self) -> Option<GeoTaggedFrame<'t>> {
        let request = self.requests.next()?;
        Some(GeoTaggedFrame {
            request,
            sample: self.track.lookup(request.elapsed_time),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.requests.size_hint()
    }
}

impl<'t, I> ExactSizeIterator for Aligned<'t, I> where I: ExactSizeIterator<Item = FrameRequest> {}
