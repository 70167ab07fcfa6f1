//! # skytag
//!
//! Extract geotagged still frames from drone video using the embedded
//! flight-telemetry subtitle track.
//!
//! Drone cameras write a sidecar `.srt` next to each clip whose cues carry
//! the aircraft's GPS fix and camera state, one cue per telemetry window.
//! `skytag` converts such a clip into a sequence of JPEG stills, each
//! tagged with the coordinates the aircraft had at the moment the frame
//! was captured.
//!
//! The core is the temporal alignment: frame extraction and telemetry run
//! on independent time bases (planned elapsed times vs. cue intervals),
//! and [`align`] joins them deterministically via interval lookup on a
//! [`TelemetryTrack`]. Everything around it — probing, decoding, EXIF
//! writing, cue parsing — sits behind small capability traits so the
//! pipeline is testable with fakes.
//!
//! ## Quick Start
//!
//! ### Process a directory of clips
//!
//! ```no_run
//! use skytag::{Coordinator, PipelineOptions};
//!
//! let mut coordinator = Coordinator::with_defaults(PipelineOptions::new());
//! let report = coordinator.run("flights/".as_ref(), "frames/".as_ref())?;
//! for pair in &report.pairs {
//!     println!("{}: {} frames tagged", pair.stem, pair.tagged);
//! }
//! # Ok::<(), skytag::SkytagError>(())
//! ```
//!
//! ### Align synthetic telemetry
//!
//! ```
//! use std::time::Duration;
//!
//! use skytag::{align, FrameSchedule, TelemetrySample, TelemetryTrack};
//!
//! let track = TelemetryTrack::from_samples(vec![TelemetrySample {
//!     start_time: Duration::ZERO,
//!     end_time: Duration::from_secs(5),
//!     latitude: 48.8584,
//!     longitude: 2.2945,
//!     altitude: Some(120.0),
//!     extra: Default::default(),
//! }])?;
//!
//! let schedule = FrameSchedule::new(Duration::from_secs(5), None, None, 1.0)?;
//! assert!(align(schedule, &track).all(|frame| frame.sample.is_some()));
//! # Ok::<(), skytag::SkytagError>(())
//! ```
//!
//! ## Pipeline shape
//!
//! For each matched (video, `.srt`) pair in the input directory:
//!
//! 1. Probe duration and native frame rate ([`MediaInspector`]).
//! 2. Parse cues ([`CueSource`]) and build the [`TelemetryTrack`].
//! 3. Plan the frame schedule ([`FrameSchedule`]).
//! 4. Align the schedule against the track ([`align`]).
//! 5. Extract each frame ([`FrameExtractor`]) and write its geotag
//!    ([`GeotagWriter`]); frames in telemetry gaps stay untagged.
//!
//! Pairs are independent: one pair's failure never aborts the run, and a
//! single frame's failure never aborts its pair.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system, and
//! `exiftool` must be available for geotag writing (its location is
//! configurable on [`ExifToolTagger`]).

pub mod align;
pub mod config;
pub mod cue;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod pipeline;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod tag;
pub mod telemetry;
pub mod track;

pub use align::{Aligned, GeoTaggedFrame, align, align_all};
pub use config::{PipelineOptions, VIDEO_EXTENSIONS};
pub use cue::{CueSource, SrtFile, SubtitleCue};
pub use error::SkytagError;
pub use extract::{FfmpegExtractor, FrameExtractor, JpegQuality};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use pipeline::{Coordinator, MediaPair, PairFailure, PairReport, RunReport, discover_pairs};
pub use planner::{FrameRequest, FrameSchedule};
pub use probe::{ClipInfo, FfmpegInspector, MediaInspector};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use tag::{ExifToolTagger, GeotagWriter, geotag_arguments};
pub use telemetry::{TelemetryParser, TelemetrySample};
pub use track::TelemetryTrack;
