//! Pipeline coordination.
//!
//! [`Coordinator`] drives the whole conversion for a directory of clips:
//! discover matched video/subtitle pairs, then for each pair probe the
//! clip, build the telemetry track, plan the frame schedule, align it, and
//! extract + tag every frame in order.
//!
//! Failure policy (enforced here, not in the core): a probe, cue-parse,
//! track-build, or planning failure aborts only its pair and is recorded in
//! the [`RunReport`]; a single frame's extraction or tagging failure is
//! logged with its index and elapsed time and skipped. Nothing aborts the
//! whole run.
//!
//! # Example
//!
//! ```no_run
//! use skytag::{Coordinator, PipelineOptions};
//!
//! let mut coordinator = Coordinator::with_defaults(PipelineOptions::new());
//! let report = coordinator.run("flights/".as_ref(), "frames/".as_ref())?;
//! println!("{} pairs processed, {} failed", report.pairs.len(), report.failures.len());
//! # Ok::<(), skytag::SkytagError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::align::align;
use crate::config::{PipelineOptions, VIDEO_EXTENSIONS};
use crate::cue::{CueSource, SrtFile};
use crate::error::SkytagError;
use crate::extract::{FfmpegExtractor, FrameExtractor};
use crate::planner::FrameSchedule;
use crate::probe::{FfmpegInspector, MediaInspector};
use crate::progress::ProgressTracker;
use crate::tag::{ExifToolTagger, GeotagWriter};
use crate::track::TelemetryTrack;

/// One video file plus its associated telemetry subtitle, processed as a
/// unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPair {
    /// The video clip.
    pub video: PathBuf,
    /// The sidecar subtitle file carrying the flight telemetry.
    pub subtitle: PathBuf,
    /// Shared file stem, used to name the pair's output directory.
    pub stem: String,
}

/// Outcome of one successfully processed pair.
#[derive(Debug, Clone, Default)]
pub struct PairReport {
    /// The pair's file stem.
    pub stem: String,
    /// Frames the planner scheduled.
    pub planned: u64,
    /// Images written to disk.
    pub written: u64,
    /// Images that received a geotag.
    pub tagged: u64,
    /// Images written without telemetry coverage (left untagged).
    pub untagged: u64,
    /// Frames skipped after an extraction or tagging failure.
    pub failed: u64,
}

/// A pair that could not be processed at all.
#[derive(Debug, Clone)]
pub struct PairFailure {
    /// The pair's file stem.
    pub stem: String,
    /// Why the pair was abandoned.
    pub error: String,
}

/// Aggregate outcome of a full run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Pairs that ran to completion (possibly with per-frame skips).
    pub pairs: Vec<PairReport>,
    /// Pairs abandoned by a probe/parse/build/plan failure.
    pub failures: Vec<PairFailure>,
}

/// Scan a directory for video files with a same-stem `.srt` sidecar.
///
/// Non-recursive. Extension matching is case-insensitive over
/// [`VIDEO_EXTENSIONS`]; videos without a sidecar are skipped with a
/// warning. Pairs come back sorted by stem so runs are deterministic.
///
/// # Errors
///
/// Returns [`SkytagError::IoError`] if the directory cannot be read.
pub fn discover_pairs(input_dir: &Path) -> Result<Vec<MediaPair>, SkytagError> {
    let mut pairs = Vec::new();

    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let is_video = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                VIDEO_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
            });
        if !is_video {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let subtitle = input_dir.join(format!("{stem}.srt"));
        if !subtitle.exists() {
            log::warn!("No telemetry subtitle for {}, skipping", path.display());
            continue;
        }

        pairs.push(MediaPair {
            video: path.clone(),
            subtitle,
            stem: stem.to_string(),
        });
    }

    pairs.sort_by(|a, b| a.stem.cmp(&b.stem));
    Ok(pairs)
}

/// Drives extraction and tagging for every matched pair in an input
/// directory.
///
/// All four boundary collaborators are injected, so tests can run the full
/// pipeline against fakes and production code composes the FFmpeg/exiftool
/// implementations via [`with_defaults`](Coordinator::with_defaults).
pub struct Coordinator {
    inspector: Box<dyn MediaInspector>,
    cues: Box<dyn CueSource>,
    extractor: Box<dyn FrameExtractor>,
    tagger: Box<dyn GeotagWriter>,
    options: PipelineOptions,
}

impl Coordinator {
    /// Create a coordinator with explicit collaborators.
    pub fn new(
        inspector: Box<dyn MediaInspector>,
        cues: Box<dyn CueSource>,
        extractor: Box<dyn FrameExtractor>,
        tagger: Box<dyn GeotagWriter>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            inspector,
            cues,
            extractor,
            tagger,
            options,
        }
    }

    /// Create a coordinator with the production collaborators: FFmpeg
    /// probing and extraction, sidecar SRT parsing, and `exiftool` tagging
    /// resolved from `PATH`.
    pub fn with_defaults(options: PipelineOptions) -> Self {
        Self::new(
            Box::new(FfmpegInspector),
            Box::new(SrtFile::new()),
            Box::new(FfmpegExtractor::new()),
            Box::new(ExifToolTagger::new("exiftool")),
            options,
        )
    }

    /// Process every matched pair under `input_dir`, writing each pair's
    /// frames to `output_dir/<stem>/`.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::IoError`] if the input directory cannot be
    /// read or the output directory cannot be created. Per-pair and
    /// per-frame failures are recorded in the report, never propagated.
    pub fn run(&mut self, input_dir: &Path, output_dir: &Path) -> Result<RunReport, SkytagError> {
        let pairs = discover_pairs(input_dir)?;
        log::debug!("Discovered {} pairs in {}", pairs.len(), input_dir.display());

        fs::create_dir_all(output_dir)?;

        let mut report = RunReport::default();
        for pair in &pairs {
            match self.process_pair(pair, output_dir) {
                Ok(pair_report) => report.pairs.push(pair_report),
                Err(error) => {
                    log::warn!("Abandoning pair {}: {error}", pair.stem);
                    report.failures.push(PairFailure {
                        stem: pair.stem.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Process one pair: probe, build the track, plan, align, extract, tag.
    ///
    /// # Errors
    ///
    /// Returns the pair-fatal errors of steps 1–4 ([`SkytagError::
    /// ProbeFailed`], [`SkytagError::CueParse`], [`SkytagError::
    /// EmptyTrack`], [`SkytagError::InvalidRange`], …). Per-frame failures
    /// are counted in the report instead.
    pub fn process_pair(
        &mut self,
        pair: &MediaPair,
        output_root: &Path,
    ) -> Result<PairReport, SkytagError> {
        log::debug!("Processing pair {}", pair.stem);

        let clip = self.inspector.probe(&pair.video)?;
        let cues = self.cues.parse(&pair.subtitle)?;
        let track = TelemetryTrack::build_for(&cues, &pair.subtitle)?;
        let schedule = FrameSchedule::for_clip(&clip, &self.options)?;

        let frames_dir = output_root.join(&pair.stem);
        fs::create_dir_all(&frames_dir)?;

        let mut report = PairReport {
            stem: pair.stem.clone(),
            planned: schedule.planned_frames(),
            ..PairReport::default()
        };

        let mut tracker =
            ProgressTracker::new(self.options.progress.clone(), Some(report.planned));

        for frame in align(schedule, &track) {
            let request = frame.request;
            let image_path = frames_dir.join(format!("frame_{:06}.jpg", request.index));

            let extracted = self
                .extractor
                .extract(&pair.video, request.elapsed_time, self.options.quality)
                .and_then(|bytes| fs::write(&image_path, bytes).map_err(SkytagError::from));

            if let Err(error) = extracted {
                let error = SkytagError::FrameExtraction {
                    index: request.index,
                    elapsed: request.elapsed_time,
                    reason: error.to_string(),
                };
                log::warn!("{error}");
                report.failed += 1;
                tracker.advance(request.index, request.elapsed_time);
                continue;
            }
            report.written += 1;

            match frame.sample {
                Some(sample) => match self.tagger.write_geotag(&image_path, sample) {
                    Ok(()) => report.tagged += 1,
                    Err(error) => {
                        log::warn!(
                            "Frame {} at {:?} written but not tagged: {error}",
                            request.index,
                            request.elapsed_time
                        );
                        report.failed += 1;
                    }
                },
                None => {
                    log::warn!(
                        "No telemetry covers frame {} at {:?}; leaving untagged",
                        request.index,
                        request.elapsed_time
                    );
                    report.untagged += 1;
                }
            }

            tracker.advance(request.index, request.elapsed_time);
        }

        log::debug!(
            "Pair {}: {} written, {} tagged, {} untagged, {} failed",
            report.stem,
            report.written,
            report.tagged,
            report.untagged,
            report.failed
        );
        Ok(report)
    }
}
