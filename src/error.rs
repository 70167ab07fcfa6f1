//! Error types for the `skytag` crate.
//!
//! This module defines [`SkytagError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry rich context to aid
//! debugging, including file paths, cue indices, frame indices, and upstream
//! error messages.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `skytag` operations.
///
/// Every public method that can fail returns `Result<T, SkytagError>`.
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
///
/// Errors local to one cue or one frame (`TelemetryParse`, `FrameExtraction`,
/// `Tagging`) are recovered by the pipeline; errors that invalidate a whole
/// video/subtitle pair (`EmptyTrack`, `InvalidRange`) abort that pair only.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SkytagError {
    /// One subtitle cue's text payload lacks usable GPS data.
    #[error("Cue {cue_index} has no usable telemetry: {reason}")]
    TelemetryParse {
        /// Zero-based index of the cue in the subtitle file.
        cue_index: usize,
        /// What was missing or malformed.
        reason: String,
    },

    /// No cue in a subtitle file yielded a usable telemetry sample.
    #[error("No usable telemetry samples in {path}")]
    EmptyTrack {
        /// Path to the subtitle file.
        path: PathBuf,
    },

    /// The requested start/end produce an empty or inverted range after
    /// clamping into the clip duration.
    #[error("Invalid range: start ({start:?}) must be less than end ({end:?})")]
    InvalidRange {
        /// The start of the range after clamping.
        start: Duration,
        /// The end of the range after clamping.
        end: Duration,
    },

    /// A non-finite or non-positive frame sampling rate was provided.
    #[error("Invalid sample rate: {0} (must be finite and positive)")]
    InvalidSampleRate(f64),

    /// A JPEG quality value outside the 1..=31 scale was provided.
    #[error("Invalid JPEG quality: {0} (must be 1..=31, lower is better)")]
    InvalidQuality(u8),

    /// A single frame's extraction failed.
    #[error("Failed to extract frame {index} at {elapsed:?}: {reason}")]
    FrameExtraction {
        /// Ordinal position of the frame in the output sequence.
        index: u64,
        /// Target elapsed time from clip start.
        elapsed: Duration,
        /// Underlying reason extraction failed.
        reason: String,
    },

    /// Writing geotag metadata into one image failed.
    #[error("Failed to tag {path}: {reason}")]
    Tagging {
        /// Path to the image that could not be tagged.
        path: PathBuf,
        /// Underlying reason tagging failed.
        reason: String,
    },

    /// A media or subtitle file could not be opened.
    #[error("Failed to open {path}: {reason}")]
    FileOpen {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// Probing a media file for duration/frame rate failed.
    #[error("Failed to probe {path}: {reason}")]
    ProbeFailed {
        /// Path to the media file.
        path: PathBuf,
        /// Underlying reason probing failed.
        reason: String,
    },

    /// A subtitle file could not be parsed into cues.
    #[error("Failed to parse subtitle file {path}: {reason}")]
    CueParse {
        /// Path to the subtitle file.
        path: PathBuf,
        /// Underlying reason parsing failed.
        reason: String,
    },

    /// An external tool required by a collaborator is unavailable.
    #[error("Required tool '{name}' is unavailable: {reason}")]
    MissingTool {
        /// Tool name or configured executable path.
        name: String,
        /// Why it could not be invoked.
        reason: String,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during JPEG encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for SkytagError {
    fn from(error: FfmpegError) -> Self {
        SkytagError::FfmpegError(error.to_string())
    }
}
