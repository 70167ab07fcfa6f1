//! Media inspection boundary.
//!
//! The planner needs exactly two facts about a clip before any frame is
//! decoded: how long it runs and its native frame rate. [`MediaInspector`]
//! is the capability trait the pipeline depends on; [`FfmpegInspector`] is
//! the production implementation, which opens the file, reads the container
//! and best-video-stream metadata, and immediately closes the demuxer.

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::media::Type;

use crate::error::SkytagError;

/// Duration and native frame rate of one clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipInfo {
    /// Total clip duration.
    pub duration: Duration,
    /// Native frames per second of the best video stream.
    pub frame_rate: f64,
}

/// Boundary trait for media inspection.
///
/// Injected into the pipeline so tests can substitute a fake that reports a
/// synthetic duration and frame rate without touching FFmpeg.
pub trait MediaInspector {
    /// Probe the media file at `path` for its duration and frame rate.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::FileOpen`] if the file cannot be opened,
    /// [`SkytagError::NoVideoStream`] if it has no video stream, or
    /// [`SkytagError::ProbeFailed`] if the duration or frame rate cannot be
    /// determined.
    fn probe(&self, path: &Path) -> Result<ClipInfo, SkytagError>;
}

/// FFmpeg-backed media inspector.
///
/// Opens the file, locates the best video stream, and derives the frame
/// rate from the stream's average frame rate, falling back to its real base
/// rate when the average is unknown.
///
/// # Example
///
/// ```no_run
/// use skytag::{FfmpegInspector, MediaInspector};
///
/// let clip = FfmpegInspector.probe("DJI_0042.mp4".as_ref())?;
/// println!("{:.2}s @ {:.2} fps", clip.duration.as_secs_f64(), clip.frame_rate);
/// # Ok::<(), skytag::SkytagError>(())
/// ```
pub struct FfmpegInspector;

impl MediaInspector for FfmpegInspector {
    fn probe(&self, path: &Path) -> Result<ClipInfo, SkytagError> {
        log::debug!("Probing media file: {}", path.display());

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| SkytagError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SkytagError::FileOpen {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(SkytagError::NoVideoStream)?;

        // Average frame rate, falling back to the stream's base rate.
        let average = stream.avg_frame_rate();
        let frame_rate = if average.denominator() != 0 && average.numerator() > 0 {
            average.numerator() as f64 / average.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 && rate.numerator() > 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                return Err(SkytagError::ProbeFailed {
                    path: path.to_path_buf(),
                    reason: "could not determine frame rate".to_string(),
                });
            }
        };

        // Container-level duration is reported in microseconds.
        let duration_microseconds = input_context.duration();
        if duration_microseconds <= 0 {
            return Err(SkytagError::ProbeFailed {
                path: path.to_path_buf(),
                reason: "container reports no duration".to_string(),
            });
        }

        let clip = ClipInfo {
            duration: Duration::from_micros(duration_microseconds as u64),
            frame_rate,
        };

        log::debug!(
            "Probed {}: {:.3}s @ {:.2} fps",
            path.display(),
            clip.duration.as_secs_f64(),
            clip.frame_rate
        );
        Ok(clip)
    }
}
