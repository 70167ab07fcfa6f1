//! Frame extraction boundary.
//!
//! [`FrameExtractor`] is the capability trait the pipeline uses to turn a
//! target elapsed time into encoded JPEG bytes. [`FfmpegExtractor`] is the
//! production implementation: it seeks to the nearest keyframe before the
//! target, decodes forward to the first frame at or after it, converts the
//! frame to RGB, and encodes it in memory.
//!
//! The extractor keeps the demuxer for the most recently used video open,
//! so the per-pair extraction loop pays the open cost once; a fresh decoder
//! is still built per frame and dropped when the call returns.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{ExtendedColorType, codecs::jpeg::JpegEncoder};

use crate::error::SkytagError;

/// JPEG output quality on the 1 (best) to 31 (worst) scale.
///
/// This is the scale drone tooling and ffmpeg's `-qscale:v` use; values of
/// 2–5 are the usual sweet spot for near-original quality. Internally the
/// value is mapped onto the `image` encoder's 1–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegQuality(u8);

impl JpegQuality {
    /// Validate a quality value.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::InvalidQuality`] when `value` is outside
    /// `1..=31`; nothing is clamped silently.
    pub fn new(value: u8) -> Result<Self, SkytagError> {
        if (1..=31).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SkytagError::InvalidQuality(value))
        }
    }

    /// The raw 1..=31 value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Map onto the `image` crate's 1–100 quality scale (1 → 100, 31 → 1).
    pub(crate) fn encoder_quality(self) -> u8 {
        let qscale = u16::from(self.0);
        (100 - (qscale - 1) * 99 / 30) as u8
    }
}

impl Default for JpegQuality {
    /// Quality 2: visually indistinguishable from the source frame.
    fn default() -> Self {
        Self(2)
    }
}

/// Boundary trait for frame extraction.
///
/// Injected into the pipeline so tests can substitute a fake that produces
/// deterministic bytes without decoding video.
pub trait FrameExtractor {
    /// Produce the encoded JPEG bytes of the frame at `elapsed` in `video`.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::FileOpen`] if the video cannot be opened,
    /// [`SkytagError::NoVideoStream`] if it has no video stream, or a
    /// decode/encode error for this frame only.
    fn extract(
        &mut self,
        video: &Path,
        elapsed: Duration,
        quality: JpegQuality,
    ) -> Result<Vec<u8>, SkytagError>;
}

/// FFmpeg-backed frame extractor.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use skytag::{FfmpegExtractor, FrameExtractor, JpegQuality};
///
/// let mut extractor = FfmpegExtractor::new();
/// let jpeg = extractor.extract(
///     "DJI_0042.mp4".as_ref(),
///     Duration::from_secs(12),
///     JpegQuality::default(),
/// )?;
/// std::fs::write("frame.jpg", jpeg)?;
/// # Ok::<(), skytag::SkytagError>(())
/// ```
pub struct FfmpegExtractor {
    open: Option<OpenVideo>,
}

/// Demuxer state cached between extractions from the same file.
struct OpenVideo {
    path: PathBuf,
    input: Input,
    stream_index: usize,
    time_base: Rational,
    frame_rate: f64,
}

impl FfmpegExtractor {
    /// Create an extractor with no file open yet.
    pub fn new() -> Self {
        Self { open: None }
    }

    fn ensure_open(&mut self, path: &Path) -> Result<&mut OpenVideo, SkytagError> {
        let stale = self
            .open
            .as_ref()
            .is_none_or(|open| open.path != path);

        if stale {
            self.open = Some(Self::open_video(path)?);
        }

        Ok(self.open.as_mut().expect("just opened"))
    }

    fn open_video(path: &Path) -> Result<OpenVideo, SkytagError> {
        log::debug!("Opening video for extraction: {}", path.display());

        ffmpeg_next::init().map_err(|error| SkytagError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| SkytagError::FileOpen {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(SkytagError::NoVideoStream)?;

        let stream_index = stream.index();
        let time_base = stream.time_base();

        let average = stream.avg_frame_rate();
        let frame_rate = if average.denominator() != 0 && average.numerator() > 0 {
            average.numerator() as f64 / average.denominator() as f64
        } else {
            let rate = stream.rate();
            rate.numerator() as f64 / rate.denominator().max(1) as f64
        };

        Ok(OpenVideo {
            path: path.to_path_buf(),
            input,
            stream_index,
            time_base,
            frame_rate,
        })
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(
        &mut self,
        video: &Path,
        elapsed: Duration,
        quality: JpegQuality,
    ) -> Result<Vec<u8>, SkytagError> {
        let open = self.ensure_open(video)?;

        // Build a fresh decoder from the stream parameters.
        let stream = open
            .input
            .stream(open.stream_index)
            .ok_or(SkytagError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();

        // Set up the pixel-format converter (source format → RGB24).
        let mut scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        // Seek to the nearest keyframe before the target, then decode
        // forward until the first frame at or after it.
        let target_frame = (elapsed.as_secs_f64() * open.frame_rate) as u64;
        let target_timestamp = duration_to_stream_timestamp(elapsed, open.time_base);
        open.input.seek(target_timestamp, ..target_timestamp)?;

        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();

        for (stream, packet) in open.input.packets() {
            if stream.index() != open.stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.pts().unwrap_or(0);
                let current_frame =
                    pts_to_frame_number(pts, open.time_base, open.frame_rate);

                if current_frame >= target_frame {
                    scaler.run(&decoded_frame, &mut rgb_frame)?;
                    return encode_jpeg(&rgb_frame, width, height, quality);
                }
            }
        }

        // Flush the decoder: the target may sit in the final group of
        // pictures.
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts = decoded_frame.pts().unwrap_or(0);
            let current_frame = pts_to_frame_number(pts, open.time_base, open.frame_rate);

            if current_frame >= target_frame {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                return encode_jpeg(&rgb_frame, width, height, quality);
            }
        }

        Err(SkytagError::FfmpegError(format!(
            "no decodable frame at or after {:.3}s",
            elapsed.as_secs_f64()
        )))
    }
}

/// Encode a decoded RGB24 frame as JPEG in memory.
fn encode_jpeg(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
    quality: JpegQuality,
) -> Result<Vec<u8>, SkytagError> {
    let buffer = frame_to_rgb_buffer(rgb_frame, width, height);

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.encoder_quality());
    encoder.encode(&buffer, width, height, ExtendedColorType::Rgb8)?;
    Ok(bytes)
}

/// Copy pixel data from an FFmpeg video frame into a tightly-packed RGB
/// buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3);
/// the encoder expects none.
fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Convert a [`Duration`] to a timestamp in the stream's time base.
fn duration_to_stream_timestamp(duration: Duration, time_base: Rational) -> i64 {
    let seconds = duration.as_secs_f64();
    let numerator = time_base.numerator() as f64;
    let denominator = time_base.denominator() as f64;
    (seconds * denominator / numerator) as i64
}

/// Rescale a PTS value to a frame number.
fn pts_to_frame_number(pts: i64, time_base: Rational, frame_rate: f64) -> u64 {
    let seconds = pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    (seconds * frame_rate) as u64
}
