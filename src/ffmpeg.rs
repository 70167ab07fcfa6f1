//! FFmpeg console verbosity control.
//!
//! FFmpeg has its own internal logging, separate from the Rust `log`
//! facade, and by default it chatters on stderr while clips are decoded.
//! This thin wrapper lets callers tune that noise without importing
//! `ffmpeg-next` directly; the CLI silences everything below errors before
//! a run.

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity, most quiet to most verbose.
///
/// Maps directly onto FFmpeg's `AV_LOG_*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// No FFmpeg output at all.
    Quiet,
    /// Unrecoverable, process-aborting conditions only.
    Panic,
    /// Unrecoverable errors (the context is lost, the process continues).
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

/// Set FFmpeg's internal log verbosity.
///
/// Controls what FFmpeg itself prints to stderr; Rust-side `log` output is
/// unaffected.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
