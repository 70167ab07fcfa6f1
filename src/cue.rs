//! Subtitle cue parsing.
//!
//! This module defines [`SubtitleCue`], one timed entry of a subtitle file,
//! and [`CueSource`], the boundary trait the pipeline uses to obtain cues.
//! [`SrtFile`] is the production implementation for the sidecar `.srt` files
//! drone cameras write next to each video clip.
//!
//! Cue timestamps are taken directly from the file's declared intervals and
//! treated as elapsed time from the start of the clip.
//!
//! # Example
//!
//! ```no_run
//! use skytag::{CueSource, SrtFile};
//!
//! let cues = SrtFile::new().parse("DJI_0042.srt".as_ref())?;
//! for cue in &cues {
//!     println!("[{:?} → {:?}] {}", cue.start_time, cue.end_time, cue.text);
//! }
//! # Ok::<(), skytag::SkytagError>(())
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use regex::Regex;

use crate::error::SkytagError;

/// A single subtitle cue: a display interval plus its free-text payload.
#[derive(Debug, Clone)]
pub struct SubtitleCue {
    /// Zero-based position of this cue in the file.
    pub index: usize,
    /// When this cue starts, elapsed from clip start.
    pub start_time: Duration,
    /// When this cue ends, elapsed from clip start.
    pub end_time: Duration,
    /// The raw text payload (telemetry lines, markup included).
    pub text: String,
}

/// Boundary trait for subtitle parsing.
///
/// The pipeline only needs an ordered sequence of timed cues; how they are
/// obtained (sidecar file, embedded stream, synthetic test data) is an
/// implementation detail behind this trait.
pub trait CueSource {
    /// Parse the subtitle file at `path` into cues ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::CueParse`] if the file cannot be read or
    /// contains no parseable cues at all. Individually malformed blocks are
    /// skipped with a warning, not fatal.
    fn parse(&self, path: &Path) -> Result<Vec<SubtitleCue>, SkytagError>;
}

/// SubRip (`.srt`) sidecar file parser.
///
/// Splits the file into blank-line-separated blocks, locates the
/// `HH:MM:SS,mmm --> HH:MM:SS,mmm` timecode line in each, and keeps the
/// remaining lines as the cue payload. Blocks without a recognisable
/// timecode are dropped with a warning.
pub struct SrtFile {
    timecode: Regex,
}

impl SrtFile {
    /// Create a new parser with its timecode pattern pre-compiled.
    pub fn new() -> Self {
        Self {
            timecode: Regex::new(
                r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})",
            )
            .expect("static timecode pattern"),
        }
    }

    /// Parse already-loaded SRT content.
    ///
    /// Exposed separately from [`CueSource::parse`] so callers holding the
    /// content in memory (tests, embedded extraction) skip the file read.
    pub fn parse_content(&self, content: &str) -> Vec<SubtitleCue> {
        let normalized = content.replace("\r\n", "\n");
        let mut cues = Vec::new();

        for block in normalized.split("\n\n") {
            if block.trim().is_empty() {
                continue;
            }

            let lines: Vec<&str> = block.lines().collect();
            let Some(timecode_line) = lines
                .iter()
                .position(|line| self.timecode.is_match(line))
            else {
                log::warn!("Skipping subtitle block without timecode: {:?}", lines.first());
                continue;
            };

            let Some((start_time, end_time)) = self.parse_timecode(lines[timecode_line]) else {
                continue;
            };

            let text = lines[timecode_line + 1..].join("\n");
            cues.push(SubtitleCue {
                index: cues.len(),
                start_time,
                end_time,
                text,
            });
        }

        cues.sort_by_key(|cue| cue.start_time);
        cues
    }

    fn parse_timecode(&self, line: &str) -> Option<(Duration, Duration)> {
        let caps = self.timecode.captures(line)?;

        let field = |i: usize| caps[i].parse::<u64>().ok();
        let start = field(1)? * 3_600_000 + field(2)? * 60_000 + field(3)? * 1_000 + field(4)?;
        let end = field(5)? * 3_600_000 + field(6)? * 60_000 + field(7)? * 1_000 + field(8)?;

        Some((Duration::from_millis(start), Duration::from_millis(end)))
    }
}

impl Default for SrtFile {
    fn default() -> Self {
        Self::new()
    }
}

impl CueSource for SrtFile {
    fn parse(&self, path: &Path) -> Result<Vec<SubtitleCue>, SkytagError> {
        log::debug!("Parsing subtitle file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|error| SkytagError::CueParse {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let cues = self.parse_content(&content);
        if cues.is_empty() {
            return Err(SkytagError::CueParse {
                path: path.to_path_buf(),
                reason: "no parseable cues found".to_string(),
            });
        }

        log::debug!("Parsed {} cues from {}", cues.len(), path.display());
        Ok(cues)
    }
}
