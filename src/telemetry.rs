//! Telemetry record parsing.
//!
//! Drone cameras burn flight telemetry into each subtitle cue as bracketed
//! `[key : value]` pairs plus a wall-clock timestamp line. This module turns
//! one cue's payload into a structured [`TelemetrySample`]: the cue's time
//! interval, the GPS fix, and every secondary field carried along for the
//! output metadata.
//!
//! A typical cue payload:
//!
//! ```text
//! <font size="28">SrtCnt : 1, DiffTime : 1000ms
//! 2025-12-23 14:32:15.123
//! [iso : 100] [shutter : 1/500.0] [fnum : 280] [ev : 0]
//! [latitude : 40.7128] [longitude : -74.0060] [rel_alt: 10.3 abs_alt: 150.0]</font>
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;

use crate::cue::SubtitleCue;
use crate::error::SkytagError;

/// Keys consumed into the dedicated GPS fields rather than `extra`.
const GPS_KEYS: [&str; 5] = ["latitude", "longitude", "altitude", "rel_alt", "abs_alt"];

/// GPS and camera state valid over one subtitle cue's time interval.
///
/// Times are elapsed from the start of the clip; the sample covers the
/// half-open interval `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// Start of the interval this sample covers.
    pub start_time: Duration,
    /// End of the interval (exclusive).
    pub end_time: Duration,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Altitude in meters, when the telemetry format carries one.
    pub altitude: Option<f64>,
    /// Secondary fields (iso, shutter, focal_len, …) carried through to the
    /// output metadata verbatim.
    pub extra: BTreeMap<String, String>,
}

impl TelemetrySample {
    /// Whether `elapsed` falls inside this sample's half-open interval.
    pub fn contains(&self, elapsed: Duration) -> bool {
        self.start_time <= elapsed && elapsed < self.end_time
    }
}

/// Parses one subtitle cue's free-text payload into a [`TelemetrySample`].
///
/// The parser is a pure transform: it holds only pre-compiled patterns and
/// has no side effects. GPS coordinates are required; everything else is
/// optional.
pub struct TelemetryParser {
    latitude: Regex,
    longitude: Regex,
    abs_alt: Regex,
    rel_alt: Regex,
    altitude: Regex,
    pair: Regex,
    timestamp: Regex,
}

impl TelemetryParser {
    /// Create a parser with all payload patterns pre-compiled.
    pub fn new() -> Self {
        Self {
            latitude: Regex::new(r"\[latitude\s*:\s*([^\]]+)\]").expect("static pattern"),
            longitude: Regex::new(r"\[longitude\s*:\s*([^\]]+)\]").expect("static pattern"),
            // Altitude appears either as its own bracket or packed together
            // with rel_alt inside one ([rel_alt: 1.3 abs_alt: 150.0]).
            abs_alt: Regex::new(r"abs_alt\s*:\s*([-+]?[0-9.]+)").expect("static pattern"),
            rel_alt: Regex::new(r"rel_alt\s*:\s*([-+]?[0-9.]+)").expect("static pattern"),
            altitude: Regex::new(r"\[altitude\s*:\s*([^\]]+)\]").expect("static pattern"),
            pair: Regex::new(r"\[([^:\[\]]+):\s*([^\]]+)\]").expect("static pattern"),
            timestamp: Regex::new(r"(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2}:\d{2})")
                .expect("static pattern"),
        }
    }

    /// Parse one cue into a telemetry sample.
    ///
    /// The sample's interval is the cue's declared interval, taken as
    /// already relative to clip start.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::TelemetryParse`] if the cue's interval is
    /// empty or inverted, or if the payload lacks a parseable
    /// latitude/longitude pair. The caller decides whether to skip the cue
    /// or abort.
    pub fn parse_cue(&self, cue: &SubtitleCue) -> Result<TelemetrySample, SkytagError> {
        if cue.start_time >= cue.end_time {
            return Err(SkytagError::TelemetryParse {
                cue_index: cue.index,
                reason: format!(
                    "empty cue interval ({:?} >= {:?})",
                    cue.start_time, cue.end_time
                ),
            });
        }

        let latitude = self.coordinate(&self.latitude, &cue.text, cue.index, "latitude")?;
        let longitude = self.coordinate(&self.longitude, &cue.text, cue.index, "longitude")?;
        let altitude = self.parse_altitude(&cue.text);

        let mut extra = BTreeMap::new();
        for caps in self.pair.captures_iter(&cue.text) {
            let key = caps[1].trim();
            if GPS_KEYS.contains(&key) {
                continue;
            }
            extra.insert(key.to_string(), caps[2].trim().to_string());
        }

        // The embedded wall-clock timestamp becomes an EXIF-formatted
        // DateTimeOriginal (YYYY:MM:DD HH:MM:SS).
        if let Some(caps) = self.timestamp.captures(&cue.text) {
            let date = caps[1].replace('-', ":");
            extra.insert("DateTimeOriginal".to_string(), format!("{date} {}", &caps[2]));
        }

        Ok(TelemetrySample {
            start_time: cue.start_time,
            end_time: cue.end_time,
            latitude,
            longitude,
            altitude,
            extra,
        })
    }

    /// Absolute altitude wins over relative; a bare `[altitude: …]` bracket
    /// is the last resort.
    fn parse_altitude(&self, text: &str) -> Option<f64> {
        for pattern in [&self.abs_alt, &self.rel_alt, &self.altitude] {
            if let Some(caps) = pattern.captures(text)
                && let Ok(value) = caps[1].trim().parse::<f64>()
            {
                return Some(value);
            }
        }
        None
    }

    fn coordinate(
        &self,
        pattern: &Regex,
        text: &str,
        cue_index: usize,
        field: &str,
    ) -> Result<f64, SkytagError> {
        let caps = pattern
            .captures(text)
            .ok_or_else(|| SkytagError::TelemetryParse {
                cue_index,
                reason: format!("missing {field}"),
            })?;

        caps[1]
            .trim()
            .parse::<f64>()
            .map_err(|error| SkytagError::TelemetryParse {
                cue_index,
                reason: format!("unparseable {field} {:?}: {error}", caps[1].trim()),
            })
    }
}

impl Default for TelemetryParser {
    fn default() -> Self {
        Self::new()
    }
}
