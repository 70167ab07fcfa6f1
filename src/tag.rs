//! Geotag writing boundary.
//!
//! [`GeotagWriter`] is the capability trait the pipeline uses to embed GPS
//! metadata into an extracted frame. The production implementation,
//! [`ExifToolTagger`], shells out to `exiftool`; no Rust crate currently
//! writes the full EXIF GPS + maker-tag set reliably, so the subprocess
//! sits behind a coherent API the rest of the crate never sees past.
//!
//! Tagging is idempotent: `-overwrite_original` replaces any prior GPS
//! fields on re-runs instead of stacking sidecar copies.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::SkytagError;
use crate::telemetry::TelemetrySample;

/// Secondary telemetry keys with a dedicated EXIF tag.
///
/// Anything else in a sample's `extra` map is folded into `UserComment`.
const EXIF_TAG_MAP: [(&str, &str); 7] = [
    ("iso", "ISO"),
    ("shutter", "ShutterSpeedValue"),
    ("fnum", "ApertureValue"),
    ("ev", "ExposureCompensation"),
    ("ct", "ColorTemperature"),
    ("color_md", "ColorMode"),
    ("focal_len", "FocalLength"),
];

/// Boundary trait for geotag writing.
///
/// Injected into the pipeline so tests can substitute a fake that records
/// calls instead of spawning a subprocess.
pub trait GeotagWriter {
    /// Write the sample's GPS fix (and secondary telemetry) into the image
    /// at `image`.
    ///
    /// Must be idempotent: re-tagging overwrites prior GPS fields.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::Tagging`] when the write fails; the failure
    /// is scoped to this one image.
    fn write_geotag(&self, image: &Path, sample: &TelemetrySample) -> Result<(), SkytagError>;
}

/// `exiftool`-backed geotag writer.
///
/// The executable location is explicit configuration, not an ambient
/// `PATH` lookup at call time, so runs are reproducible.
///
/// # Example
///
/// ```no_run
/// use skytag::ExifToolTagger;
///
/// let tagger = ExifToolTagger::new("exiftool");
/// tagger.verify()?;
/// # Ok::<(), skytag::SkytagError>(())
/// ```
pub struct ExifToolTagger {
    executable: PathBuf,
}

impl ExifToolTagger {
    /// Create a tagger invoking the given `exiftool` executable.
    pub fn new<P: Into<PathBuf>>(executable: P) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Check that the configured executable can be invoked.
    ///
    /// Runs `exiftool -ver` once; call this before a long pipeline run so a
    /// missing tool fails fast instead of on the first tagged frame.
    ///
    /// # Errors
    ///
    /// Returns [`SkytagError::MissingTool`] if the executable cannot be
    /// spawned or exits non-zero.
    pub fn verify(&self) -> Result<(), SkytagError> {
        let output = Command::new(&self.executable)
            .arg("-ver")
            .output()
            .map_err(|error| SkytagError::MissingTool {
                name: self.executable.display().to_string(),
                reason: error.to_string(),
            })?;

        if !output.status.success() {
            return Err(SkytagError::MissingTool {
                name: self.executable.display().to_string(),
                reason: format!("exited with {}", output.status),
            });
        }

        log::debug!(
            "exiftool {} available",
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }
}

impl GeotagWriter for ExifToolTagger {
    fn write_geotag(&self, image: &Path, sample: &TelemetrySample) -> Result<(), SkytagError> {
        let arguments = geotag_arguments(sample);
        log::debug!("Tagging {} with {} fields", image.display(), arguments.len());

        let output = Command::new(&self.executable)
            .arg("-m")
            .arg("-overwrite_original")
            .args(&arguments)
            .arg(image)
            .output()
            .map_err(|error| SkytagError::Tagging {
                path: image.to_path_buf(),
                reason: error.to_string(),
            })?;

        if !output.status.success() {
            return Err(SkytagError::Tagging {
                path: image.to_path_buf(),
                reason: format!(
                    "exiftool exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(())
    }
}

/// Build the exiftool tag arguments for one sample.
///
/// Separate from the subprocess invocation so argument construction is
/// testable without `exiftool` installed.
pub fn geotag_arguments(sample: &TelemetrySample) -> Vec<String> {
    let mut arguments = vec![
        format!("-GPSLatitude={}", sample.latitude),
        format!("-GPSLongitude={}", sample.longitude),
    ];

    if let Some(altitude) = sample.altitude {
        arguments.push(format!("-GPSAltitude={altitude}"));
    }

    let mut comment_fields: Vec<(&str, &str)> = Vec::new();
    for (key, value) in &sample.extra {
        if key == "DateTimeOriginal" {
            arguments.push(format!("-DateTimeOriginal={value}"));
        } else if let Some((_, tag)) = EXIF_TAG_MAP.iter().find(|(k, _)| *k == key.as_str()) {
            arguments.push(format!("-{tag}={value}"));
        } else {
            comment_fields.push((key.as_str(), value.as_str()));
        }
    }

    if !comment_fields.is_empty() {
        let comment = comment_fields
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(";");
        arguments.push(format!("-UserComment={comment}"));
    }

    arguments
}
