//! Pipeline coordinator tests.
//!
//! The FFmpeg and exiftool collaborators are replaced with fakes; subtitle
//! parsing runs the real `SrtFile` implementation against files written to
//! a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use skytag::{
    ClipInfo, Coordinator, FrameExtractor, GeotagWriter, JpegQuality, MediaInspector,
    PipelineOptions, SkytagError, SrtFile, TelemetrySample, discover_pairs,
};
use tempfile::TempDir;

struct FixedInspector {
    clip: ClipInfo,
}

impl MediaInspector for FixedInspector {
    fn probe(&self, _path: &Path) -> Result<ClipInfo, SkytagError> {
        Ok(self.clip)
    }
}

struct FakeExtractor {
    fail_at: Option<Duration>,
}

impl FakeExtractor {
    fn reliable() -> Self {
        Self { fail_at: None }
    }
}

impl FrameExtractor for FakeExtractor {
    fn extract(
        &mut self,
        _video: &Path,
        elapsed: Duration,
        _quality: JpegQuality,
    ) -> Result<Vec<u8>, SkytagError> {
        if self.fail_at == Some(elapsed) {
            return Err(SkytagError::FfmpegError("injected decode failure".to_string()));
        }
        // A JPEG marker pair is plenty for the pipeline, which treats the
        // bytes as opaque.
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

#[derive(Clone)]
struct TagCall {
    image: PathBuf,
    latitude: f64,
}

#[derive(Clone, Default)]
struct RecordingTagger {
    calls: Arc<Mutex<Vec<TagCall>>>,
    fail_on_call: Option<usize>,
}

impl GeotagWriter for RecordingTagger {
    fn write_geotag(&self, image: &Path, sample: &TelemetrySample) -> Result<(), SkytagError> {
        let mut calls = self.calls.lock().unwrap();
        if self.fail_on_call == Some(calls.len()) {
            return Err(SkytagError::Tagging {
                path: image.to_path_buf(),
                reason: "injected tagging failure".to_string(),
            });
        }
        calls.push(TagCall {
            image: image.to_path_buf(),
            latitude: sample.latitude,
        });
        Ok(())
    }
}

fn srt_cue(number: usize, start_s: u64, end_s: u64, latitude: f64, longitude: f64) -> String {
    format!(
        "{number}\n00:00:0{start_s},000 --> 00:00:0{end_s},000\n[latitude: {latitude}] [longitude: {longitude}] [rel_alt: 10.0 abs_alt: 50.0]\n\n"
    )
}

/// Telemetry windows [0, 2) and [2, 5).
fn covering_srt() -> String {
    srt_cue(1, 0, 2, 1.0, 1.0) + &srt_cue(2, 2, 5, 2.0, 2.0)
}

/// Telemetry windows [0, 2) and [3, 5) with a one-second hole.
fn gapped_srt() -> String {
    srt_cue(1, 0, 2, 1.0, 1.0) + &srt_cue(2, 3, 5, 2.0, 2.0)
}

fn write_pair(dir: &Path, stem: &str, srt: &str) {
    fs::write(dir.join(format!("{stem}.mp4")), b"not a real video").unwrap();
    fs::write(dir.join(format!("{stem}.srt")), srt).unwrap();
}

fn five_second_clip() -> ClipInfo {
    ClipInfo {
        duration: Duration::from_secs(5),
        frame_rate: 30.0,
    }
}

fn coordinator_with(
    tagger: RecordingTagger,
    extractor: FakeExtractor,
    options: PipelineOptions,
) -> Coordinator {
    Coordinator::new(
        Box::new(FixedInspector {
            clip: five_second_clip(),
        }),
        Box::new(SrtFile::new()),
        Box::new(extractor),
        Box::new(tagger),
        options,
    )
}

#[test]
fn full_run_writes_and_tags_every_frame() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pair(input.path(), "flight", &covering_srt());

    let tagger = RecordingTagger::default();
    let calls = tagger.calls.clone();
    let options = PipelineOptions::new().with_sample_rate(1.0);
    let mut coordinator = coordinator_with(tagger, FakeExtractor::reliable(), options);

    let report = coordinator.run(input.path(), output.path()).unwrap();

    assert_eq!(report.failures.len(), 0);
    assert_eq!(report.pairs.len(), 1);
    let pair = &report.pairs[0];
    assert_eq!(pair.planned, 5);
    assert_eq!(pair.written, 5);
    assert_eq!(pair.tagged, 5);
    assert_eq!(pair.untagged, 0);
    assert_eq!(pair.failed, 0);

    for index in 0..5 {
        let frame = output.path().join("flight").join(format!("frame_{index:06}.jpg"));
        assert!(frame.exists(), "missing {}", frame.display());
    }

    // Frames at 0 s and 1 s fall in the first window, the rest in the
    // second.
    let calls = calls.lock().unwrap();
    let latitudes: Vec<f64> = calls.iter().map(|c| c.latitude).collect();
    assert_eq!(latitudes, [1.0, 1.0, 2.0, 2.0, 2.0]);
    assert!(calls[0].image.ends_with("flight/frame_000000.jpg"));
}

#[test]
fn gap_frames_are_written_but_untagged() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pair(input.path(), "flight", &gapped_srt());

    let tagger = RecordingTagger::default();
    let options = PipelineOptions::new().with_sample_rate(1.0);
    let mut coordinator = coordinator_with(tagger, FakeExtractor::reliable(), options);

    let report = coordinator.run(input.path(), output.path()).unwrap();
    let pair = &report.pairs[0];

    // The request at 2 s falls into the hole.
    assert_eq!(pair.written, 5);
    assert_eq!(pair.tagged, 4);
    assert_eq!(pair.untagged, 1);
    assert!(
        output
            .path()
            .join("flight")
            .join("frame_000002.jpg")
            .exists(),
        "untagged frames are still extracted"
    );
}

#[test]
fn extraction_failure_skips_only_that_frame() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pair(input.path(), "flight", &covering_srt());

    let tagger = RecordingTagger::default();
    let extractor = FakeExtractor {
        fail_at: Some(Duration::from_secs(1)),
    };
    let options = PipelineOptions::new().with_sample_rate(1.0);
    let mut coordinator = coordinator_with(tagger, extractor, options);

    let report = coordinator.run(input.path(), output.path()).unwrap();
    let pair = &report.pairs[0];

    assert_eq!(pair.written, 4);
    assert_eq!(pair.failed, 1);
    assert_eq!(pair.tagged, 4);
    assert!(!output.path().join("flight").join("frame_000001.jpg").exists());
    assert!(output.path().join("flight").join("frame_000002.jpg").exists());
}

#[test]
fn tagging_failure_leaves_frame_on_disk() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pair(input.path(), "flight", &covering_srt());

    let tagger = RecordingTagger {
        fail_on_call: Some(1),
        ..RecordingTagger::default()
    };
    let calls = tagger.calls.clone();
    let options = PipelineOptions::new().with_sample_rate(1.0);
    let mut coordinator = coordinator_with(tagger, FakeExtractor::reliable(), options);

    let report = coordinator.run(input.path(), output.path()).unwrap();
    let pair = &report.pairs[0];

    assert_eq!(pair.written, 5);
    assert_eq!(pair.tagged, 4);
    assert_eq!(pair.failed, 1);
    assert!(output.path().join("flight").join("frame_000001.jpg").exists());
    assert_eq!(calls.lock().unwrap().len(), 4);
}

#[test]
fn empty_track_abandons_pair_and_continues() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    // "bad" has cues but none with GPS; "good" is complete.
    write_pair(
        input.path(),
        "bad",
        "1\n00:00:00,000 --> 00:00:01,000\n[iso : 100] nothing else\n",
    );
    write_pair(input.path(), "good", &covering_srt());

    let tagger = RecordingTagger::default();
    let options = PipelineOptions::new().with_sample_rate(1.0);
    let mut coordinator = coordinator_with(tagger, FakeExtractor::reliable(), options);

    let report = coordinator.run(input.path(), output.path()).unwrap();

    assert_eq!(report.pairs.len(), 1);
    assert_eq!(report.pairs[0].stem, "good");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stem, "bad");
    assert!(report.failures[0].error.contains("telemetry"));
}

#[test]
fn inverted_range_abandons_pair() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pair(input.path(), "flight", &covering_srt());

    let tagger = RecordingTagger::default();
    let options = PipelineOptions::new()
        .with_sample_rate(1.0)
        .with_start(Duration::from_secs(3))
        .with_end(Duration::from_secs(1));
    let mut coordinator = coordinator_with(tagger, FakeExtractor::reliable(), options);

    let report = coordinator.run(input.path(), output.path()).unwrap();

    assert!(report.pairs.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("Invalid range"));
}

#[test]
fn discovery_requires_sidecar_and_ignores_extension_case() {
    let input = TempDir::new().unwrap();
    fs::write(input.path().join("Alpha.MP4"), b"video").unwrap();
    fs::write(input.path().join("Alpha.srt"), "srt").unwrap();
    fs::write(input.path().join("bravo.mov"), b"video").unwrap();
    fs::write(input.path().join("bravo.srt"), "srt").unwrap();
    fs::write(input.path().join("orphan.mp4"), b"video").unwrap();
    fs::write(input.path().join("notes.txt"), b"text").unwrap();
    fs::write(input.path().join("stray.srt"), "srt").unwrap();

    let pairs = discover_pairs(input.path()).unwrap();

    let stems: Vec<&str> = pairs.iter().map(|pair| pair.stem.as_str()).collect();
    assert_eq!(stems, ["Alpha", "bravo"]);
    assert!(pairs[0].video.ends_with("Alpha.MP4"));
    assert!(pairs[0].subtitle.ends_with("Alpha.srt"));
}

#[test]
fn run_with_no_pairs_reports_nothing() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let tagger = RecordingTagger::default();
    let mut coordinator =
        coordinator_with(tagger, FakeExtractor::reliable(), PipelineOptions::new());

    let report = coordinator.run(input.path(), output.path()).unwrap();
    assert!(report.pairs.is_empty());
    assert!(report.failures.is_empty());
}
