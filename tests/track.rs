//! Telemetry track construction and lookup tests.

use std::collections::BTreeMap;
use std::time::Duration;

use skytag::cue::SubtitleCue;
use skytag::{SkytagError, TelemetrySample, TelemetryTrack};

fn gps_cue(index: usize, start_s: u64, end_s: u64, latitude: f64, longitude: f64) -> SubtitleCue {
    SubtitleCue {
        index,
        start_time: Duration::from_secs(start_s),
        end_time: Duration::from_secs(end_s),
        text: format!("[latitude: {latitude}] [longitude: {longitude}]"),
    }
}

fn sample(start_s: f64, end_s: f64, latitude: f64) -> TelemetrySample {
    TelemetrySample {
        start_time: Duration::from_secs_f64(start_s),
        end_time: Duration::from_secs_f64(end_s),
        latitude,
        longitude: latitude,
        altitude: None,
        extra: BTreeMap::new(),
    }
}

#[test]
fn build_keeps_parseable_cues_and_drops_the_rest() {
    let cues = vec![
        gps_cue(0, 0, 1, 1.0, 1.0),
        SubtitleCue {
            index: 1,
            start_time: Duration::from_secs(1),
            end_time: Duration::from_secs(2),
            text: "no coordinates".to_string(),
        },
        gps_cue(2, 2, 3, 3.0, 3.0),
    ];

    let track = TelemetryTrack::build(&cues).expect("two cues survive");
    assert_eq!(track.len(), 2);
}

#[test]
fn build_fails_when_nothing_survives() {
    let cues = vec![SubtitleCue {
        index: 0,
        start_time: Duration::ZERO,
        end_time: Duration::from_secs(1),
        text: "[iso : 100]".to_string(),
    }];

    let error = TelemetryTrack::build(&cues).unwrap_err();
    assert!(matches!(error, SkytagError::EmptyTrack { .. }));
}

#[test]
fn from_samples_rejects_empty_input() {
    let error = TelemetryTrack::from_samples(Vec::new()).unwrap_err();
    assert!(matches!(error, SkytagError::EmptyTrack { .. }));
}

#[test]
fn build_reasserts_sample_order() {
    let cues = vec![
        gps_cue(0, 4, 5, 5.0, 5.0),
        gps_cue(1, 0, 1, 1.0, 1.0),
        gps_cue(2, 2, 3, 3.0, 3.0),
    ];

    let track = TelemetryTrack::build(&cues).unwrap();
    let starts: Vec<Duration> = track.samples().iter().map(|s| s.start_time).collect();
    assert_eq!(
        starts,
        [
            Duration::ZERO,
            Duration::from_secs(2),
            Duration::from_secs(4)
        ]
    );
}

#[test]
fn lookup_returns_covering_sample() {
    let track = TelemetryTrack::from_samples(vec![
        sample(0.0, 2.0, 1.0),
        sample(2.0, 5.0, 2.0),
    ])
    .unwrap();

    // Every queried instant inside coverage resolves to the unique
    // containing sample.
    for tenth in 0..20 {
        let t = Duration::from_millis(tenth * 100);
        assert_eq!(track.lookup(t).unwrap().latitude, 1.0, "at {t:?}");
    }
    for tenth in 20..50 {
        let t = Duration::from_millis(tenth * 100);
        assert_eq!(track.lookup(t).unwrap().latitude, 2.0, "at {t:?}");
    }
}

#[test]
fn lookup_boundaries_are_half_open() {
    let track = TelemetryTrack::from_samples(vec![
        sample(0.0, 2.0, 1.0),
        sample(2.0, 5.0, 2.0),
    ])
    .unwrap();

    // The boundary instant belongs to the later sample.
    assert_eq!(track.lookup(Duration::from_secs(2)).unwrap().latitude, 2.0);
    // End of coverage is exclusive.
    assert!(track.lookup(Duration::from_secs(5)).is_none());
}

#[test]
fn lookup_outside_coverage_is_none() {
    let track = TelemetryTrack::from_samples(vec![sample(1.0, 3.0, 1.0)]).unwrap();

    assert!(track.lookup(Duration::ZERO).is_none());
    assert!(track.lookup(Duration::from_millis(999)).is_none());
    assert!(track.lookup(Duration::from_secs(3)).is_none());
    assert!(track.lookup(Duration::from_secs(60)).is_none());
}

#[test]
fn lookup_inside_gap_is_none() {
    // Coverage 0–2 and 3–5 with an explicit hole in between.
    let track = TelemetryTrack::from_samples(vec![
        sample(0.0, 2.0, 1.0),
        sample(3.0, 5.0, 2.0),
    ])
    .unwrap();

    assert!(track.lookup(Duration::from_secs_f64(2.5)).is_none());
    assert_eq!(track.lookup(Duration::from_secs_f64(1.5)).unwrap().latitude, 1.0);
    assert_eq!(track.lookup(Duration::from_secs_f64(3.5)).unwrap().latitude, 2.0);
}

#[test]
fn overlap_swallowed_sample_is_dropped() {
    // The second sample lies entirely inside the first; under
    // earliest-start-wins it can never be observed.
    let track = TelemetryTrack::from_samples(vec![
        sample(0.0, 5.0, 1.0),
        sample(2.0, 4.0, 2.0),
    ])
    .unwrap();

    assert_eq!(track.len(), 1);
    assert_eq!(track.lookup(Duration::from_secs(3)).unwrap().latitude, 1.0);
}

#[test]
fn overlap_tail_is_clipped() {
    // The second sample extends past the first; only its uncovered tail
    // survives.
    let track = TelemetryTrack::from_samples(vec![
        sample(0.0, 5.0, 1.0),
        sample(2.0, 7.0, 2.0),
    ])
    .unwrap();

    assert_eq!(track.len(), 2);
    assert_eq!(track.lookup(Duration::from_secs(3)).unwrap().latitude, 1.0);
    assert_eq!(track.lookup(Duration::from_secs(6)).unwrap().latitude, 2.0);
    // The boundary sits exactly at the first sample's end.
    assert_eq!(track.lookup(Duration::from_secs(5)).unwrap().latitude, 2.0);
    assert_eq!(track.coverage(), (Duration::ZERO, Duration::from_secs(7)));
}

#[test]
fn lookup_is_deterministic_regardless_of_query_order() {
    let track = TelemetryTrack::from_samples(vec![
        sample(0.0, 5.0, 1.0),
        sample(2.0, 7.0, 2.0),
    ])
    .unwrap();

    let forward: Vec<Option<f64>> = (0..7)
        .map(|s| track.lookup(Duration::from_secs(s)).map(|x| x.latitude))
        .collect();
    let backward: Vec<Option<f64>> = (0..7)
        .rev()
        .map(|s| track.lookup(Duration::from_secs(s)).map(|x| x.latitude))
        .collect();

    let mut backward = backward;
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn coverage_spans_first_to_last() {
    let track = TelemetryTrack::from_samples(vec![
        sample(1.0, 2.0, 1.0),
        sample(4.0, 6.0, 2.0),
    ])
    .unwrap();
    assert_eq!(
        track.coverage(),
        (Duration::from_secs(1), Duration::from_secs(6))
    );
}
