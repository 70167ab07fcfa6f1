//! Alignment engine tests.

use std::collections::BTreeMap;
use std::time::Duration;

use skytag::{FrameSchedule, TelemetrySample, TelemetryTrack, align, align_all};

fn sample(start_s: u64, end_s: u64, latitude: f64, longitude: f64) -> TelemetrySample {
    TelemetrySample {
        start_time: Duration::from_secs(start_s),
        end_time: Duration::from_secs(end_s),
        latitude,
        longitude,
        altitude: None,
        extra: BTreeMap::new(),
    }
}

fn two_window_track() -> TelemetryTrack {
    TelemetryTrack::from_samples(vec![
        sample(0, 2, 1.0, 1.0),
        sample(2, 5, 2.0, 2.0),
    ])
    .unwrap()
}

#[test]
fn aligns_each_request_to_its_covering_window() {
    let track = two_window_track();
    let schedule = FrameSchedule::new(Duration::from_secs(5), None, None, 1.0).unwrap();

    let frames = align_all(schedule, &track);
    assert_eq!(frames.len(), 5);

    // Frames at 0 s and 1 s fall in the first window, 2–4 s in the second.
    for frame in &frames[..2] {
        assert_eq!(frame.sample.unwrap().latitude, 1.0);
        assert_eq!(frame.sample.unwrap().longitude, 1.0);
    }
    for frame in &frames[2..] {
        assert_eq!(frame.sample.unwrap().latitude, 2.0);
        assert_eq!(frame.sample.unwrap().longitude, 2.0);
    }
}

#[test]
fn gap_surfaces_as_absent_sample() {
    // Same shape but with the 2–3 s window removed.
    let track = TelemetryTrack::from_samples(vec![
        sample(0, 2, 1.0, 1.0),
        sample(3, 5, 2.0, 2.0),
    ])
    .unwrap();

    let schedule = FrameSchedule::new(
        Duration::from_secs(5),
        Some(Duration::from_secs_f64(2.5)),
        Some(Duration::from_secs_f64(3.5)),
        1.0,
    )
    .unwrap();

    let frames = align_all(schedule, &track);
    assert_eq!(frames.len(), 1);
    assert!(frames[0].sample.is_none(), "2.5 s lies in the gap");
}

#[test]
fn gap_does_not_disturb_surrounding_frames() {
    let track = TelemetryTrack::from_samples(vec![
        sample(0, 2, 1.0, 1.0),
        sample(3, 5, 2.0, 2.0),
    ])
    .unwrap();
    let schedule = FrameSchedule::new(Duration::from_secs(5), None, None, 2.0).unwrap();

    let frames = align_all(schedule, &track);
    assert_eq!(frames.len(), 10);

    let tagged: Vec<bool> = frames.iter().map(|f| f.sample.is_some()).collect();
    // 0.0–1.5 s covered, 2.0 and 2.5 s in the gap, 3.0–4.5 s covered.
    assert_eq!(
        tagged,
        [true, true, true, true, false, false, true, true, true, true]
    );
}

#[test]
fn output_is_one_to_one_with_input() {
    let track = two_window_track();
    let schedule = FrameSchedule::new(Duration::from_secs(5), None, None, 24.0).unwrap();
    let expected = schedule.planned_frames();

    let frames = align_all(schedule, &track);
    assert_eq!(frames.len() as u64, expected, "no drops, no duplicates");

    for (position, frame) in frames.iter().enumerate() {
        assert_eq!(frame.request.index, position as u64);
    }
}

#[test]
fn alignment_is_idempotent() {
    let track = two_window_track();

    let first: Vec<_> = align_all(
        FrameSchedule::new(Duration::from_secs(5), None, None, 3.0).unwrap(),
        &track,
    )
    .iter()
    .map(|f| (f.request, f.sample.cloned()))
    .collect();

    let second: Vec<_> = align_all(
        FrameSchedule::new(Duration::from_secs(5), None, None, 3.0).unwrap(),
        &track,
    )
    .iter()
    .map(|f| (f.request, f.sample.cloned()))
    .collect();

    assert_eq!(first, second);
}

#[test]
fn alignment_is_lazy_and_exact_size() {
    let track = two_window_track();
    let schedule = FrameSchedule::new(Duration::from_secs(5), None, None, 2.0).unwrap();

    let mut aligned = align(schedule, &track);
    assert_eq!(aligned.len(), 10);

    let first = aligned.next().unwrap();
    assert_eq!(first.request.index, 0);
    assert_eq!(first.request.elapsed_time, Duration::ZERO);
    assert_eq!(aligned.len(), 9);
}

#[test]
fn requests_before_and_after_coverage_are_untagged() {
    let track = TelemetryTrack::from_samples(vec![sample(2, 4, 1.0, 1.0)]).unwrap();
    let schedule = FrameSchedule::new(Duration::from_secs(6), None, None, 1.0).unwrap();

    let tagged: Vec<bool> = align(schedule, &track).map(|f| f.sample.is_some()).collect();
    assert_eq!(tagged, [false, false, true, true, false, false]);
}
