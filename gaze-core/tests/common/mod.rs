//! Shared reference recording for the integration tests
//!
//! Twelve seconds of a three-trial session sampled at 500 Hz. Stimulus
//! messages mention their screen location; fixations alternate between a
//! central area around (800, 500), a corner at (200, 200) and a few that drift
//! out of the central area.

#![allow(dead_code)]

use gaze_core::{FixationEvent, MessageEvent, Point, Recording, SaccadeEvent, SampleStream};

pub const SAMPLE_INTERVAL_MS: f64 = 2.0;
pub const SESSION_END_MS: f64 = 11200.0;

pub const MESSAGES: &[(f64, &str)] = &[
    (0.0, "RECORDING_START"),
    (110.015, "TRIALID 1"),
    (1110.0, "fixation_cross"),
    (2110.015, "刺激の場所は 860 520"),
    (3109.0, "response"),
    (4110.0, "TRIALID 2"),
    (5110.0, "fixation_cross"),
    (6109.8, "刺激の場所は 420 520"),
    (7110.0, "TRIALID 3"),
    (8109.729, "刺激の場所は 860 300"),
    (9110.0, "response"),
    (10109.73, "刺激の場所は 860 700"),
    (11110.0, "RECORDING_END"),
];

#[derive(Clone, Copy)]
enum Placement {
    Central,
    Corner,
    Drifting,
}

const FIXATIONS: &[(f64, Placement)] = &[
    (0.0, Placement::Central),
    (87.551, Placement::Central),
    (1000.0, Placement::Corner),
    (1800.0, Placement::Corner),
    (2455.376, Placement::Central),
    (3000.0, Placement::Central),
    (3600.0, Placement::Central),
    (4200.0, Placement::Central),
    (4800.0, Placement::Central),
    (5000.0, Placement::Central),
    (5300.0, Placement::Drifting),
    (5600.0, Placement::Central),
    (6200.0, Placement::Central),
    (6800.0, Placement::Central),
    (7400.0, Placement::Central),
    (8000.0, Placement::Central),
    (8600.0, Placement::Central),
    (9200.0, Placement::Central),
    (9500.0, Placement::Drifting),
    (9800.0, Placement::Central),
    (10400.0, Placement::Central),
    (11000.0, Placement::Central),
];

/// Start times of the fixations that stay inside circle (800, 500, 200)
pub const CENTRAL_FIXATION_STARTS: &[f64] = &[
    0.0, 87.551, 2455.376, 3000.0, 3600.0, 4200.0, 4800.0, 5000.0, 5600.0, 6200.0, 6800.0,
    7400.0, 8000.0, 8600.0, 9200.0, 9800.0, 10400.0, 11000.0,
];

fn fixation_trajectory(index: usize, placement: Placement) -> Vec<Point> {
    let jitter = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (-10.0, 0.0), (0.0, -10.0)];
    match placement {
        Placement::Central => {
            let cx = 800.0 + ((index * 37) % 100) as f64 - 50.0;
            let cy = 500.0 + ((index * 53) % 100) as f64 - 50.0;
            jitter.iter().map(|(dx, dy)| Point::new(cx + dx, cy + dy)).collect()
        }
        Placement::Corner => jitter
            .iter()
            .map(|(dx, dy)| Point::new(200.0 + dx, 200.0 + dy))
            .collect(),
        Placement::Drifting => vec![
            Point::new(800.0, 500.0),
            Point::new(900.0, 500.0),
            Point::new(1050.0, 500.0),
        ],
    }
}

/// Route library logs to the test harness; safe to call repeatedly
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn reference_recording() -> Recording {
    init_logging();
    let n_samples = (SESSION_END_MS / SAMPLE_INTERVAL_MS) as usize + 1;
    let times: Vec<f64> = (0..n_samples).map(|i| i as f64 * SAMPLE_INTERVAL_MS).collect();

    let mut builder = Recording::builder()
        .with_label("reference")
        .with_samples(SampleStream::from_times(times).unwrap());

    for (time, text) in MESSAGES {
        builder = builder.add_message(MessageEvent::new(*time, *text));
    }

    for (i, (start, placement)) in FIXATIONS.iter().enumerate() {
        let next_start = FIXATIONS.get(i + 1).map(|(s, _)| *s);
        let end = match next_start {
            Some(next) => start + (next - start - 40.0).min(150.0),
            None => start + 150.0,
        };
        let fixation = FixationEvent::new(*start, end, fixation_trajectory(i, *placement)).unwrap();

        if let Some(next) = FIXATIONS.get(i + 1) {
            let from = fixation.center;
            let to = FixationEvent::new(0.0, 0.0, fixation_trajectory(i + 1, next.1))
                .unwrap()
                .center;
            let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0 + 15.0);
            let saccade = SaccadeEvent::new(end, end + 30.0, vec![from, mid, to]).unwrap();
            builder = builder.add_saccade(saccade);
        }
        builder = builder.add_fixation(fixation);
    }

    builder.build().unwrap()
}
