//! Saccade trajectory curvature
//!
//! All measures are taken relative to the chord from the first to the last
//! trajectory sample. Deviations are signed: positive values lie to the left
//! of the chord direction.

use crate::config::CurvatureConfig;
use crate::types::Point;
use serde::Serialize;

/// Chord shorter than this is treated as a point
const MIN_CHORD_LENGTH: f64 = 1e-10;

/// Curvature measures of one trajectory
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CurvatureMetrics {
    /// Largest perpendicular distance from the chord (signed)
    pub max_deviation: f64,
    /// `max_deviation` divided by the chord length
    pub relative_max_deviation: f64,
    /// Area enclosed between the path and the chord, same sign as the deviation side
    pub area: f64,
    /// Angle between the chord and the initial movement direction, in radians
    pub initial_angle: f64,
}

fn cross(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

fn dot(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

fn offset(from: &Point, to: &Point) -> (f64, f64) {
    (to.x - from.x, to.y - from.y)
}

/// Compute curvature measures; degenerate trajectories yield all zeros
pub fn curvature(trajectory: &[Point], config: &CurvatureConfig) -> CurvatureMetrics {
    let (start, end) = match (trajectory.first(), trajectory.last()) {
        (Some(s), Some(e)) if trajectory.len() >= 2 => (s, e),
        _ => return CurvatureMetrics::default(),
    };

    let chord = offset(start, end);
    let chord_length = start.distance_to(end);
    if chord_length < MIN_CHORD_LENGTH {
        return CurvatureMetrics::default();
    }

    let max_deviation = trajectory
        .iter()
        .map(|p| cross(chord, offset(start, p)) / chord_length)
        .fold(0.0_f64, |best, d| if d.abs() > best.abs() { d } else { best });

    // Shoelace over the closed polygon path + chord, negated so that a
    // left-side bulge is positive
    let shoelace: f64 = trajectory
        .iter()
        .zip(trajectory.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    let area = -shoelace / 2.0;

    let k = config.initial_sample.min(trajectory.len() - 1);
    let initial = offset(start, &trajectory[k]);
    let initial_angle = if initial == (0.0, 0.0) {
        0.0
    } else {
        cross(chord, initial).atan2(dot(chord, initial))
    };

    CurvatureMetrics {
        max_deviation,
        relative_max_deviation: max_deviation / chord_length,
        area,
        initial_angle,
    }
}
