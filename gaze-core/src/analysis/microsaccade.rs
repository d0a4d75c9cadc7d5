//! Microsaccade detection
//!
//! Velocity-threshold detection over a fixation trajectory:
//! 1. Velocity from a 5-sample moving window
//!    `v[n] = (x[n+2] + x[n+1] - x[n-1] - x[n-2]) * rate / 6`
//! 2. Per-axis spread `σ = sqrt(median(v²) - median(v)²)`
//! 3. Samples with `(vx/λσx)² + (vy/λσy)² > 1` are candidates
//! 4. Runs of at least `min_duration_samples` consecutive candidates are
//!    reported as microsaccades

use crate::config::{validate_rate, MicrosaccadeConfig};
use crate::recording::median_of_sorted;
use crate::types::{Point, Result};
use serde::Serialize;

/// A detected microsaccade; indices refer to the input trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Microsaccade {
    /// First supra-threshold sample
    pub onset: usize,
    /// Last supra-threshold sample
    pub offset: usize,
    /// Peak velocity in position units per second
    pub peak_velocity: f64,
    /// Distance between the onset and offset positions
    pub amplitude: f64,
}

impl Microsaccade {
    pub fn duration_samples(&self) -> usize {
        self.offset - self.onset + 1
    }
}

#[derive(Debug, Clone, Copy)]
struct Velocity {
    index: usize,
    vx: f64,
    vy: f64,
}

fn velocities(trajectory: &[Point], rate: f64) -> Vec<Velocity> {
    (2..trajectory.len() - 2)
        .map(|n| {
            let t = trajectory;
            Velocity {
                index: n,
                vx: (t[n + 2].x + t[n + 1].x - t[n - 1].x - t[n - 2].x) * rate / 6.0,
                vy: (t[n + 2].y + t[n + 1].y - t[n - 1].y - t[n - 2].y) * rate / 6.0,
            }
        })
        .collect()
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    median_of_sorted(&values)
}

// Median-based velocity spread, floored so a perfectly still trace still yields a threshold
fn threshold(component: impl Iterator<Item = f64> + Clone, lambda: f64) -> f64 {
    let med = median(component.clone().collect());
    let med_sq = median(component.map(|v| v * v).collect());
    let sigma = (med_sq - med * med).max(0.0).sqrt();
    (lambda * sigma).max(f64::EPSILON)
}

/// Detect microsaccades in a trajectory sampled at `sampling_rate_hz`
///
/// Trajectories shorter than five samples have no velocity estimate and
/// yield no detections.
pub fn detect_microsaccades(
    trajectory: &[Point],
    sampling_rate_hz: f64,
    config: &MicrosaccadeConfig,
) -> Result<Vec<Microsaccade>> {
    config.validate()?;
    validate_rate(sampling_rate_hz)?;

    if trajectory.len() < 5 {
        return Ok(Vec::new());
    }

    let vel = velocities(trajectory, sampling_rate_hz);
    let eta_x = threshold(vel.iter().map(|v| v.vx), config.lambda);
    let eta_y = threshold(vel.iter().map(|v| v.vy), config.lambda);

    let is_candidate =
        |v: &Velocity| (v.vx / eta_x).powi(2) + (v.vy / eta_y).powi(2) > 1.0;

    let mut detected = Vec::new();
    let mut run: Vec<&Velocity> = Vec::new();

    // Trailing sentinel flushes a run that reaches the end of the trace
    for v in vel.iter().map(Some).chain(std::iter::once(None)) {
        match v {
            Some(v) if is_candidate(v) => run.push(v),
            _ => {
                if run.len() >= config.min_duration_samples {
                    detected.push(summarize(trajectory, &run));
                }
                run.clear();
            }
        }
    }

    log::debug!(
        "Detected {} microsaccades in {} samples (eta = {:.3}, {:.3})",
        detected.len(),
        trajectory.len(),
        eta_x,
        eta_y
    );
    Ok(detected)
}

fn summarize(trajectory: &[Point], run: &[&Velocity]) -> Microsaccade {
    let onset = run[0].index;
    let offset = run[run.len() - 1].index;
    let peak_velocity = run
        .iter()
        .map(|v| v.vx.hypot(v.vy))
        .fold(0.0, f64::max);

    Microsaccade {
        onset,
        offset,
        peak_velocity,
        amplitude: trajectory[onset].distance_to(&trajectory[offset]),
    }
}
