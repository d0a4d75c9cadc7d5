//! Analysis utilities built on top of the event model
//!
//! Curvature of saccade trajectories and microsaccade detection inside
//! fixations.

pub mod curvature;
pub mod microsaccade;

pub use curvature::{curvature, CurvatureMetrics};
pub use microsaccade::{detect_microsaccades, Microsaccade};

use crate::config::{CurvatureConfig, MicrosaccadeConfig};
use crate::recording::Recording;
use crate::types::{GazeError, Result};

impl Recording {
    /// Curvature measures for every saccade, in `sac` order
    pub fn saccade_curvature(&self, config: &CurvatureConfig) -> Vec<CurvatureMetrics> {
        self.sac()
            .iter()
            .map(|s| curvature(&s.trajectory, config))
            .collect()
    }

    /// Microsaccades inside the trajectory of one fixation
    ///
    /// Uses the configured sampling rate, or the rate estimated from the
    /// sample stream when none is configured.
    pub fn microsaccades(&self, fixation_index: usize, config: &MicrosaccadeConfig) -> Result<Vec<Microsaccade>> {
        let fixation = self.fix().get(fixation_index).ok_or_else(|| {
            GazeError::InvalidArgument(format!(
                "Fixation index {} out of range ({} fixations)",
                fixation_index,
                self.n_fix()
            ))
        })?;

        let rate = match config.sampling_rate_hz {
            Some(hz) => hz,
            None => self.sampling_rate().ok_or_else(|| {
                GazeError::InvalidArgument(
                    "Sampling rate is not configured and cannot be estimated".to_string(),
                )
            })?,
        };

        detect_microsaccades(&fixation.trajectory, rate, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{FixationEvent, SaccadeEvent};
    use crate::recording::SampleStream;
    use crate::types::Point;

    fn recording() -> Recording {
        let trajectory: Vec<Point> = (0..40)
            .map(|n| Point::new(if n >= 20 { 1.0 } else { 0.0 }, 0.0))
            .collect();
        let times: Vec<f64> = (0..200).map(|i| i as f64).collect();

        Recording::builder()
            .with_samples(SampleStream::from_times(times).unwrap())
            .add_fixation(FixationEvent::new(0.0, 40.0, trajectory).unwrap())
            .add_saccade(
                SaccadeEvent::new(
                    40.0,
                    50.0,
                    vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)],
                )
                .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_microsaccades_use_estimated_rate() {
        let rec = recording();
        let found = rec.microsaccades(0, &MicrosaccadeConfig::default()).unwrap();
        assert_eq!(found.len(), 1);
        // 1 ms samples -> 1000 Hz; peak window sum is 2
        assert_eq!(found[0].peak_velocity, 2.0 * 1000.0 / 6.0);
    }

    #[test]
    fn test_microsaccades_bad_index() {
        let rec = recording();
        assert!(rec.microsaccades(3, &MicrosaccadeConfig::default()).is_err());
    }

    #[test]
    fn test_microsaccades_without_rate() {
        let rec = Recording::builder()
            .add_fixation(FixationEvent::new(0.0, 10.0, vec![Point::new(0.0, 0.0); 10]).unwrap())
            .build()
            .unwrap();
        assert!(rec.microsaccades(0, &MicrosaccadeConfig::default()).is_err());
        let fixed = MicrosaccadeConfig::new().with_sampling_rate(250.0);
        assert!(rec.microsaccades(0, &fixed).unwrap().is_empty());
    }

    #[test]
    fn test_saccade_curvature_per_saccade() {
        let rec = recording();
        let metrics = rec.saccade_curvature(&CurvatureConfig::default());
        assert_eq!(metrics.len(), rec.n_sac());
        assert_eq!(metrics[0].max_deviation, 1.0);
    }
}
