//! Analysis configuration types
//!
//! Parameters for the analysis utilities. Both structs deserialize with
//! defaults for every missing field, so a partial TOML/JSON section is enough.

use crate::types::{GazeError, Result};
use serde::{Deserialize, Serialize};

/// Parameters for velocity-threshold microsaccade detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrosaccadeConfig {
    /// Threshold multiplier applied to the median-based velocity spread
    #[serde(default = "default_lambda")]
    pub lambda: f64,

    /// Minimum number of consecutive supra-threshold samples
    #[serde(default = "default_min_duration")]
    pub min_duration_samples: usize,

    /// Sampling rate in Hz; estimated from the sample stream when absent
    #[serde(default)]
    pub sampling_rate_hz: Option<f64>,
}

fn default_lambda() -> f64 {
    6.0
}

fn default_min_duration() -> usize {
    3
}

impl Default for MicrosaccadeConfig {
    fn default() -> Self {
        Self {
            lambda: default_lambda(),
            min_duration_samples: default_min_duration(),
            sampling_rate_hz: None,
        }
    }
}

impl MicrosaccadeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the threshold multiplier
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Builder method: set the minimum run length in samples
    pub fn with_min_duration(mut self, samples: usize) -> Self {
        self.min_duration_samples = samples;
        self
    }

    /// Builder method: fix the sampling rate instead of estimating it
    pub fn with_sampling_rate(mut self, hz: f64) -> Self {
        self.sampling_rate_hz = Some(hz);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(GazeError::InvalidArgument(format!(
                "Microsaccade lambda must be positive: {}",
                self.lambda
            )));
        }
        if self.min_duration_samples == 0 {
            return Err(GazeError::InvalidArgument(
                "Microsaccade minimum duration must be at least one sample".to_string(),
            ));
        }
        if let Some(hz) = self.sampling_rate_hz {
            validate_rate(hz)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_rate(hz: f64) -> Result<()> {
    if hz.is_finite() && hz > 0.0 {
        Ok(())
    } else {
        Err(GazeError::InvalidArgument(format!(
            "Sampling rate must be positive: {}",
            hz
        )))
    }
}

/// Parameters for saccade curvature metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvatureConfig {
    /// Trajectory sample used to measure the initial direction
    #[serde(default = "default_initial_sample")]
    pub initial_sample: usize,
}

fn default_initial_sample() -> usize {
    2
}

impl Default for CurvatureConfig {
    fn default() -> Self {
        Self {
            initial_sample: default_initial_sample(),
        }
    }
}

impl CurvatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the sample offset for the initial direction
    pub fn with_initial_sample(mut self, sample: usize) -> Self {
        self.initial_sample = sample;
        self
    }
}
