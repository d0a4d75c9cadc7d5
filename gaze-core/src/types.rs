//! Core types for the gaze event library
//!
//! This module defines the fundamental value types shared by every other module:
//! 2D points, trajectory helpers, the recording time unit and the error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result type for gaze operations
pub type Result<T> = std::result::Result<T, GazeError>;

/// Errors that can occur while building, loading or querying recordings
#[derive(Debug, thiserror::Error)]
pub enum GazeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to load data file: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A gaze position on screen (pixels or degrees, depending on the tracker setup)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The point as a `[x, y]` row
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Sum of segment lengths along a trajectory
pub fn path_length(trajectory: &[Point]) -> f64 {
    trajectory
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

/// Arithmetic mean of the trajectory points, `None` for an empty trajectory
pub fn centroid(trajectory: &[Point]) -> Option<Point> {
    if trajectory.is_empty() {
        return None;
    }
    let n = trajectory.len() as f64;
    let (sx, sy) = trajectory
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Unit of every timestamp in a recording
///
/// The unit is a recording-level constant: all events and samples of one
/// recording share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Number of timestamp units in one second
    pub fn per_second(&self) -> f64 {
        match self {
            TimeUnit::Milliseconds => 1000.0,
            TimeUnit::Seconds => 1.0,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Milliseconds => write!(f, "ms"),
            TimeUnit::Seconds => write!(f, "s"),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = GazeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ms" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "s" | "seconds" => Ok(TimeUnit::Seconds),
            other => Err(GazeError::InvalidArgument(format!(
                "Unknown time unit: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
    }

    #[test]
    fn test_path_length_and_centroid() {
        let traj = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 0.0),
        ];
        assert_eq!(path_length(&traj), 9.0);
        assert_eq!(path_length(&traj[..1]), 0.0);

        let c = centroid(&traj).unwrap();
        assert_eq!(c, Point::new(2.0, 4.0 / 3.0));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_time_unit_parsing() {
        assert_eq!("ms".parse::<TimeUnit>().unwrap(), TimeUnit::Milliseconds);
        assert_eq!("Seconds".parse::<TimeUnit>().unwrap(), TimeUnit::Seconds);
        assert!("minutes".parse::<TimeUnit>().is_err());
        assert_eq!(TimeUnit::Milliseconds.per_second(), 1000.0);
    }
}
