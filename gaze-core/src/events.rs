//! Gaze event types
//!
//! Saccades, fixations and messages are the three kinds of events reconstructed
//! from a sample stream. They share the [`GazeEvent`] contract (a start time and
//! a kind); traversal across kinds is provided by [`crate::chain`].

use crate::types::{centroid, path_length, GazeError, Point, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative slack allowed between a stored saccade length and its trajectory
const LENGTH_TOLERANCE: f64 = 1e-9;

/// Capabilities common to every event kind
pub trait GazeEvent {
    /// Temporal key used to order this event in the recording
    fn start_time(&self) -> f64;

    fn kind(&self) -> EventKind;

    /// Start time relative to `reference`; negative when the event precedes it
    fn relative_start_time(&self, reference: f64) -> f64 {
        self.start_time() - reference
    }
}

/// Kind of a gaze event
///
/// The declaration order is also the tie-break order when two events of
/// different kinds share the same temporal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    Saccade,
    Fixation,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Message => write!(f, "message"),
            EventKind::Saccade => write!(f, "saccade"),
            EventKind::Fixation => write!(f, "fixation"),
        }
    }
}

impl FromStr for EventKind {
    type Err = GazeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "message" | "msg" => Ok(EventKind::Message),
            "saccade" | "sac" => Ok(EventKind::Saccade),
            "fixation" | "fix" => Ok(EventKind::Fixation),
            other => Err(GazeError::InvalidArgument(format!(
                "Unknown event type: {}",
                other
            ))),
        }
    }
}

/// An experimenter-inserted annotation in the recording stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Instant the message was recorded
    pub time: f64,
    /// Message payload, may contain any UTF-8 text
    pub text: String,
}

impl MessageEvent {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

impl GazeEvent for MessageEvent {
    fn start_time(&self) -> f64 {
        self.time
    }

    fn kind(&self) -> EventKind {
        EventKind::Message
    }
}

/// A rapid eye movement between two fixations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaccadeEvent {
    pub start_time: f64,
    pub end_time: f64,
    /// First trajectory sample
    pub start: Point,
    /// Last trajectory sample
    pub end: Point,
    /// Saccade size; the start→end distance unless the tracker reported a visual angle
    pub amplitude: f64,
    /// Path length of the trajectory
    pub length: f64,
    /// Gaze samples from start to end inclusive
    pub trajectory: Vec<Point>,
}

impl SaccadeEvent {
    /// Build a saccade from its trajectory
    ///
    /// `start`, `end`, `amplitude` and `length` are derived from the trajectory.
    pub fn new(start_time: f64, end_time: f64, trajectory: Vec<Point>) -> Result<Self> {
        validate_span("Saccade", start_time, end_time)?;
        let (start, end) = validate_trajectory("Saccade", start_time, &trajectory)?;

        Ok(Self {
            start_time,
            end_time,
            start,
            end,
            amplitude: start.distance_to(&end),
            length: path_length(&trajectory),
            trajectory,
        })
    }

    /// Builder method: override the amplitude (e.g. visual angle reported by the tracker)
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Check the stored endpoints and length against the trajectory
    pub(crate) fn validate(&self) -> Result<()> {
        validate_span("Saccade", self.start_time, self.end_time)?;
        let (first, last) = validate_trajectory("Saccade", self.start_time, &self.trajectory)?;
        if self.start != first || self.end != last {
            return Err(GazeError::InvalidArgument(format!(
                "Saccade at {} has endpoints {} -> {} but its trajectory runs {} -> {}",
                self.start_time, self.start, self.end, first, last
            )));
        }
        let expected = path_length(&self.trajectory);
        if (self.length - expected).abs() > LENGTH_TOLERANCE * expected.max(1.0) {
            return Err(GazeError::InvalidArgument(format!(
                "Saccade at {} has length {} but its trajectory is {} long",
                self.start_time, self.length, expected
            )));
        }
        if !self.amplitude.is_finite() {
            return Err(GazeError::InvalidArgument(format!(
                "Saccade at {} has a non-finite amplitude",
                self.start_time
            )));
        }
        Ok(())
    }
}

impl GazeEvent for SaccadeEvent {
    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn kind(&self) -> EventKind {
        EventKind::Saccade
    }
}

/// A period where gaze is held near one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixationEvent {
    pub start_time: f64,
    pub end_time: f64,
    /// Fixation centroid
    pub center: Point,
    /// Gaze samples spanning the fixation
    pub trajectory: Vec<Point>,
}

impl FixationEvent {
    /// Build a fixation from its trajectory; the center is the trajectory centroid
    pub fn new(start_time: f64, end_time: f64, trajectory: Vec<Point>) -> Result<Self> {
        validate_span("Fixation", start_time, end_time)?;
        validate_trajectory("Fixation", start_time, &trajectory)?;
        let center = centroid(&trajectory).ok_or_else(|| {
            GazeError::InvalidArgument(format!(
                "Fixation at {} has an empty trajectory",
                start_time
            ))
        })?;

        Ok(Self {
            start_time,
            end_time,
            center,
            trajectory,
        })
    }

    /// Builder method: override the center reported by the tracker
    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_span("Fixation", self.start_time, self.end_time)?;
        validate_trajectory("Fixation", self.start_time, &self.trajectory)?;
        if !self.center.is_finite() {
            return Err(GazeError::InvalidArgument(format!(
                "Fixation at {} has a non-finite center",
                self.start_time
            )));
        }
        Ok(())
    }
}

impl GazeEvent for FixationEvent {
    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn kind(&self) -> EventKind {
        EventKind::Fixation
    }
}

/// Event trajectories are built from valid samples only; lost samples stay in
/// the sample stream
fn validate_trajectory(what: &str, start_time: f64, trajectory: &[Point]) -> Result<(Point, Point)> {
    let (first, last) = match (trajectory.first(), trajectory.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(GazeError::InvalidArgument(format!(
                "{} at {} has an empty trajectory",
                what, start_time
            )))
        }
    };
    if let Some(i) = trajectory.iter().position(|p| !p.is_finite()) {
        return Err(GazeError::InvalidArgument(format!(
            "{} at {} has a non-finite trajectory point at {}",
            what, start_time, i
        )));
    }
    Ok((first, last))
}

fn validate_span(what: &str, start_time: f64, end_time: f64) -> Result<()> {
    if !start_time.is_finite() || !end_time.is_finite() {
        return Err(GazeError::InvalidArgument(format!(
            "{} has a non-finite time span ({}, {})",
            what, start_time, end_time
        )));
    }
    if end_time < start_time {
        return Err(GazeError::InvalidArgument(format!(
            "{} ends before it starts ({} < {})",
            what, end_time, start_time
        )));
    }
    Ok(())
}

/// Borrowed view of an event of any kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventRef<'a> {
    Saccade(&'a SaccadeEvent),
    Fixation(&'a FixationEvent),
    Message(&'a MessageEvent),
}

impl<'a> EventRef<'a> {
    pub fn as_saccade(&self) -> Option<&'a SaccadeEvent> {
        match self {
            EventRef::Saccade(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_fixation(&self) -> Option<&'a FixationEvent> {
        match self {
            EventRef::Fixation(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&'a MessageEvent> {
        match self {
            EventRef::Message(m) => Some(m),
            _ => None,
        }
    }
}

impl GazeEvent for EventRef<'_> {
    fn start_time(&self) -> f64 {
        match self {
            EventRef::Saccade(s) => s.start_time,
            EventRef::Fixation(f) => f.start_time,
            EventRef::Message(m) => m.time,
        }
    }

    fn kind(&self) -> EventKind {
        match self {
            EventRef::Saccade(_) => EventKind::Saccade,
            EventRef::Fixation(_) => EventKind::Fixation,
            EventRef::Message(_) => EventKind::Message,
        }
    }
}
