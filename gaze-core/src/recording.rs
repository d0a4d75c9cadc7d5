//! Recordings: the sample stream plus the reconstructed event collections
//!
//! A [`Recording`] is built once (through [`RecordingBuilder`] or by
//! deserializing a data file) and is immutable afterward. Construction
//! validates every collection and computes the [`EventChain`]; if any check
//! fails, no recording is produced.

use crate::chain::{EventChain, EventHandle};
use crate::events::{EventKind, FixationEvent, GazeEvent, MessageEvent, SaccadeEvent};
use crate::types::{GazeError, Point, Result, TimeUnit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw decoded samples of one recording
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleStream {
    /// Sample timestamps, non-decreasing
    pub time: Vec<f64>,
    /// Gaze position per sample; empty when only timestamps were kept
    #[serde(default)]
    pub gaze: Vec<Point>,
}

impl SampleStream {
    /// Create a sample stream, checking that it is well formed
    pub fn new(time: Vec<f64>, gaze: Vec<Point>) -> Result<Self> {
        let stream = Self { time, gaze };
        stream.validate()?;
        Ok(stream)
    }

    /// Sample stream without gaze positions
    pub fn from_times(time: Vec<f64>) -> Result<Self> {
        Self::new(time, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Index of the sample closest to `t`
    ///
    /// Ties go to the earlier sample. Returns `None` for an empty stream.
    pub fn nearest_index(&self, t: f64) -> Option<usize> {
        if self.time.is_empty() {
            return None;
        }
        let upper = self.time.partition_point(|&s| s < t);
        if upper == 0 {
            return Some(0);
        }
        if upper == self.time.len() {
            return Some(self.first_index_of(upper - 1));
        }

        let before = t - self.time[upper - 1];
        let after = self.time[upper] - t;
        if before <= after {
            Some(self.first_index_of(upper - 1))
        } else {
            Some(upper)
        }
    }

    /// Median interval between consecutive samples, in timestamp units
    pub fn median_interval(&self) -> Option<f64> {
        let mut deltas: Vec<f64> = self
            .time
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > 0.0)
            .collect();
        if deltas.is_empty() {
            return None;
        }
        deltas.sort_by(|a, b| a.total_cmp(b));
        Some(median_of_sorted(&deltas))
    }

    // First index holding the same timestamp as `index`
    fn first_index_of(&self, index: usize) -> usize {
        let value = self.time[index];
        self.time[..index].partition_point(|&s| s < value)
    }

    fn validate(&self) -> Result<()> {
        if let Some(i) = self.time.iter().position(|t| !t.is_finite()) {
            return Err(GazeError::InvalidArgument(format!(
                "Sample {} has a non-finite timestamp",
                i
            )));
        }
        if let Some(i) = self.time.windows(2).position(|w| w[1] < w[0]) {
            return Err(GazeError::InvalidArgument(format!(
                "Sample timestamps decrease at index {}",
                i + 1
            )));
        }
        if !self.gaze.is_empty() && self.gaze.len() != self.time.len() {
            return Err(GazeError::InvalidArgument(format!(
                "Sample stream has {} timestamps but {} gaze positions",
                self.time.len(),
                self.gaze.len()
            )));
        }
        Ok(())
    }
}

pub(crate) fn median_of_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// One eye-tracking recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordingData", into = "RecordingData")]
pub struct Recording {
    label: Option<String>,
    recorded_at: Option<DateTime<Utc>>,
    time_unit: TimeUnit,
    samples: SampleStream,
    sac: Vec<SaccadeEvent>,
    fix: Vec<FixationEvent>,
    msg: Vec<MessageEvent>,
    chain: EventChain,
}

impl Recording {
    /// Build a recording from its collections
    ///
    /// Each collection must already be ordered by its temporal key.
    pub fn new(
        samples: SampleStream,
        sac: Vec<SaccadeEvent>,
        fix: Vec<FixationEvent>,
        msg: Vec<MessageEvent>,
    ) -> Result<Self> {
        RecordingData {
            label: None,
            recorded_at: None,
            time_unit: TimeUnit::default(),
            samples,
            sac,
            fix,
            msg,
        }
        .try_into()
    }

    pub fn builder() -> RecordingBuilder {
        RecordingBuilder::default()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.recorded_at
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn samples(&self) -> &SampleStream {
        &self.samples
    }

    pub fn sac(&self) -> &[SaccadeEvent] {
        &self.sac
    }

    pub fn fix(&self) -> &[FixationEvent] {
        &self.fix
    }

    pub fn msg(&self) -> &[MessageEvent] {
        &self.msg
    }

    pub fn n_sac(&self) -> usize {
        self.sac.len()
    }

    pub fn n_fix(&self) -> usize {
        self.fix.len()
    }

    pub fn n_msg(&self) -> usize {
        self.msg.len()
    }

    pub fn chain(&self) -> &EventChain {
        &self.chain
    }

    /// All events in master order
    pub fn events(&self) -> impl Iterator<Item = EventHandle<'_>> + '_ {
        (0..self.chain.len()).map(move |p| EventHandle::new(self, p))
    }

    /// Earliest event of the recording
    pub fn first_event(&self) -> Option<EventHandle<'_>> {
        (!self.chain.is_empty()).then(|| EventHandle::new(self, 0))
    }

    pub fn handle(&self, kind: EventKind, index: usize) -> Option<EventHandle<'_>> {
        self.chain
            .position_of(kind, index)
            .map(|p| EventHandle::new(self, p))
    }

    pub fn saccade_handle(&self, index: usize) -> Option<EventHandle<'_>> {
        self.handle(EventKind::Saccade, index)
    }

    pub fn fixation_handle(&self, index: usize) -> Option<EventHandle<'_>> {
        self.handle(EventKind::Fixation, index)
    }

    pub fn message_handle(&self, index: usize) -> Option<EventHandle<'_>> {
        self.handle(EventKind::Message, index)
    }

    /// Sampling rate in Hz estimated from the median sample interval
    pub fn sampling_rate(&self) -> Option<f64> {
        let interval = self.samples.median_interval();
        if interval.is_none() {
            log::warn!(
                "Cannot estimate sampling rate: {} samples with no positive interval",
                self.samples.len()
            );
        }
        interval.map(|dt| self.time_unit.per_second() / dt)
    }
}

/// Builder for [`Recording`]
#[derive(Debug, Clone, Default)]
pub struct RecordingBuilder {
    data: RecordingData,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.data.label = Some(label.into());
        self
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.data.recorded_at = Some(recorded_at);
        self
    }

    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.data.time_unit = time_unit;
        self
    }

    pub fn with_samples(mut self, samples: SampleStream) -> Self {
        self.data.samples = samples;
        self
    }

    pub fn add_saccade(mut self, saccade: SaccadeEvent) -> Self {
        self.data.sac.push(saccade);
        self
    }

    pub fn add_fixation(mut self, fixation: FixationEvent) -> Self {
        self.data.fix.push(fixation);
        self
    }

    pub fn add_message(mut self, message: MessageEvent) -> Self {
        self.data.msg.push(message);
        self
    }

    /// Validate the collected data and build the event chain
    pub fn build(self) -> Result<Recording> {
        Recording::try_from(self.data)
    }
}

/// Serialized shape of a recording; the event chain is rebuilt on load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RecordingData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    time_unit: TimeUnit,
    #[serde(default)]
    samples: SampleStream,
    #[serde(default)]
    sac: Vec<SaccadeEvent>,
    #[serde(default)]
    fix: Vec<FixationEvent>,
    #[serde(default)]
    msg: Vec<MessageEvent>,
}

impl TryFrom<RecordingData> for Recording {
    type Error = GazeError;

    fn try_from(data: RecordingData) -> Result<Self> {
        data.samples.validate()?;
        for sac in &data.sac {
            sac.validate()?;
        }
        for fix in &data.fix {
            fix.validate()?;
        }

        let sac_keys: Vec<f64> = data.sac.iter().map(|e| e.start_time()).collect();
        let fix_keys: Vec<f64> = data.fix.iter().map(|e| e.start_time()).collect();
        let msg_keys: Vec<f64> = data.msg.iter().map(|e| e.start_time()).collect();
        let chain = EventChain::build(&sac_keys, &fix_keys, &msg_keys)?;

        Ok(Recording {
            label: data.label,
            recorded_at: data.recorded_at,
            time_unit: data.time_unit,
            samples: data.samples,
            sac: data.sac,
            fix: data.fix,
            msg: data.msg,
            chain,
        })
    }
}

impl From<Recording> for RecordingData {
    fn from(recording: Recording) -> Self {
        RecordingData {
            label: recording.label,
            recorded_at: recording.recorded_at,
            time_unit: recording.time_unit,
            samples: recording.samples,
            sac: recording.sac,
            fix: recording.fix,
            msg: recording.msg,
        }
    }
}
