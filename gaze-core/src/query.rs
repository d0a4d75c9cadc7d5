//! Query layer over a recording's event collections
//!
//! Message search, nearest-sample lookup, region membership over fixations and
//! bulk column projections. Every query is a pure read of an immutable
//! [`Recording`]; empty collections give empty results, not errors.

use crate::events::{FixationEvent, MessageEvent};
use crate::recording::Recording;
use crate::region::{Contains, ContainsMode, Region};
use crate::types::{GazeError, Result};
use regex::Regex;

/// How a message pattern is compared against message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Exact equality with the whole text
    #[default]
    Literal,
    /// Regular-expression search anywhere in the text
    Regex,
}

/// Reference to a message: the event itself or its index in `msg`
#[derive(Debug, Clone, Copy)]
pub enum MessageRef<'a> {
    Event(&'a MessageEvent),
    Index(usize),
}

impl<'a> From<&'a MessageEvent> for MessageRef<'a> {
    fn from(m: &'a MessageEvent) -> Self {
        MessageRef::Event(m)
    }
}

impl From<usize> for MessageRef<'_> {
    fn from(i: usize) -> Self {
        MessageRef::Index(i)
    }
}

/// Compiled message matcher
enum MessageMatcher<'p> {
    Literal(&'p str),
    Regex(Regex),
}

impl<'p> MessageMatcher<'p> {
    fn new(pattern: &'p str, mode: MatchMode) -> Result<Self> {
        match mode {
            MatchMode::Literal => Ok(MessageMatcher::Literal(pattern)),
            MatchMode::Regex => Regex::new(pattern).map(MessageMatcher::Regex).map_err(|e| {
                GazeError::InvalidArgument(format!("Invalid message pattern {:?}: {}", pattern, e))
            }),
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            MessageMatcher::Literal(pattern) => text == *pattern,
            MessageMatcher::Regex(re) => re.is_match(text),
        }
    }
}

/// Parameters of a fixation-in-region query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionQuery {
    pub region: Region,
    /// Inclusive `(t0, t1)` range on fixation start time
    pub period: Option<(f64, f64)>,
    pub mode: ContainsMode,
}

impl RegionQuery {
    pub fn new(region: impl Into<Region>) -> Self {
        Self {
            region: region.into(),
            period: None,
            mode: ContainsMode::All,
        }
    }

    /// Builder method: restrict to fixations starting within `[t0, t1]`
    pub fn with_period(mut self, t0: f64, t1: f64) -> Self {
        self.period = Some((t0, t1));
        self
    }

    /// Builder method: set how trajectory points are aggregated
    pub fn with_mode(mut self, mode: ContainsMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check whether a fixation satisfies the query
    pub fn matches(&self, fixation: &FixationEvent) -> bool {
        let in_period = match self.period {
            Some((t0, t1)) => (t0..=t1).contains(&fixation.start_time),
            None => true,
        };
        in_period && self.region.contains(&fixation.trajectory, self.mode)
    }

    fn validate(&self) -> Result<()> {
        if let Some((t0, t1)) = self.period {
            if !(t0 <= t1) {
                return Err(GazeError::InvalidArgument(format!(
                    "Invalid period [{}, {}]",
                    t0, t1
                )));
            }
        }
        Ok(())
    }
}

/// Fixations of `recording` matching `query`, in original order
pub fn fixations_in_region<'a>(
    recording: &'a Recording,
    query: &RegionQuery,
) -> Result<Vec<&'a FixationEvent>> {
    query.validate()?;
    Ok(recording.fix().iter().filter(|f| query.matches(f)).collect())
}

/// Indices into `fix` of the fixations matching `query`
pub fn fixation_indices_in_region(recording: &Recording, query: &RegionQuery) -> Result<Vec<usize>> {
    query.validate()?;
    let indices: Vec<usize> = recording
        .fix()
        .iter()
        .enumerate()
        .filter(|(_, f)| query.matches(f))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "Region query {} ({}) matched {} of {} fixations",
        query.region,
        query.mode,
        indices.len(),
        recording.n_fix()
    );
    Ok(indices)
}

impl Recording {
    /// Messages whose text matches `pattern`, in `msg` order
    pub fn find_message(&self, pattern: &str, mode: MatchMode) -> Result<Vec<&MessageEvent>> {
        let matcher = MessageMatcher::new(pattern, mode)?;
        Ok(self.msg().iter().filter(|m| matcher.is_match(&m.text)).collect())
    }

    /// Positions in `msg` of the messages whose text matches `pattern`
    pub fn find_message_indices(&self, pattern: &str, mode: MatchMode) -> Result<Vec<usize>> {
        let matcher = MessageMatcher::new(pattern, mode)?;
        Ok(self
            .msg()
            .iter()
            .enumerate()
            .filter(|(_, m)| matcher.is_match(&m.text))
            .map(|(i, _)| i)
            .collect())
    }

    /// First message matching `pattern`; `NotFound` if there is none
    pub fn first_message(&self, pattern: &str, mode: MatchMode) -> Result<&MessageEvent> {
        let matcher = MessageMatcher::new(pattern, mode)?;
        self.msg()
            .iter()
            .find(|m| matcher.is_match(&m.text))
            .ok_or_else(|| GazeError::NotFound(format!("No message matches {:?}", pattern)))
    }

    /// Index of the sample whose timestamp is closest to the message time
    ///
    /// Ties resolve to the earlier sample.
    pub fn find_nearest_index_from_message<'a>(&self, message: impl Into<MessageRef<'a>>) -> Result<usize> {
        let time = match message.into() {
            MessageRef::Event(m) => m.time,
            MessageRef::Index(i) => {
                self.msg()
                    .get(i)
                    .ok_or_else(|| {
                        GazeError::InvalidArgument(format!(
                            "Message index {} out of range ({} messages)",
                            i,
                            self.n_msg()
                        ))
                    })?
                    .time
            }
        };

        self.samples().nearest_index(time).ok_or_else(|| {
            GazeError::NotFound(format!("No samples to align message at {}", time))
        })
    }

    /// All message texts in `msg` order
    pub fn message_text_list(&self) -> Vec<&str> {
        self.msg().iter().map(|m| m.text.as_str()).collect()
    }

    pub fn fixations_in_region(&self, query: &RegionQuery) -> Result<Vec<&FixationEvent>> {
        fixations_in_region(self, query)
    }

    pub fn fixation_indices_in_region(&self, query: &RegionQuery) -> Result<Vec<usize>> {
        fixation_indices_in_region(self, query)
    }

    pub fn sac_dur(&self) -> Vec<f64> {
        self.sac().iter().map(|s| s.duration()).collect()
    }

    pub fn sac_amp(&self) -> Vec<f64> {
        self.sac().iter().map(|s| s.amplitude).collect()
    }

    pub fn sac_len(&self) -> Vec<f64> {
        self.sac().iter().map(|s| s.length).collect()
    }

    /// `[start_time, end_time]` per saccade
    pub fn sac_time(&self) -> Vec<[f64; 2]> {
        self.sac().iter().map(|s| [s.start_time, s.end_time]).collect()
    }

    pub fn fix_dur(&self) -> Vec<f64> {
        self.fix().iter().map(|f| f.duration()).collect()
    }

    /// `[start_time, end_time]` per fixation
    pub fn fix_time(&self) -> Vec<[f64; 2]> {
        self.fix().iter().map(|f| [f.start_time, f.end_time]).collect()
    }

    /// `[x, y]` center per fixation
    pub fn fix_center(&self) -> Vec<[f64; 2]> {
        self.fix().iter().map(|f| f.center.to_array()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::SampleStream;
    use crate::types::Point;

    fn recording() -> Recording {
        let times: Vec<f64> = (0..10).map(|i| i as f64 * 2.0).collect();
        Recording::builder()
            .with_samples(SampleStream::from_times(times).unwrap())
            .add_message(MessageEvent::new(1.0, "TRIALID 1"))
            .add_message(MessageEvent::new(5.2, "stim a*"))
            .add_message(MessageEvent::new(9.0, "TRIALID 2"))
            .add_fixation(
                FixationEvent::new(0.0, 4.0, vec![Point::new(10.0, 10.0), Point::new(11.0, 10.0)])
                    .unwrap(),
            )
            .add_fixation(
                FixationEvent::new(6.0, 9.0, vec![Point::new(10.0, 10.0), Point::new(50.0, 50.0)])
                    .unwrap(),
            )
            .add_fixation(FixationEvent::new(12.0, 18.0, vec![Point::new(90.0, 90.0)]).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_literal_match_is_exact() {
        let rec = recording();
        assert_eq!(rec.find_message("TRIALID", MatchMode::Literal).unwrap().len(), 0);
        assert_eq!(rec.find_message("stim a*", MatchMode::Literal).unwrap().len(), 1);
        assert!(rec.find_message("stim .*", MatchMode::Literal).unwrap().is_empty());
    }

    #[test]
    fn test_regex_match_searches() {
        let rec = recording();
        let found = rec.find_message("TRIALID", MatchMode::Regex).unwrap();
        assert_eq!(found.iter().map(|m| m.time).collect::<Vec<_>>(), vec![1.0, 9.0]);
        assert_eq!(rec.find_message_indices("^TRIALID \\d$", MatchMode::Regex).unwrap(), vec![0, 2]);

        let err = rec.find_message("(unclosed", MatchMode::Regex);
        assert!(matches!(err, Err(GazeError::InvalidArgument(_))));
    }

    #[test]
    fn test_first_message_not_found() {
        let rec = recording();
        assert_eq!(rec.first_message("TRIALID 2", MatchMode::Literal).unwrap().time, 9.0);
        assert!(matches!(
            rec.first_message("missing", MatchMode::Literal),
            Err(GazeError::NotFound(_))
        ));
    }

    #[test]
    fn test_nearest_index_from_message() {
        let rec = recording();
        // 1.0 is equidistant from samples 0 (0.0) and 1 (2.0)
        assert_eq!(rec.find_nearest_index_from_message(0usize).unwrap(), 0);
        assert_eq!(rec.find_nearest_index_from_message(1usize).unwrap(), 3);
        assert_eq!(rec.find_nearest_index_from_message(&rec.msg()[2]).unwrap(), 4);

        assert!(matches!(
            rec.find_nearest_index_from_message(3usize),
            Err(GazeError::InvalidArgument(_))
        ));

        let no_samples = Recording::builder()
            .add_message(MessageEvent::new(1.0, "x"))
            .build()
            .unwrap();
        assert!(matches!(
            no_samples.find_nearest_index_from_message(0usize),
            Err(GazeError::NotFound(_))
        ));
    }

    #[test]
    fn test_region_query_modes_and_period() {
        let rec = recording();
        let circle = Region::circle(10.0, 10.0, 5.0).unwrap();

        let all = RegionQuery::new(circle);
        assert_eq!(rec.fixation_indices_in_region(&all).unwrap(), vec![0]);

        let any = RegionQuery::new(circle).with_mode(ContainsMode::Any);
        assert_eq!(rec.fixation_indices_in_region(&any).unwrap(), vec![0, 1]);

        let period = any.with_period(5.0, 6.0);
        let found = rec.fixations_in_region(&period).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_time, 6.0);

        let inverted = RegionQuery::new(circle).with_period(10.0, 0.0);
        assert!(rec.fixations_in_region(&inverted).is_err());
    }

    #[test]
    fn test_projections() {
        let rec = recording();
        assert_eq!(rec.fix_dur(), vec![4.0, 3.0, 6.0]);
        assert_eq!(rec.fix_time()[1], [6.0, 9.0]);
        assert_eq!(rec.fix_center()[0], [10.5, 10.0]);
        assert!(rec.sac_dur().is_empty());
        assert_eq!(rec.message_text_list(), vec!["TRIALID 1", "stim a*", "TRIALID 2"]);
    }

    #[test]
    fn test_queries_on_empty_recording() {
        let rec = Recording::builder().build().unwrap();
        assert!(rec.find_message(".*", MatchMode::Regex).unwrap().is_empty());
        assert!(rec.message_text_list().is_empty());
        let query = RegionQuery::new(Region::circle(0.0, 0.0, 1.0).unwrap());
        assert!(rec.fixations_in_region(&query).unwrap().is_empty());
        assert!(rec.sac_time().is_empty());
    }
}
