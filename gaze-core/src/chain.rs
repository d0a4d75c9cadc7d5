//! Globally ordered event chain
//!
//! A recording keeps saccades, fixations and messages in three separate
//! collections, each ordered by its own temporal key. The [`EventChain`] merges
//! them once into a single master order so that, from any event, the adjacent
//! event of any kind is found in O(1).
//!
//! The chain is an arena of tagged slots (`{kind, collection index, key}`);
//! events never point back at their container. An [`EventHandle`] pairs a
//! borrowed recording with a slot position and is the cursor used for
//! traversal.

use crate::events::{EventKind, EventRef, GazeEvent};
use crate::recording::Recording;
use crate::types::{GazeError, Result};

/// One entry of the master order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSlot {
    /// Kind of the originating collection
    pub kind: EventKind,
    /// Index into the originating collection
    pub index: usize,
    /// Temporal key (start time for saccades/fixations, time for messages)
    pub key: f64,
}

/// Master order across the saccade, fixation and message collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChain {
    slots: Vec<ChainSlot>,
    /// Reverse lookup: collection index -> slot position
    saccade_slots: Vec<usize>,
    fixation_slots: Vec<usize>,
    message_slots: Vec<usize>,
}

impl EventChain {
    /// Merge the three pre-sorted key sequences into the master order
    ///
    /// Each sequence must be finite and non-decreasing. Equal keys are ordered
    /// by [`EventKind`] (messages first) and then by collection index, so the
    /// result is deterministic.
    pub fn build(saccade_keys: &[f64], fixation_keys: &[f64], message_keys: &[f64]) -> Result<Self> {
        // Source order doubles as the tie-break order
        let sources = [
            (EventKind::Message, message_keys),
            (EventKind::Saccade, saccade_keys),
            (EventKind::Fixation, fixation_keys),
        ];

        for (kind, keys) in &sources {
            check_sorted(*kind, keys)?;
        }

        let total = saccade_keys.len() + fixation_keys.len() + message_keys.len();
        let mut chain = EventChain {
            slots: Vec::with_capacity(total),
            saccade_slots: Vec::with_capacity(saccade_keys.len()),
            fixation_slots: Vec::with_capacity(fixation_keys.len()),
            message_slots: Vec::with_capacity(message_keys.len()),
        };
        let mut cursors = [0usize; 3];

        while chain.slots.len() < total {
            let mut best: Option<usize> = None;
            for (source, (_, keys)) in sources.iter().enumerate() {
                if let Some(&key) = keys.get(cursors[source]) {
                    match best {
                        Some(b) if sources[b].1[cursors[b]] <= key => {}
                        _ => best = Some(source),
                    }
                }
            }
            let Some(source) = best else { break };

            let (kind, keys) = sources[source];
            let index = cursors[source];
            cursors[source] += 1;

            let position = chain.slots.len();
            chain.slots.push(ChainSlot {
                kind,
                index,
                key: keys[index],
            });
            chain.slots_for_mut(kind).push(position);
        }

        log::debug!(
            "Built event chain: {} slots ({} saccades, {} fixations, {} messages)",
            chain.slots.len(),
            saccade_keys.len(),
            fixation_keys.len(),
            message_keys.len()
        );

        Ok(chain)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ChainSlot] {
        &self.slots
    }

    pub fn slot(&self, position: usize) -> Option<&ChainSlot> {
        self.slots.get(position)
    }

    /// Slot position of the `index`-th event of a collection
    pub fn position_of(&self, kind: EventKind, index: usize) -> Option<usize> {
        self.slots_for(kind).get(index).copied()
    }

    /// Position of the next slot after `position`, optionally restricted to one kind
    pub fn next_position(&self, position: usize, kind: Option<EventKind>) -> Option<usize> {
        (position + 1..self.slots.len()).find(|&p| matches_kind(&self.slots[p], kind))
    }

    /// Position of the previous slot before `position`, optionally restricted to one kind
    ///
    /// An unfiltered step back from the first slot stays on the first slot
    /// rather than returning `None`. Filtered searches return `None` when no
    /// earlier slot of that kind exists.
    pub fn previous_position(&self, position: usize, kind: Option<EventKind>) -> Option<usize> {
        if position >= self.slots.len() {
            return None;
        }
        match kind {
            None => Some(position.saturating_sub(1)),
            Some(_) => (0..position)
                .rev()
                .find(|&p| matches_kind(&self.slots[p], kind)),
        }
    }

    fn slots_for(&self, kind: EventKind) -> &Vec<usize> {
        match kind {
            EventKind::Saccade => &self.saccade_slots,
            EventKind::Fixation => &self.fixation_slots,
            EventKind::Message => &self.message_slots,
        }
    }

    fn slots_for_mut(&mut self, kind: EventKind) -> &mut Vec<usize> {
        match kind {
            EventKind::Saccade => &mut self.saccade_slots,
            EventKind::Fixation => &mut self.fixation_slots,
            EventKind::Message => &mut self.message_slots,
        }
    }
}

fn matches_kind(slot: &ChainSlot, kind: Option<EventKind>) -> bool {
    kind.map_or(true, |k| slot.kind == k)
}

fn check_sorted(kind: EventKind, keys: &[f64]) -> Result<()> {
    if let Some(i) = keys.iter().position(|k| !k.is_finite()) {
        return Err(GazeError::InvalidArgument(format!(
            "{} {} has a non-finite time: {}",
            kind, i, keys[i]
        )));
    }
    if let Some(i) = keys.windows(2).position(|w| w[1] < w[0]) {
        return Err(GazeError::InvalidArgument(format!(
            "{} collection is not time-ordered at index {} ({} > {})",
            kind,
            i + 1,
            keys[i],
            keys[i + 1]
        )));
    }
    Ok(())
}

/// Cursor on one event of a recording
///
/// Handles are cheap to copy and borrow the recording; they are the way to
/// walk the master order across event kinds.
#[derive(Debug, Clone, Copy)]
pub struct EventHandle<'a> {
    recording: &'a Recording,
    position: usize,
}

impl<'a> EventHandle<'a> {
    pub(crate) fn new(recording: &'a Recording, position: usize) -> Self {
        Self {
            recording,
            position,
        }
    }

    /// Position in the master order
    pub fn position(&self) -> usize {
        self.position
    }

    /// Index into the collection of this event's kind
    pub fn index(&self) -> usize {
        self.slot().index
    }

    pub fn event(&self) -> EventRef<'a> {
        let slot = self.slot();
        match slot.kind {
            EventKind::Saccade => EventRef::Saccade(&self.recording.sac()[slot.index]),
            EventKind::Fixation => EventRef::Fixation(&self.recording.fix()[slot.index]),
            EventKind::Message => EventRef::Message(&self.recording.msg()[slot.index]),
        }
    }

    /// The event immediately following this one; `None` once the chain is exhausted
    pub fn next_event(&self, kind: Option<EventKind>) -> Option<EventHandle<'a>> {
        self.recording
            .chain()
            .next_position(self.position, kind)
            .map(|p| EventHandle::new(self.recording, p))
    }

    /// The event immediately preceding this one
    ///
    /// Stepping back from the first event without a kind filter returns the
    /// first event again.
    pub fn previous_event(&self, kind: Option<EventKind>) -> Option<EventHandle<'a>> {
        self.recording
            .chain()
            .previous_position(self.position, kind)
            .map(|p| EventHandle::new(self.recording, p))
    }

    fn slot(&self) -> &'a ChainSlot {
        &self.recording.chain().slots()[self.position]
    }
}

impl GazeEvent for EventHandle<'_> {
    fn start_time(&self) -> f64 {
        self.slot().key
    }

    fn kind(&self) -> EventKind {
        self.slot().kind
    }
}

impl PartialEq for EventHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.recording, other.recording) && self.position == other.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(chain: &EventChain) -> Vec<EventKind> {
        chain.slots().iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_merge_order() {
        let chain = EventChain::build(&[10.0, 30.0], &[0.0, 20.0, 40.0], &[5.0, 35.0]).unwrap();
        assert_eq!(chain.len(), 7);

        let keys: Vec<f64> = chain.slots().iter().map(|s| s.key).collect();
        assert_eq!(keys, vec![0.0, 5.0, 10.0, 20.0, 30.0, 35.0, 40.0]);
        assert_eq!(
            kinds(&chain),
            vec![
                EventKind::Fixation,
                EventKind::Message,
                EventKind::Saccade,
                EventKind::Fixation,
                EventKind::Saccade,
                EventKind::Message,
                EventKind::Fixation,
            ]
        );
        assert_eq!(chain.position_of(EventKind::Fixation, 1), Some(3));
        assert_eq!(chain.position_of(EventKind::Message, 1), Some(5));
        assert_eq!(chain.position_of(EventKind::Message, 2), None);
    }

    #[test]
    fn test_ties_are_deterministic() {
        let chain = EventChain::build(&[0.0], &[0.0, 0.0], &[0.0]).unwrap();
        let order: Vec<(EventKind, usize)> =
            chain.slots().iter().map(|s| (s.kind, s.index)).collect();
        assert_eq!(
            order,
            vec![
                (EventKind::Message, 0),
                (EventKind::Saccade, 0),
                (EventKind::Fixation, 0),
                (EventKind::Fixation, 1),
            ]
        );
    }

    #[test]
    fn test_unsorted_input_is_rejected() {
        let result = EventChain::build(&[10.0, 5.0], &[], &[]);
        assert!(matches!(result, Err(GazeError::InvalidArgument(_))));

        let result = EventChain::build(&[], &[f64::NAN], &[]);
        assert!(matches!(result, Err(GazeError::InvalidArgument(_))));
    }

    #[test]
    fn test_filtered_navigation() {
        let chain = EventChain::build(&[10.0, 30.0], &[0.0, 20.0, 40.0], &[5.0, 35.0]).unwrap();

        assert_eq!(chain.next_position(0, None), Some(1));
        assert_eq!(chain.next_position(0, Some(EventKind::Saccade)), Some(2));
        assert_eq!(chain.next_position(5, Some(EventKind::Message)), None);
        assert_eq!(chain.next_position(6, None), None);

        assert_eq!(chain.previous_position(6, Some(EventKind::Message)), Some(5));
        assert_eq!(chain.previous_position(2, Some(EventKind::Saccade)), None);
    }

    #[test]
    fn test_previous_clamps_at_start() {
        let chain = EventChain::build(&[10.0], &[0.0], &[]).unwrap();
        assert_eq!(chain.previous_position(1, None), Some(0));
        assert_eq!(chain.previous_position(0, None), Some(0));
        assert_eq!(chain.previous_position(0, Some(EventKind::Fixation)), None);
    }

    #[test]
    fn test_empty_chain() {
        let chain = EventChain::build(&[], &[], &[]).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.next_position(0, None), None);
        assert_eq!(chain.previous_position(0, None), None);
    }
}
