//! Gaze Event Library
//!
//! The event model for eye-tracking recordings: saccades, fixations and
//! messages reconstructed from a time-ordered sample stream, with cross-kind
//! navigation and a query layer for analysis scripts.
//!
//! # Architecture
//!
//! - [`Recording`] owns a sample stream and three per-kind event collections
//!   (`sac`, `fix`, `msg`), each ordered by its own start time
//! - The [`EventChain`] merges them once into a global order; an
//!   [`EventHandle`] walks that order with `next_event` / `previous_event`
//! - [`Region`] shapes test trajectories for containment
//! - The query layer searches messages, aligns them to samples, filters
//!   fixations by region and projects event fields into columns
//!
//! Recordings are immutable once built, so they can be shared between readers
//! freely.
//!
//! The library does NOT:
//! - Detect saccades or fixations from raw samples
//! - Talk to tracker hardware or render stimuli
//!
//! # Example Usage
//!
//! ```no_run
//! use gaze_core::{load_file, ContainsMode, EventKind, GazeEvent, MatchMode, Region, RegionQuery};
//! use std::path::Path;
//!
//! let data = load_file(Path::new("session.json")).unwrap();
//! let recording = data.recording(0).unwrap();
//!
//! // Messages announcing a stimulus
//! for msg in recording.find_message("^stimulus .*", MatchMode::Regex).unwrap() {
//!     println!("{} at {}", msg.text, msg.time);
//! }
//!
//! // Fixations inside a circular area of interest
//! let query = RegionQuery::new(Region::circle(800.0, 500.0, 200.0).unwrap())
//!     .with_period(5000.0, 10000.0)
//!     .with_mode(ContainsMode::All);
//! let hits = recording.fixations_in_region(&query).unwrap();
//! println!("{} fixations in region", hits.len());
//!
//! // Walk from the first message to the next saccade
//! if let Some(first) = recording.message_handle(0) {
//!     if let Some(sac) = first.next_event(Some(EventKind::Saccade)) {
//!         println!("saccade {} ms after", sac.relative_start_time(first.start_time()));
//!     }
//! }
//! ```

// Public modules
pub mod analysis;
pub mod chain;
pub mod config;
pub mod events;
pub mod formats;
pub mod query;
pub mod recording;
pub mod region;
pub mod types;

// Re-export main types for convenience
pub use chain::{ChainSlot, EventChain, EventHandle};
pub use config::{CurvatureConfig, MicrosaccadeConfig};
pub use events::{EventKind, EventRef, FixationEvent, GazeEvent, MessageEvent, SaccadeEvent};
pub use formats::{load_file, save_file, GazeDataFile};
pub use query::{fixation_indices_in_region, fixations_in_region, MatchMode, MessageRef, RegionQuery};
pub use recording::{Recording, RecordingBuilder, SampleStream};
pub use region::{CircleRegion, Contains, ContainsMode, RectRegion, Region};
pub use types::{GazeError, Point, Result, TimeUnit};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty recording has an empty chain
        let recording = Recording::builder().build().unwrap();
        assert_eq!(recording.chain().len(), 0);
        assert!(recording.events().next().is_none());
    }

    #[test]
    fn test_recording_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Recording>();
        assert_send_sync::<GazeDataFile>();
    }
}
