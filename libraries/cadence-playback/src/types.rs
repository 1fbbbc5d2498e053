//! Core types for playback management

use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identity of one queue entry
///
/// A track may be queued more than once, so entries are told apart by key,
/// never by track id. Keys are unique for the lifetime of a `QueueModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryKey(u64);

impl EntryKey {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw key value (stable for the entry's lifetime)
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visual state of a queue entry relative to the current pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// Before the current entry
    History,

    /// The entry being played
    Current,

    /// After the current entry
    Upcoming,
}

impl EntryState {
    /// State of the entry at `position` given the current pointer
    ///
    /// With no current entry every entry is upcoming.
    pub fn at(position: usize, current: Option<usize>) -> Self {
        match current {
            Some(current) if position < current => EntryState::History,
            Some(current) if position == current => EntryState::Current,
            _ => EntryState::Upcoming,
        }
    }
}

/// A position in the playback queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Entry identity
    pub key: EntryKey,

    /// Track queued at this position
    pub track_id: TrackId,

    /// Derived visual state
    pub state: EntryState,
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing loaded
    Idle,

    /// Resolving and loading a track
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track (or stopped at the end of the queue)
    Paused,
}

impl PlaybackState {
    /// Lowercase name used by the JS bindings and logs
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }
}

/// Format a playback position as `m:ss`
///
/// Minutes are not padded and may exceed 59, matching the position label
/// under the track slider.
pub fn format_position(position: Duration) -> String {
    let total = position.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}
