//! Playback events
//!
//! The controller queues these as it changes state; the host drains them
//! after each call and updates the page (now-playing text, play button,
//! slider, volume icon).

use crate::types::PlaybackState;
use crate::volume::VolumeLevel;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A different track became the audible one
    TrackChanged {
        /// ID of the new track
        track_id: String,
        /// ID of the track it replaced, if any
        previous_track_id: Option<String>,
    },

    /// Now-playing line for the player bar
    NowPlaying {
        /// Track name
        name: String,
        /// Artist name
        artist_name: String,
    },

    /// Track reached its end
    TrackFinished {
        /// ID of the finished track
        track_id: String,
    },

    /// Position update for the track slider
    PositionUpdate {
        /// Current position in seconds
        position_secs: f64,
        /// Total duration in seconds, when known
        duration_secs: Option<f64>,
        /// `m:ss` label for the position
        display: String,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Level (0.0-1.0), unaffected by mute
        volume: f32,
        /// Whether audio is muted
        muted: bool,
        /// Icon bucket
        level: VolumeLevel,
    },

    /// Queue changed (tracks added, removed or reordered)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Shuffle toggled
    ShuffleChanged {
        /// Whether the queue is now shuffled
        shuffled: bool,
    },

    /// The queue emptied and the audio session was torn down
    PlaybackStopped,

    /// Error occurred during playback
    Error {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlaybackEvent::StateChanged {
            state: PlaybackState::Playing,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "stateChanged");
        assert_eq!(json["state"], "Playing");
    }

    #[test]
    fn unit_event_serializes() {
        let json = serde_json::to_value(PlaybackEvent::PlaybackStopped).unwrap();
        assert_eq!(json["type"], "playbackStopped");
    }
}
