//! The single live audio session

use crate::player::AudioPlayer;
use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one audio session
///
/// Player callbacks carry the session id they were registered for, so
/// notifications from a replaced player can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// A loaded player plus the track it holds
pub struct PlaybackSession<P> {
    id: SessionId,
    track_id: TrackId,
    player: P,
}

impl<P: AudioPlayer> PlaybackSession<P> {
    pub(crate) fn new(id: SessionId, track_id: TrackId, player: P) -> Self {
        Self {
            id,
            track_id,
            player,
        }
    }

    /// Session id
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Track loaded in this session
    pub fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    /// Underlying player
    pub fn player(&self) -> &P {
        &self.player
    }

    /// Underlying player, mutably
    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Pause and release the player
    pub(crate) fn close(mut self) {
        self.player.pause();
        tracing::debug!(session = %self.id, track = %self.track_id, "Session closed");
    }
}

impl<P> fmt::Debug for PlaybackSession<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("track_id", &self.track_id)
            .finish_non_exhaustive()
    }
}
