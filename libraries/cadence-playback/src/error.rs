//! Error types for playback management

use cadence_core::{CadenceError, TrackId};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Selected track is absent from the candidate list
    #[error("Track not found in candidates: {0}")]
    NotFound(TrackId),

    /// Unshuffle requested without a prior shuffle
    #[error("No unshuffled snapshot to restore")]
    NoSnapshot,

    /// Operation needs an audio session or state that isn't there
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Audio player error
    #[error("Audio player error: {0}")]
    Audio(String),

    /// Track could not be resolved (network or catalog failure)
    #[error("Track resolution failed: {0}")]
    Resolve(#[from] CadenceError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
