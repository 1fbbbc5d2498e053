//! Platform-agnostic audio player traits
//!
//! The controller never decodes audio. It drives one loaded stream at a time
//! through `AudioPlayer`, and asks an `AudioBackend` to create a player for
//! each track it starts. The browser build implements both over
//! `HtmlAudioElement`; tests use in-memory fakes.

use crate::error::Result;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// Completes once the stream is audible, or fails if the start was refused
///
/// Owns everything it needs, so the player (and the controller holding it)
/// stays free while the start is awaited.
pub type PlayFuture = Pin<Box<dyn Future<Output = Result<()>>>>;

/// One loaded audio stream
pub trait AudioPlayer {
    /// Ask the stream to start or resume
    fn play(&mut self) -> PlayFuture;

    /// Pause playback
    fn pause(&mut self);

    /// Check if the stream is paused
    fn is_paused(&self) -> bool;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Seek to `position`
    fn set_position(&mut self, position: Duration);

    /// Stream duration, once known
    fn duration(&self) -> Option<Duration>;

    /// Element volume (0.0-1.0)
    fn volume(&self) -> f32;

    /// Set element volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);

    /// Check if the element is muted
    fn is_muted(&self) -> bool;

    /// Mute or unmute the element
    fn set_muted(&mut self, muted: bool);
}

/// Factory for audio players
pub trait AudioBackend {
    /// Player type this backend creates
    type Player: AudioPlayer;

    /// Create a player for the stream at `url`
    ///
    /// The player starts paused at position zero.
    fn load(&mut self, url: &Url) -> Result<Self::Player>;
}
