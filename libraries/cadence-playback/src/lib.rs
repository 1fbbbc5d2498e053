//! Cadence - Playback Queue
//!
//! Platform-agnostic playback queue and controller for the Cadence player.
//!
//! This crate provides:
//! - `QueueModel`: ordered entries with a current pointer, history and
//!   upcoming derived from it
//! - `QueueView`: row projection kept parallel to the model, with drag
//!   target selection and filtering
//! - Shuffle (Fisher-Yates) with exact restore
//! - Volume with mute that keeps the level
//! - `PlaybackController`: one audio session at a time, stale-load guard,
//!   next/previous/ended handling
//!
//! # Architecture
//!
//! `cadence-playback` never touches the network or decodes audio. Track
//! lookup comes in through `cadence_core::TrackResolver` and audio through
//! the [`AudioBackend`] / [`AudioPlayer`] traits. The `wasm` feature adds an
//! `HtmlAudioElement` backend and JavaScript bindings.
//!
//! # Example: Building a Queue
//!
//! ```rust
//! use cadence_core::TrackId;
//! use cadence_playback::{EntryState, QueueModel};
//!
//! let tracks: Vec<TrackId> = ["a", "b", "c"].into_iter().map(TrackId::from).collect();
//!
//! let mut queue = QueueModel::new();
//! queue.build_from(&tracks, &TrackId::from("b")).unwrap();
//!
//! let states: Vec<EntryState> = queue.entries().iter().map(|e| e.state).collect();
//! assert_eq!(states, [EntryState::History, EntryState::Current, EntryState::Upcoming]);
//!
//! queue.insert_next(TrackId::from("x"));
//! assert_eq!(queue.entry(2).unwrap().track_id, TrackId::from("x"));
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use cadence_playback::{AudioBackend, AudioPlayer, PlayFuture, PlaybackController, Result};
//! use std::time::Duration;
//! use url::Url;
//!
//! struct MyPlayer { /* platform handle */ }
//!
//! impl AudioPlayer for MyPlayer {
//!     fn play(&mut self) -> PlayFuture { Box::pin(async { Ok(()) }) }
//!     fn pause(&mut self) {}
//!     fn is_paused(&self) -> bool { true }
//!     fn position(&self) -> Duration { Duration::ZERO }
//!     fn set_position(&mut self, _position: Duration) {}
//!     fn duration(&self) -> Option<Duration> { None }
//!     fn volume(&self) -> f32 { 1.0 }
//!     fn set_volume(&mut self, _volume: f32) {}
//!     fn is_muted(&self) -> bool { false }
//!     fn set_muted(&mut self, _muted: bool) {}
//! }
//!
//! struct MyBackend;
//!
//! impl AudioBackend for MyBackend {
//!     type Player = MyPlayer;
//!     fn load(&mut self, _url: &Url) -> Result<MyPlayer> { Ok(MyPlayer {}) }
//! }
//!
//! let mut controller = PlaybackController::new(MyBackend);
//! controller.set_volume(0.5);
//! ```

pub mod controller;
mod error;
pub mod events;
pub mod player;
pub mod queue;
pub mod session;
mod shuffle;
pub mod types;
pub mod view;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use controller::{PendingStart, PlayTicket, PlaybackController, StartOutcome, Step};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use player::{AudioBackend, AudioPlayer, PlayFuture};
pub use queue::{QueueChange, QueueModel, RemoveOutcome, UnshuffledSnapshot};
pub use session::{PlaybackSession, SessionId};
pub use shuffle::fisher_yates;
pub use types::{format_position, EntryKey, EntryState, PlaybackState, QueueEntry};
pub use view::{QueueRow, QueueView, RowBox, RowPatch};
pub use volume::{Volume, VolumeLevel};
