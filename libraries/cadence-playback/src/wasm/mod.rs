//! WASM bindings for cadence-playback
//!
//! An `HtmlAudioElement` audio backend plus a JavaScript-facing wrapper
//! around `PlaybackController`.

pub mod audio;
pub mod player;

pub use audio::{HtmlAudioBackend, HtmlAudioPlayer};
pub use player::WasmPlayer;
