//! Cadence Core
//!
//! Platform-agnostic core types, traits, configuration and error handling for Cadence.
//!
//! This crate provides the building blocks shared by the playback core and the
//! catalog client.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `Artist`, `Playlist`, `TrackDetails`
//! - **Identifiers**: `TrackId`, `PlaylistId` (accept string or numeric wire ids)
//! - **Core Traits**: `TrackResolver`
//! - **Configuration**: `AppConfig` layered from file and environment
//! - **Error Handling**: Unified `CadenceError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::types::{Song, TrackId};
//!
//! let song: Song = serde_json::from_str(
//!     r#"{ "id": 7, "name": "Intro", "artist_name": "The Band", "filepath": "C:\\music\\intro.mp3" }"#,
//! ).unwrap();
//!
//! assert_eq!(song.id, TrackId::new("7"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, CatalogSettings, PlaybackSettings};
pub use error::{CadenceError, Result};
pub use traits::TrackResolver;
pub use types::{Artist, Playlist, PlaylistId, Song, TrackDetails, TrackId};
