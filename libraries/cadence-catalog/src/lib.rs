//! Cadence Catalog Client
//!
//! HTTP client for the remote catalog API that serves songs, artists and
//! playlists to the player.
//!
//! # Features
//!
//! - Library listings (`/songs`, `/artists`, `/playlists`, playlist songs)
//! - Playlist create, rename and delete with the UI's name rules
//! - Stream URL derivation from a song's server-side file path
//! - `TrackResolver` implementation for the playback controller
//!
//! # Example
//!
//! ```ignore
//! use cadence_catalog::CatalogClient;
//! use cadence_core::{AppConfig, TrackResolver};
//!
//! let config = AppConfig::load(None)?;
//! let client = CatalogClient::new(&config.catalog)?;
//!
//! let library = client.library().load_library().await;
//! let details = client.resolve(&library.songs[0].id).await?;
//! println!("Streaming {}", details.stream_url);
//! ```

mod client;
mod error;
mod library;
mod playlists;
mod resolver;
pub mod types;

pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use library::LibraryClient;
pub use playlists::PlaylistClient;
pub use types::{LibrarySnapshot, SongDetails};
