//! Wire types for the catalog API.

use cadence_core::{Artist, Playlist, PlaylistId, Song, TrackId};
use serde::{Deserialize, Serialize};

/// `GET /songs`, `GET /playlists/songs/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct SongsResponse {
    #[serde(default)]
    pub songs: Vec<Song>,
}

/// `GET /artists`
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistsResponse {
    #[serde(default)]
    pub artists: Vec<Artist>,
}

/// `GET /playlists`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

/// `GET /songs/:id`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SongDetails {
    pub name: String,
    pub artist_name: String,
    pub filepath: String,
}

/// Body of `POST /playlists`
#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
}

/// Body of `PATCH /playlists`
#[derive(Debug, Clone, Serialize)]
pub struct RenamePlaylistRequest<'a> {
    pub id: &'a PlaylistId,
    pub name: &'a str,
}

/// Playlist row echoed back by create/rename; only `id` is guaranteed
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistRecord {
    pub id: PlaylistId,
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /playlists` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPlaylistResponse {
    pub created_playlist: PlaylistRecord,
}

/// `PATCH /playlists` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedPlaylistResponse {
    pub updated_playlist: PlaylistRecord,
}

/// Everything the library pane shows, fetched in one go
///
/// A section that failed to load is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LibrarySnapshot {
    pub songs: Vec<Song>,
    pub artists: Vec<Artist>,
    pub playlists: Vec<Playlist>,
}

impl LibrarySnapshot {
    /// Song ids in display order, the candidate list for a new queue
    pub fn song_ids(&self) -> Vec<TrackId> {
        self.songs.iter().map(|song| song.id.clone()).collect()
    }
}
