/// Catalog entries as served by the remote API
use super::ids::{PlaylistId, TrackId};
use serde::{Deserialize, Serialize};
use url::Url;

/// A song in the catalog (`GET /songs`, `GET /playlists/songs/:id`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Track identifier
    pub id: TrackId,

    /// Display name
    pub name: String,

    /// Artist display name
    pub artist_name: String,

    /// Server-side file path; only its trailing segment is meaningful to clients
    #[serde(default)]
    pub filepath: String,
}

/// An artist entry (`GET /artists`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Artist display name
    pub artist_name: String,
}

/// A playlist header (`GET /playlists`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,
}

/// Everything playback needs to load one track
///
/// Resolved on demand from the catalog; never stored in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDetails {
    /// Track identifier the details were resolved for
    pub id: TrackId,

    /// Display name
    pub name: String,

    /// Artist display name
    pub artist_name: String,

    /// Locator of the audio resource
    pub stream_url: Url,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_from_api_json() {
        let song: Song = serde_json::from_str(
            r#"{ "id": 12, "name": "Blue", "artist_name": "Joni", "filepath": "D:\\music\\blue.mp3" }"#,
        )
        .unwrap();

        assert_eq!(song.id, TrackId::new("12"));
        assert_eq!(song.name, "Blue");
        assert_eq!(song.artist_name, "Joni");
    }

    #[test]
    fn song_without_filepath() {
        let song: Song =
            serde_json::from_str(r#"{ "id": "x", "name": "A", "artist_name": "B" }"#).unwrap();
        assert!(song.filepath.is_empty());
    }

    #[test]
    fn playlist_from_api_json() {
        let playlist: Playlist = serde_json::from_str(r#"{ "id": 5, "name": "Road trip" }"#).unwrap();
        assert_eq!(playlist.id, PlaylistId::new("5"));
        assert_eq!(playlist.name, "Road trip");
    }
}
