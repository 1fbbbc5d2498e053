//! Library listings from the catalog API.

use crate::client::{expect_json, CatalogClient};
use crate::error::{CatalogError, Result};
use crate::types::{ArtistsResponse, LibrarySnapshot, PlaylistsResponse, SongDetails, SongsResponse};
use cadence_core::{Artist, Playlist, PlaylistId, Song, TrackId};
use reqwest::StatusCode;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Library client for the catalog API.
pub struct LibraryClient<'a> {
    client: &'a CatalogClient,
}

impl<'a> LibraryClient<'a> {
    pub(crate) fn new(client: &'a CatalogClient) -> Self {
        Self { client }
    }

    /// Get every song (`GET /songs`).
    pub async fn list_songs(&self) -> Result<Vec<Song>> {
        let url = self.client.endpoint(&["songs"])?;
        debug!(url = %url, "Fetching songs");

        let response = self.client.http().get(url).send().await?;
        let body: SongsResponse = expect_json(response, StatusCode::OK, "songs").await?;

        debug!(count = body.songs.len(), "Fetched songs");
        Ok(body.songs)
    }

    /// Get every artist (`GET /artists`).
    pub async fn list_artists(&self) -> Result<Vec<Artist>> {
        let url = self.client.endpoint(&["artists"])?;
        debug!(url = %url, "Fetching artists");

        let response = self.client.http().get(url).send().await?;
        let body: ArtistsResponse = expect_json(response, StatusCode::OK, "artists").await?;

        debug!(count = body.artists.len(), "Fetched artists");
        Ok(body.artists)
    }

    /// Get every playlist header (`GET /playlists`).
    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let url = self.client.endpoint(&["playlists"])?;
        debug!(url = %url, "Fetching playlists");

        let response = self.client.http().get(url).send().await?;
        let body: PlaylistsResponse = expect_json(response, StatusCode::OK, "playlists").await?;

        debug!(count = body.playlists.len(), "Fetched playlists");
        Ok(body.playlists)
    }

    /// Get the songs of one playlist (`GET /playlists/songs/:id`).
    pub async fn playlist_songs(&self, id: &PlaylistId) -> Result<Vec<Song>> {
        let url = self.client.endpoint(&["playlists", "songs", id.as_str()])?;
        debug!(url = %url, "Fetching playlist songs");

        let response = self.client.http().get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                entity: "playlist",
                id: id.to_string(),
            });
        }
        let body: SongsResponse = expect_json(response, StatusCode::OK, "playlist songs").await?;

        Ok(body.songs)
    }

    /// Get name, artist and file path of one song (`GET /songs/:id`).
    pub async fn song_details(&self, id: &TrackId) -> Result<SongDetails> {
        let url = self.client.endpoint(&["songs", id.as_str()])?;
        debug!(url = %url, "Fetching song details");

        let response = self.client.http().get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                entity: "song",
                id: id.to_string(),
            });
        }

        expect_json(response, StatusCode::OK, "song details").await
    }

    /// Fetch songs, artists and playlists for the library pane.
    ///
    /// Sections load concurrently and independently: a section that fails is
    /// logged and left empty. Songs are sorted by name then artist, artists
    /// by name, both ignoring case.
    pub async fn load_library(&self) -> LibrarySnapshot {
        let (songs, artists, playlists) =
            tokio::join!(self.list_songs(), self.list_artists(), self.list_playlists());

        let mut snapshot = LibrarySnapshot {
            songs: section("songs", songs),
            artists: section("artists", artists),
            playlists: section("playlists", playlists),
        };

        snapshot.songs.sort_by(|a, b| {
            caseless(&a.name, &b.name).then_with(|| caseless(&a.artist_name, &b.artist_name))
        });
        snapshot
            .artists
            .sort_by(|a, b| caseless(&a.artist_name, &b.artist_name));

        snapshot
    }
}

fn section<T>(name: &str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(section = name, error = %e, "Failed to load library section");
        Vec::new()
    })
}

fn caseless(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
