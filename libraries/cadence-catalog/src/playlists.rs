//! Playlist management.
//!
//! Nothing is changed locally on failure: callers refresh their playlist
//! list only after one of these calls returns `Ok`.

use crate::client::{expect_json, status_error, CatalogClient};
use crate::error::{CatalogError, Result};
use crate::types::{
    CreatePlaylistRequest, CreatedPlaylistResponse, RenamePlaylistRequest, UpdatedPlaylistResponse,
};
use cadence_core::{Playlist, PlaylistId};
use reqwest::StatusCode;
use tracing::{debug, info};

/// Playlist client for the catalog API.
pub struct PlaylistClient<'a> {
    client: &'a CatalogClient,
}

impl<'a> PlaylistClient<'a> {
    pub(crate) fn new(client: &'a CatalogClient) -> Self {
        Self { client }
    }

    /// Create a playlist (`POST /playlists`, expects 201).
    ///
    /// A blank name is rejected without a request.
    pub async fn create(&self, name: &str) -> Result<Playlist> {
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidInput(
                "Playlist name cannot be empty".into(),
            ));
        }

        let url = self.client.endpoint(&["playlists"])?;
        debug!(url = %url, name, "Creating playlist");

        let response = self
            .client
            .http()
            .post(url)
            .json(&CreatePlaylistRequest { name })
            .send()
            .await?;
        let body: CreatedPlaylistResponse =
            expect_json(response, StatusCode::CREATED, "created playlist").await?;

        let record = body.created_playlist;
        info!(id = %record.id, name, "Playlist created");
        Ok(Playlist {
            id: record.id,
            name: record.name.unwrap_or_else(|| name.to_string()),
        })
    }

    /// Rename a playlist (`PATCH /playlists`, expects 200).
    ///
    /// A blank name, or one equal to the current name, is rejected without a
    /// request.
    pub async fn rename(&self, playlist: &Playlist, new_name: &str) -> Result<Playlist> {
        if new_name.trim().is_empty() {
            return Err(CatalogError::InvalidInput(
                "Playlist name cannot be empty".into(),
            ));
        }
        if new_name == playlist.name {
            return Err(CatalogError::InvalidInput(format!(
                "Playlist is already named {new_name:?}"
            )));
        }

        let url = self.client.endpoint(&["playlists"])?;
        debug!(url = %url, id = %playlist.id, new_name, "Renaming playlist");

        let response = self
            .client
            .http()
            .patch(url)
            .json(&RenamePlaylistRequest {
                id: &playlist.id,
                name: new_name,
            })
            .send()
            .await?;
        let body: UpdatedPlaylistResponse =
            expect_json(response, StatusCode::OK, "updated playlist").await?;

        let record = body.updated_playlist;
        info!(id = %record.id, new_name, "Playlist renamed");
        Ok(Playlist {
            id: record.id,
            name: record.name.unwrap_or_else(|| new_name.to_string()),
        })
    }

    /// Delete a playlist (`DELETE /playlists/:id`, expects 200).
    pub async fn delete(&self, id: &PlaylistId) -> Result<()> {
        let url = self.client.endpoint(&["playlists", id.as_str()])?;
        debug!(url = %url, "Deleting playlist");

        let response = self.client.http().delete(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(status_error(response).await);
        }

        info!(id = %id, "Playlist deleted");
        Ok(())
    }
}
