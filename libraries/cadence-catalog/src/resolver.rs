//! Track resolution for playback.

use crate::client::CatalogClient;
use async_trait::async_trait;
use cadence_core::{TrackDetails, TrackId, TrackResolver};
use tracing::debug;

#[async_trait(?Send)]
impl TrackResolver for CatalogClient {
    async fn resolve(&self, id: &TrackId) -> cadence_core::Result<TrackDetails> {
        let song = self.library().song_details(id).await?;
        let stream_url = self.stream_url(&song.filepath)?;
        debug!(track = %id, url = %stream_url, "Resolved track");

        Ok(TrackDetails {
            id: id.clone(),
            name: song.name,
            artist_name: song.artist_name,
            stream_url,
        })
    }
}
