/// Core traits for Cadence
use crate::error::Result;
use crate::types::{TrackDetails, TrackId};
use async_trait::async_trait;

/// Resolves a track identifier to the data needed to play it
///
/// The catalog client implements this over `GET /songs/:id`. Resolution is a
/// suspension point: callers must not assume queue state is unchanged once it
/// returns.
///
/// Futures are not required to be `Send`; the player runs on a single
/// cooperative thread (the browser event loop).
#[async_trait(?Send)]
pub trait TrackResolver {
    /// Look up name, artist and stream URL for `id`
    ///
    /// # Errors
    /// Returns `CadenceError::NotFound` for an unknown id and
    /// `CadenceError::Network` when the catalog cannot be reached
    async fn resolve(&self, id: &TrackId) -> Result<TrackDetails>;
}
