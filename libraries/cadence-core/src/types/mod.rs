mod catalog;
mod ids;

pub use catalog::{Artist, Playlist, Song, TrackDetails};
pub use ids::{PlaylistId, TrackId};
