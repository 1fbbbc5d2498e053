//! Main catalog client.

use crate::error::{CatalogError, Result};
use crate::library::LibraryClient;
use crate::playlists::PlaylistClient;
use cadence_core::CatalogSettings;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client for the remote catalog API.
///
/// Cheap to share by reference; library and playlist operations are reached
/// through borrowed sub-clients.
///
/// # Example
///
/// ```ignore
/// use cadence_catalog::CatalogClient;
/// use cadence_core::CatalogSettings;
///
/// let client = CatalogClient::new(&CatalogSettings::default())?;
///
/// let library = client.library().load_library().await;
/// println!("{} songs", library.songs.len());
///
/// let playlist = client.playlists().create("Road trip").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new client for the configured catalog.
    pub fn new(settings: &CatalogSettings) -> Result<Self> {
        let raw = settings.base_url.trim();
        if raw.is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }
        if !raw.starts_with("http://") && !raw.starts_with("https://") {
            return Err(CatalogError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let base_url = Url::parse(raw).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(format!("{raw} cannot be a base URL")));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(format!("Cadence/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Base URL of the catalog API.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Song, artist and playlist listings.
    pub fn library(&self) -> LibraryClient<'_> {
        LibraryClient::new(self)
    }

    /// Playlist create, rename and delete.
    pub fn playlists(&self) -> PlaylistClient<'_> {
        PlaylistClient::new(self)
    }

    /// Static-asset URL for a song's server-side `filepath`.
    ///
    /// Only the trailing path segment (after the last `\` or `/`) is used;
    /// it is percent-encoded and placed directly under the base URL.
    pub fn stream_url(&self, filepath: &str) -> Result<Url> {
        let file_name = filepath.rsplit(['\\', '/']).next().unwrap_or_default();
        if file_name.is_empty() {
            return Err(CatalogError::InvalidInput(format!(
                "No file name in path {filepath:?}"
            )));
        }

        self.endpoint(&[file_name])
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Decode a JSON body if `response` has the `expected` status.
pub(crate) async fn expect_json<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
    what: &str,
) -> Result<T> {
    let status = response.status();

    if status == expected {
        let body = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("Failed to parse {what}: {e}")))?;
        debug!(status = status.as_u16(), what, "Catalog response");
        Ok(body)
    } else {
        Err(status_error(response).await)
    }
}

/// Turn an unexpected response into `CatalogError::Status`.
pub(crate) async fn status_error(response: Response) -> CatalogError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    CatalogError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> Result<CatalogClient> {
        CatalogClient::new(&CatalogSettings {
            base_url: base_url.to_string(),
            ..CatalogSettings::default()
        })
    }

    #[test]
    fn test_rejects_empty_url() {
        assert!(matches!(client("  "), Err(CatalogError::InvalidUrl(msg)) if msg.contains("empty")));
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(client("ftp://example.com"), Err(CatalogError::InvalidUrl(_))));
    }

    #[test]
    fn test_stream_url_uses_windows_file_name() {
        let client = client("http://localhost:3000").unwrap();
        let url = client
            .stream_url(r"C:\music\Artist\01 Intro.mp3")
            .unwrap();

        assert_eq!(url.as_str(), "http://localhost:3000/01%20Intro.mp3");
    }

    #[test]
    fn test_stream_url_uses_unix_file_name() {
        let client = client("http://localhost:3000/").unwrap();
        let url = client.stream_url("/srv/music/track#1?.mp3").unwrap();

        assert_eq!(url.as_str(), "http://localhost:3000/track%231%3F.mp3");
    }

    #[test]
    fn test_stream_url_keeps_base_path() {
        let client = client("https://music.example.com/api/").unwrap();
        let url = client.stream_url("song.ogg").unwrap();

        assert_eq!(url.as_str(), "https://music.example.com/api/song.ogg");
    }

    #[test]
    fn test_stream_url_needs_file_name() {
        let client = client("http://localhost:3000").unwrap();
        assert!(matches!(
            client.stream_url(r"C:\music\"),
            Err(CatalogError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("http://localhost:3000").unwrap();
        let url = client.endpoint(&["playlists", "songs", "a b"]).unwrap();

        assert_eq!(url.as_str(), "http://localhost:3000/playlists/songs/a%20b");
    }
}
