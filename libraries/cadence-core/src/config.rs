/// Player configuration
use crate::error::{CadenceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `CADENCE_CATALOG__BASE_URL`
const ENV_PREFIX: &str = "CADENCE";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub playback: PlaybackSettings,
}

/// Where the remote catalog lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Initial state of the player controls
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Linear volume, 0.0 to 1.0
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    #[serde(default)]
    pub start_muted: bool,
}

impl AppConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Later sources win: built-in defaults, then the file, then
    /// `CADENCE_`-prefixed variables (`__` separates section and key).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                settings = settings.add_source(config::File::from(path));
            } else {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.catalog.base_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CadenceError::Config(format!(
                "catalog.base_url must start with http:// or https:// (got {:?})",
                self.catalog.base_url
            )));
        }

        if !(0.0..=1.0).contains(&self.playback.initial_volume) {
            return Err(CadenceError::Config(format!(
                "playback.initial_volume must be between 0 and 1 (got {})",
                self.playback.initial_volume
            )));
        }

        Ok(())
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            initial_volume: default_initial_volume(),
            start_muted: false,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_initial_volume() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.catalog.base_url, "http://localhost:3000");
        assert_eq!(config.catalog.timeout_secs, 30);
        assert_eq!(config.catalog.connect_timeout_secs, 10);
        assert_eq!(config.playback.initial_volume, 1.0);
        assert!(!config.playback.start_muted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[catalog]\nbase_url = \"https://music.example.com\"\n\n[playback]\ninitial_volume = 0.4").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.catalog.base_url, "https://music.example.com");
        assert_eq!(config.catalog.timeout_secs, 30);
        assert!((config.playback.initial_volume - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.catalog, CatalogSettings::default());
    }

    #[test]
    fn rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.catalog.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(CadenceError::Config(_))));
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let mut config = AppConfig::default();
        config.playback.initial_volume = 1.5;
        assert!(config.validate().is_err());
    }
}
