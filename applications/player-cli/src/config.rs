/// Player configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use soul_playback::PlaybackConfig;
use std::path::{Path, PathBuf};

/// Config file read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "soul-player.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_catalog")]
    pub catalog: CatalogSettings,

    #[serde(default = "default_backend")]
    pub backend: BackendSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Artificial delay added to every load, to mimic slow media engines
    #[serde(default)]
    pub load_latency_ms: u64,

    /// Elapsed-clock period; 0 disables the clock
    #[serde(default)]
    pub clock_ms: u64,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `soul-player.toml` in the
    /// working directory is read if present. Environment variables prefixed
    /// with `SOUL_` override file values, with `__` between nested keys
    /// (`SOUL_PLAYBACK__PROBE_TIMEOUT_MS=250`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SOUL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playback.probe_timeout_ms == 0 {
            return Err(CliError::Config(
                "playback.probe_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.playback.command_capacity == 0 || self.playback.event_capacity == 0 {
            return Err(CliError::Config(
                "playback channel capacities must be greater than zero".to_string(),
            ));
        }

        if !self.catalog.path.is_file() {
            return Err(CliError::Config(format!(
                "Catalog not found at {:?} (set SOUL_CATALOG__PATH)",
                self.catalog.path
            )));
        }

        Ok(())
    }
}

// Default values
fn default_catalog() -> CatalogSettings {
    CatalogSettings {
        path: default_catalog_path(),
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.json")
}

fn default_backend() -> BackendSettings {
    BackendSettings {
        load_latency_ms: 0,
        clock_ms: 0,
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            catalog: default_catalog(),
            backend: default_backend(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soul_playback::RepeatMode;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [playback]
            probe_timeout_ms = 750
            repeat = "list"

            [catalog]
            path = "/srv/music/catalog.json"

            [backend]
            load_latency_ms = 20
            "#,
        );

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.playback.probe_timeout_ms, 750);
        assert_eq!(config.playback.repeat, RepeatMode::List);
        assert_eq!(config.playback.command_capacity, 32);
        assert_eq!(config.catalog.path, PathBuf::from("/srv/music/catalog.json"));
        assert_eq!(config.backend.load_latency_ms, 20);
        assert_eq!(config.backend.clock_ms, 0);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = CliConfig::load(Some(Path::new("/nonexistent/soul-player.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn validate_requires_catalog_file() {
        let config = CliConfig {
            catalog: CatalogSettings {
                path: PathBuf::from("/nonexistent/catalog.json"),
            },
            ..CliConfig::default()
        };
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_probe_timeout() {
        let catalog = tempfile::NamedTempFile::new().unwrap();
        let mut config = CliConfig {
            catalog: CatalogSettings {
                path: catalog.path().to_path_buf(),
            },
            ..CliConfig::default()
        };
        assert!(config.validate().is_ok());

        config.playback.probe_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
