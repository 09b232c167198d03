//! Picker configuration and logging setup.
//!
//! Sources, lowest precedence first: built-in defaults, the JSON file at
//! ~/.location-picker/config.json (or an explicit path), then the
//! PICKER_GEOCODER_ENDPOINT / PICKER_USER_AGENT environment variables.
//! CLI flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::location::{Coordinate, TileLayer};
use crate::picker::OrderingPolicy;

pub const ENV_GEOCODER_ENDPOINT: &str = "PICKER_GEOCODER_ENDPOINT";
pub const ENV_USER_AGENT: &str = "PICKER_USER_AGENT";

/// Tunis.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new_unchecked(36.8065, 10.1815);
const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    /// No timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".into(),
            user_agent: "StreetIncidents/0.1 (location-picker)".into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub default_center: Coordinate,
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub geocoder: GeocoderConfig,
    pub ordering: OrderingPolicy,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_layer: TileLayer::openstreetmap(),
            geocoder: GeocoderConfig::default(),
            ordering: OrderingPolicy::default(),
        }
    }
}

impl PickerConfig {
    /// Load from the default path, falling back to defaults if it does not exist,
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::read_optional(&Self::default_path())?;
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit path (must exist), then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".location-picker")
            .join("config.json")
    }

    fn read_optional(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::read_file(path)
        } else {
            Ok(Self::default())
        }
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_GEOCODER_ENDPOINT).ok(),
            std::env::var(ENV_USER_AGENT).ok(),
        );
    }

    /// Override the geocoder endpoint and user agent when given and non-empty.
    pub fn apply_overrides(&mut self, endpoint: Option<String>, user_agent: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|s| !s.trim().is_empty()) {
            self.geocoder.endpoint = endpoint;
        }
        if let Some(ua) = user_agent.filter(|s| !s.trim().is_empty()) {
            self.geocoder.user_agent = ua;
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the default `info`.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
