//! rowcast configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{CastError, CastResult};
use crate::types::{TemporalDecoder, Zone};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "rowcast.toml";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timezone: TimezoneSettings,
    pub log: LogSettings,
}

/// `[timezone]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimezoneSettings {
    /// Session timezone context, e.g. `"Europe/Berlin"` or `"+02:00"`
    pub server: Option<String>,

    /// Client zone; `"local"` or absent means the process's local zone
    pub client: Option<String>,
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must exist. Otherwise `./rowcast.toml` and then
    /// `<config_dir>/rowcast/config.toml` are tried, and defaults are used
    /// when neither is present.
    pub fn load(path: Option<&Path>) -> CastResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> CastResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CastError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded config");
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> CastResult<Self> {
        toml::from_str(content).map_err(|e| CastError::Config(format!("Invalid config: {}", e)))
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("rowcast").join("config.toml"));
        }
        paths
    }

    /// Parsed session timezone context, if configured.
    pub fn server_zone(&self) -> Option<Zone> {
        self.timezone
            .server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Zone::parse_context)
    }

    pub fn client_zone(&self) -> Zone {
        self.timezone
            .client
            .as_deref()
            .map(Zone::parse_client)
            .unwrap_or_default()
    }

    pub fn decoder(&self) -> TemporalDecoder {
        TemporalDecoder::new(self.client_zone(), self.server_zone())
    }

    /// Override the session timezone context.
    pub fn with_server(mut self, zone: impl Into<String>) -> Self {
        self.timezone.server = Some(zone.into());
        self
    }

    /// Override the client zone.
    pub fn with_client(mut self, zone: impl Into<String>) -> Self {
        self.timezone.client = Some(zone.into());
        self
    }
}
