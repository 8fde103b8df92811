//! # Sync Configuration
//!
//! TOML-backed configuration for the sync engine.
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [remote]
//! url = "http://192.168.1.10:3000"
//!
//! [sync]
//! interval_secs = 30
//! event_buffer = 64
//! ```
//!
//! The file lives under the platform config directory
//! (`~/.config/cantina/sync.toml` on Linux); missing file or missing keys
//! fall back to defaults.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SyncError, SyncResult};

/// Remote endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the remote store.
    #[serde(default = "default_remote_url")]
    pub url: String,
}

fn default_remote_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            url: default_remote_url(),
        }
    }
}

/// Sync behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Seconds between sync cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Event bus capacity (undelivered events buffered per subscriber).
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_interval_secs() -> u64 {
    30
}

fn default_event_buffer() -> usize {
    64
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            interval_secs: default_interval_secs(),
            event_buffer: default_event_buffer(),
        }
    }
}

/// Complete sync engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub sync: SyncSettings,
}

impl SyncConfig {
    /// Default config file path under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cantina").map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    /// Loads the config from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No sync config file; using defaults");
            return Ok(SyncConfig::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> SyncResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        Ok(())
    }

    /// Checks the config for values the engine cannot run with.
    pub fn validate(&self) -> SyncResult<()> {
        if !self.remote.url.starts_with("http://") && !self.remote.url.starts_with("https://") {
            return Err(SyncError::InvalidConfig(format!(
                "remote.url must be an http(s) URL, got '{}'",
                self.remote.url
            )));
        }
        if self.sync.interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "sync.interval_secs must be at least 1".into(),
            ));
        }
        // broadcast::channel panics on a zero capacity.
        if self.sync.event_buffer == 0 {
            return Err(SyncError::InvalidConfig(
                "sync.event_buffer must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.sync.interval_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SyncConfig = toml::from_str(
            r#"
            [remote]
            url = "http://192.168.1.10:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.remote.url, "http://192.168.1.10:3000");
        assert_eq!(config.sync.interval_secs, 30);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = SyncConfig::default();
        config.remote.url = "192.168.1.10:3000".into();
        assert!(config.validate().is_err());

        let mut config = SyncConfig::default();
        config.sync.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = SyncConfig::default();
        config.sync.event_buffer = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = std::env::temp_dir().join("cantina-sync-config-test");
        let path = dir.join("sync.toml");

        let mut config = SyncConfig::default();
        config.remote.url = "http://10.0.0.5:3000".into();
        config.save(&path).unwrap();

        let loaded = SyncConfig::load(&path).unwrap();
        assert_eq!(loaded.remote.url, "http://10.0.0.5:3000");

        std::fs::remove_dir_all(&dir).ok();
    }
}
