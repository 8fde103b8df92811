//! # Sync Error Types
//!
//! Errors from the sync engine itself. Note what is NOT here: remote
//! failures. Push and pull absorb [`cantina_remote::RemoteError`] per entry
//! (drop, retry, or skip) - a remote failure is a routine input to the
//! engine, not a failure of it. Only local-store and configuration problems
//! propagate.

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Error from the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Local store failure. Fatal for the current cycle.
    #[error(transparent)]
    Database(#[from] cantina_db::DbError),

    /// A queued payload failed to parse back into JSON.
    #[error("Corrupt queue payload: {0}")]
    CorruptPayload(#[from] serde_json::Error),

    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}
