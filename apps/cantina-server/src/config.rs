//! Server configuration from environment variables.

use std::env;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the SQLite database file. Env: `CANTINA_SERVER_DB`.
    pub database_path: String,

    /// Bind address for the HTTP listener. Env: `CANTINA_SERVER_ADDR`.
    pub bind_addr: String,
}

impl ServerConfig {
    /// Loads configuration from the environment, falling back to defaults
    /// suitable for a LAN deployment.
    pub fn load() -> Self {
        ServerConfig {
            database_path: env::var("CANTINA_SERVER_DB")
                .unwrap_or_else(|_| "cantina-server.db".to_string()),
            bind_addr: env::var("CANTINA_SERVER_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}
