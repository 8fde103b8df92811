//! Database layer for the server.
//!
//! SQLite with WAL, same engine as the client stores but its own schema: the
//! server's id space is never unified with a store's, and the products table
//! has no stock floor (clamping is a client-side import concern).

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{ApiError, ApiResult};

/// Embedded migrations, compiled into the binary.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Server database handle.
#[derive(Debug, Clone)]
pub struct ServerDb {
    pool: SqlitePool,
}

impl ServerDb {
    /// Opens (creating if missing) the database at `path` and runs
    /// migrations.
    pub async fn connect(path: &str) -> ApiResult<Self> {
        let connect_options = SqliteConnectOptions::from_str(&format!("sqlite://{path}?mode=rwc"))
            .map_err(|e| ApiError::Database(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_options)
            .await?;

        let db = ServerDb { pool };
        db.run_migrations().await?;

        info!(%path, "Server database ready");
        Ok(db)
    }

    /// In-memory database for tests. Single connection: SQLite gives every
    /// in-memory connection its own database.
    pub async fn in_memory() -> ApiResult<Self> {
        let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| ApiError::Database(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        let db = ServerDb { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> ApiResult<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Database(e.to_string()))
    }

    /// Returns the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks that the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
