//! # Settings Repository
//!
//! Key → JSON value configuration store with upsert semantics. Defaults are
//! seeded on startup so the statistics layer never reads a missing key.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use cantina_core::{Setting, DEFAULT_ACTIVE_DAYS_PER_WEEK, DEFAULT_SAFETY_MARGIN_PERCENT};

/// Raw row shape: the value column is JSON text.
#[derive(sqlx::FromRow)]
struct SettingRow {
    key: String,
    value: String,
    updated_at: DateTime<Utc>,
}

impl SettingRow {
    fn into_setting(self) -> DbResult<Setting> {
        Ok(Setting {
            key: self.key,
            value: serde_json::from_str(&self.value)?,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for settings operations.
#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    /// Creates a new SettingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingRepository { pool }
    }

    /// Gets a setting value by key.
    pub async fn get(&self, key: &str) -> DbResult<Option<serde_json::Value>> {
        let row = sqlx::query_as::<_, SettingRow>(
            "SELECT key, value, updated_at FROM settings WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SettingRow::into_setting).transpose()?.map(|s| s.value))
    }

    /// Upserts a setting. Last writer wins, no history.
    pub async fn set(&self, key: &str, value: &serde_json::Value) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::set_in(&mut conn, key, value).await
    }

    /// Upserts a setting inside an ongoing transaction.
    pub async fn set_in(
        conn: &mut SqliteConnection,
        key: &str,
        value: &serde_json::Value,
    ) -> DbResult<()> {
        let json = serde_json::to_string(value)?;

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                           updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(json)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Lists all settings.
    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        let rows = sqlx::query_as::<_, SettingRow>(
            "SELECT key, value, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SettingRow::into_setting).collect()
    }

    /// Seeds default values for any missing keys. Existing values are never
    /// overwritten, so user edits survive restarts.
    pub async fn ensure_defaults(&self) -> DbResult<()> {
        let defaults = [
            ("activeDaysPerWeek", json!(DEFAULT_ACTIVE_DAYS_PER_WEEK)),
            ("safetyMarginPercent", json!(DEFAULT_SAFETY_MARGIN_PERCENT)),
            ("lowStockAlerts", json!(true)),
        ];

        for (key, value) in defaults {
            let json = serde_json::to_string(&value)?;
            sqlx::query(
                r#"
                INSERT INTO settings (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO NOTHING
                "#,
            )
            .bind(key)
            .bind(json)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_set_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.settings().set("activeDaysPerWeek", &json!(5)).await.unwrap();
        let value = db.settings().get("activeDaysPerWeek").await.unwrap();
        assert_eq!(value, Some(json!(5)));

        let missing = db.settings().get("nonsense").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.settings().set("safetyMarginPercent", &json!(30)).await.unwrap();
        db.settings().set("safetyMarginPercent", &json!(50)).await.unwrap();

        let value = db.settings().get("safetyMarginPercent").await.unwrap();
        assert_eq!(value, Some(json!(50)));
    }

    #[tokio::test]
    async fn test_defaults_never_clobber_user_values() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.settings().set("activeDaysPerWeek", &json!(6)).await.unwrap();
        db.settings().ensure_defaults().await.unwrap();

        assert_eq!(
            db.settings().get("activeDaysPerWeek").await.unwrap(),
            Some(json!(6))
        );
        // Missing keys were filled in.
        assert_eq!(
            db.settings().get("safetyMarginPercent").await.unwrap(),
            Some(json!(DEFAULT_SAFETY_MARGIN_PERCENT))
        );
        assert_eq!(
            db.settings().get("lowStockAlerts").await.unwrap(),
            Some(json!(true))
        );
    }
}
