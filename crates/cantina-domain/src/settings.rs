//! # Settings Service
//!
//! Thin layer over the settings store: validates the known tuning keys and
//! queues each change for remote upsert so every client converges on the
//! same tuning.

use serde_json::json;

use crate::error::ServiceResult;
use cantina_core::{
    validation::{validate_active_days, validate_percentage},
    QueueAction, Setting, SyncTable,
};
use cantina_db::{Database, PendingOpRepository, SettingRepository};

/// Service for configuration settings.
#[derive(Debug, Clone)]
pub struct SettingsService {
    db: Database,
}

impl SettingsService {
    /// Creates a new SettingsService over the local store.
    pub fn new(db: Database) -> Self {
        SettingsService { db }
    }

    /// All settings, sorted by key.
    pub async fn all(&self) -> ServiceResult<Vec<Setting>> {
        Ok(self.db.settings().all().await?)
    }

    /// One setting's value.
    pub async fn get(&self, key: &str) -> ServiceResult<Option<serde_json::Value>> {
        Ok(self.db.settings().get(key).await?)
    }

    /// Upserts a setting and queues the change for remote upsert, in one
    /// transaction. Known tuning keys are range-checked first.
    pub async fn update(&self, key: &str, value: serde_json::Value) -> ServiceResult<()> {
        match key {
            "activeDaysPerWeek" => validate_active_days(value.as_i64().unwrap_or(-1))?,
            "safetyMarginPercent" => validate_percentage(value.as_i64().unwrap_or(-1))?,
            _ => {}
        }

        let mut tx = self.db.pool().begin().await.map_err(cantina_db::DbError::from)?;
        SettingRepository::set_in(&mut tx, key, &value).await?;
        PendingOpRepository::enqueue_in(
            &mut tx,
            SyncTable::Settings,
            QueueAction::Upsert,
            &json!({ "key": key, "value": value }),
        )
        .await?;
        tx.commit().await.map_err(cantina_db::DbError::from)?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cantina_db::DbConfig;

    #[tokio::test]
    async fn test_update_persists_and_queues() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let svc = SettingsService::new(db.clone());

        svc.update("activeDaysPerWeek", serde_json::json!(5)).await.unwrap();

        assert_eq!(svc.get("activeDaysPerWeek").await.unwrap(), Some(serde_json::json!(5)));

        let ops = db.pending().all().await.unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].target, SyncTable::Settings);
        assert_eq!(ops[0].action, QueueAction::Upsert);
    }

    #[tokio::test]
    async fn test_known_keys_are_range_checked() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let svc = SettingsService::new(db.clone());

        assert!(svc.update("activeDaysPerWeek", serde_json::json!(8)).await.is_err());
        assert!(svc.update("safetyMarginPercent", serde_json::json!(-5)).await.is_err());
        assert!(svc.update("safetyMarginPercent", serde_json::json!("x")).await.is_err());
        // Nothing persisted or queued.
        assert_eq!(db.pending().count().await.unwrap(), 0);

        // Unknown keys pass through unvalidated.
        assert!(svc.update("theme", serde_json::json!("dark")).await.is_ok());
    }
}
