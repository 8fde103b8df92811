//! `/settings` handlers: shared key → JSON value configuration.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, FromRow)]
struct SettingRow {
    key: String,
    value: String,
    updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ApiSetting {
    pub key: String,
    pub value: Value,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertSetting {
    key: String,
    value: Value,
}

/// `GET /settings` - the full configuration as a key → value map.
pub async fn list_settings(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let rows = sqlx::query_as::<_, SettingRow>("SELECT key, value, updated_at FROM settings")
        .fetch_all(state.db.pool())
        .await?;

    let mut map = Map::new();
    for row in rows {
        map.insert(row.key, serde_json::from_str(&row.value)?);
    }

    Ok(Json(Value::Object(map)))
}

/// `POST /settings` - upserts one key.
pub async fn upsert_setting(
    State(state): State<AppState>,
    Json(body): Json<UpsertSetting>,
) -> ApiResult<Json<ApiSetting>> {
    if body.key.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Key is required".to_string()));
    }

    let row = sqlx::query_as::<_, SettingRow>(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3) \
         ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at \
         RETURNING key, value, updated_at",
    )
    .bind(body.key.trim())
    .bind(serde_json::to_string(&body.value)?)
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_one(state.db.pool())
    .await?;

    Ok(Json(ApiSetting {
        key: row.key,
        value: serde_json::from_str(&row.value)?,
        updated_at: row.updated_at,
    }))
}
