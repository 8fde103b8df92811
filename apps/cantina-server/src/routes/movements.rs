//! `/movements` handlers: the replicated stock ledger.
//!
//! A POSTed movement is a stock DELTA: the row insert and the
//! `current_stock += quantity` update commit in one transaction, so the
//! aggregate and the log can never disagree. Store clients must therefore
//! never replay their informational opening/closing snapshots here.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ApiResult;
use crate::AppState;

const COLUMNS: &str = "id, product_id, date, time, type, quantity, notes, created_at";

const DEFAULT_LIMIT: i64 = 50;

/// A ledger row as served over the wire.
#[derive(Debug, Serialize, FromRow)]
pub struct MovementRow {
    pub id: i64,
    pub product_id: i64,
    pub date: String,
    pub time: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: i64,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMovement {
    product_id: i64,
    #[serde(rename = "type")]
    kind: String,
    quantity: i64,
    date: String,
    time: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    limit: Option<i64>,
}

/// `GET /movements?limit=N` - newest first.
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> ApiResult<Json<Vec<MovementRow>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(1);

    let rows = sqlx::query_as::<_, MovementRow>(&format!(
        "SELECT {COLUMNS} FROM movements ORDER BY created_at DESC, id DESC LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(state.db.pool())
    .await?;

    Ok(Json(rows))
}

/// `POST /movements` - applies the delta and logs the row atomically.
///
/// An unknown `productId` trips the foreign key on the insert; the 500 body
/// carries SQLite's constraint message, which push clients treat as a
/// terminal rejection.
pub async fn record_movement(
    State(state): State<AppState>,
    Json(body): Json<RecordMovement>,
) -> ApiResult<(StatusCode, Json<MovementRow>)> {
    let mut tx = state.db.pool().begin().await?;

    sqlx::query("UPDATE products SET current_stock = current_stock + ?1 WHERE id = ?2")
        .bind(body.quantity)
        .bind(body.product_id)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query_as::<_, MovementRow>(&format!(
        "INSERT INTO movements (product_id, date, time, type, quantity, notes, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         RETURNING {COLUMNS}"
    ))
    .bind(body.product_id)
    .bind(&body.date)
    .bind(&body.time)
    .bind(&body.kind)
    .bind(body.quantity)
    .bind(&body.notes)
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(row)))
}
