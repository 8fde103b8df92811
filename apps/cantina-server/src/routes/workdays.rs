//! `/workdays` handlers: the single-open-workday arbiter.
//!
//! This is the only place in the whole system where the one-open-workday
//! invariant is enforced across stores. The open path is a transactional
//! check-then-insert; a concurrent second open loses with a 409 whose body
//! the clients surface as "who holds the lock".

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const COLUMNS: &str =
    "id, date, status, opening_stock, closing_stock, opened_at, closed_at, responsible_person";

const DEFAULT_LIMIT: i64 = 30;

/// A workday row as stored: snapshot columns are JSON text.
#[derive(Debug, FromRow)]
struct WorkdayRow {
    id: i64,
    date: String,
    status: String,
    opening_stock: String,
    closing_stock: Option<String>,
    opened_at: Option<String>,
    closed_at: Option<String>,
    responsible_person: String,
}

/// A workday as served: snapshot columns decoded into JSON objects so store
/// clients read `opening_stock` as an id → level map, not a string.
#[derive(Debug, Serialize)]
pub struct ApiWorkday {
    pub id: i64,
    pub date: String,
    pub status: String,
    pub opening_stock: Value,
    pub closing_stock: Option<Value>,
    pub opened_at: Option<String>,
    pub closed_at: Option<String>,
    pub responsible_person: String,
}

impl WorkdayRow {
    fn into_api(self) -> ApiResult<ApiWorkday> {
        Ok(ApiWorkday {
            id: self.id,
            date: self.date,
            status: self.status,
            opening_stock: serde_json::from_str(&self.opening_stock)?,
            closing_stock: self
                .closing_stock
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            opened_at: self.opened_at,
            closed_at: self.closed_at,
            responsible_person: self.responsible_person,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WorkdayQuery {
    status: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkdayAction {
    action: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    responsible_person: Option<String>,
    #[serde(default)]
    opening_stock: Option<Value>,
    #[serde(default)]
    closing_stock: Option<Value>,
}

/// `GET /workdays?status=open` - the open row or `null` (a definitive "no
/// one holds the lock"). `GET /workdays?limit=N` - recent history.
pub async fn list_workdays(
    State(state): State<AppState>,
    Query(query): Query<WorkdayQuery>,
) -> ApiResult<Response> {
    if query.status.as_deref() == Some("open") {
        let row = sqlx::query_as::<_, WorkdayRow>(&format!(
            "SELECT {COLUMNS} FROM workdays WHERE status = 'open' LIMIT 1"
        ))
        .fetch_optional(state.db.pool())
        .await?;

        let open = row.map(WorkdayRow::into_api).transpose()?;
        return Ok(Json(open).into_response());
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let rows = sqlx::query_as::<_, WorkdayRow>(&format!(
        "SELECT {COLUMNS} FROM workdays ORDER BY id DESC LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(state.db.pool())
    .await?;

    let workdays = rows
        .into_iter()
        .map(WorkdayRow::into_api)
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(workdays).into_response())
}

/// `POST /workdays` - `action: "open"` or `action: "close"`.
pub async fn apply_workday_action(
    State(state): State<AppState>,
    Json(body): Json<WorkdayAction>,
) -> ApiResult<Response> {
    match body.action.as_str() {
        "open" => open_workday(state, body).await,
        "close" => close_workday(state, body).await,
        _ => Err(ApiError::InvalidRequest("Invalid action".to_string())),
    }
}

async fn open_workday(state: AppState, body: WorkdayAction) -> ApiResult<Response> {
    let date = body
        .date
        .ok_or_else(|| ApiError::InvalidRequest("date is required".to_string()))?;
    let responsible = body
        .responsible_person
        .ok_or_else(|| ApiError::InvalidRequest("responsiblePerson is required".to_string()))?;
    let opening_stock = body.opening_stock.unwrap_or_else(|| Value::Object(Default::default()));

    let mut tx = state.db.pool().begin().await?;

    let already_open: Option<i64> =
        sqlx::query_scalar("SELECT id FROM workdays WHERE status = 'open'")
            .fetch_optional(&mut *tx)
            .await?;

    if already_open.is_some() {
        return Err(ApiError::Conflict(
            "There is already an open workday".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, WorkdayRow>(&format!(
        "INSERT INTO workdays (date, status, opening_stock, opened_at, responsible_person) \
         VALUES (?1, 'open', ?2, ?3, ?4) \
         RETURNING {COLUMNS}"
    ))
    .bind(&date)
    .bind(serde_json::to_string(&opening_stock)?)
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(&responsible)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(id = row.id, %date, %responsible, "Workday opened");
    Ok((StatusCode::CREATED, Json(row.into_api()?)).into_response())
}

async fn close_workday(state: AppState, body: WorkdayAction) -> ApiResult<Response> {
    let closing_stock = body.closing_stock.unwrap_or_else(|| Value::Object(Default::default()));

    let row = sqlx::query_as::<_, WorkdayRow>(&format!(
        "UPDATE workdays \
         SET status = 'closed', closed_at = ?1, closing_stock = ?2 \
         WHERE status = 'open' \
         RETURNING {COLUMNS}"
    ))
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(serde_json::to_string(&closing_stock)?)
    .fetch_optional(state.db.pool())
    .await?;

    match row {
        Some(row) => {
            info!(id = row.id, "Workday closed");
            Ok(Json(row.into_api()?).into_response())
        }
        None => Err(ApiError::NotFound("No open workday to close".to_string())),
    }
}
