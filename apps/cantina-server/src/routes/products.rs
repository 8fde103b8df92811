//! `/products` handlers: the authoritative catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const COLUMNS: &str = "id, name, unit, current_stock, is_active, created_at";

/// A catalog row as served over the wire.
#[derive(Debug, Serialize, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub current_stock: i64,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    name: String,
    #[serde(default = "default_unit")]
    unit: String,
}

fn default_unit() -> String {
    "unit".to_string()
}

/// `GET /products` - the full catalog, alphabetical.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductRow>>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {COLUMNS} FROM products ORDER BY name ASC"
    ))
    .fetch_all(state.db.pool())
    .await?;

    Ok(Json(rows))
}

/// `POST /products` - registers a product at stock 0. Stores report stock
/// through `/movements`, never at creation.
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<ProductRow>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidRequest("Name is required".to_string()));
    }

    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products (name, unit, current_stock, is_active, created_at) \
         VALUES (?1, ?2, 0, 1, ?3) \
         RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(body.unit.trim())
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_one(state.db.pool())
    .await?;

    info!(id = row.id, name = %row.name, "Product registered");
    Ok((StatusCode::CREATED, Json(row)))
}
