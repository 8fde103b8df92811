//! HTTP route handlers.

pub mod movements;
pub mod products;
pub mod settings;
pub mod workdays;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// Builds the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/movements",
            get(movements::list_movements).post(movements::record_movement),
        )
        .route(
            "/workdays",
            get(workdays::list_workdays).post(workdays::apply_workday_action),
        )
        .route(
            "/settings",
            get(settings::list_settings).post(settings::upsert_setting),
        )
        .with_state(state)
}

/// `GET /ping` - connectivity probe; never touches the database.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "pong" }))
}

/// `GET /health` - connectivity probe including a database round trip.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = state.db.health_check().await;
    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
    }))
}
