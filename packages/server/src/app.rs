use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::routes;
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    routes::create_routes(state).route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
