use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::SimState;

pub fn routes() -> Router<SimState> {
    Router::new().route("/api/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
