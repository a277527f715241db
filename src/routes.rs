use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::handlers;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/chat/agents/sql", post(handlers::sql_agent_chat))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
