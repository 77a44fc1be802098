use axum::{
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::handlers;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Translation UI
        .route("/", get(homepage))
        // REST API
        .route("/translate", post(handlers::translate))
        .route("/api/health", get(health_check))
}

async fn homepage() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}
