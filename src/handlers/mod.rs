use axum::{Json, response::IntoResponse};
use serde_json::json;

pub mod transactions;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
