//! Service banner.

use axum::Json;
use axum::Router;
use axum::routing::get;
use serde_json::{Value, json};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET /: service name, status and endpoint list.
async fn index() -> Json<Value> {
    Json(json!({
        "message": "API Calculadora Tributária - Backend",
        "status": "online",
        "endpoints": {
            "/tables/status": "GET - Status das tabelas fiscais",
            "/upload_tables": "POST - Upload de tabelas customizadas",
            "/compare": "POST - Comparar cenários tributários",
        }
    }))
}
