//! # Table Management API
//!
//! Routes:
//! - GET  /tables/status: metadata of every loaded table set
//! - POST /upload_tables: replace the active set with a JSON bundle

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;
use tributario_core::TableMeta;
use tributario_data::TableLoader;

use crate::error::AppError;
use crate::state::AppState;

/// Source recorded for bundles received through `/upload_tables`.
pub const UPLOAD_SOURCE: &str = "upload";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tables/status", get(status))
        .route("/upload_tables", post(upload))
}

/// GET /tables/status
async fn status(State(state): State<AppState>) -> Json<BTreeMap<String, TableMeta>> {
    Json(state.table_status())
}

/// POST /upload_tables
///
/// The body is parsed into a typed table set before it replaces the active
/// one; a body that is not a JSON object, or that carries no table at all,
/// leaves the current set in place.
async fn upload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest(
            "request body must be a JSON table bundle".to_string(),
        ));
    }

    let tables = TableLoader::parse_json(body.as_ref())
        .map_err(|err| AppError::BadRequest(err.to_string()))?;
    if tables.is_empty() {
        return Err(AppError::BadRequest("table bundle contains no tables".to_string()));
    }

    let annexes = tables.annexes().count();
    state.replace_tables(tables, UPLOAD_SOURCE);
    info!(annexes, bytes = body.len(), "replaced tables from upload");

    Ok(Json(UploadResponse { ok: true }))
}
