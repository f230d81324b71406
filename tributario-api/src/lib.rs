//! # tributario-api: HTTP service for the regime comparison
//!
//! | Route                     | Module                  |
//! |---------------------------|-------------------------|
//! | `GET /`                   | [`routes::index`]       |
//! | `GET /tables/status`      | [`routes::tables`]      |
//! | `POST /upload_tables`     | [`routes::tables`]      |
//! | `POST /compare`           | [`routes::compare`]     |
//! | `GET /health/liveness`    | this module             |
//! | `GET /health/readiness`   | this module             |

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use crate::error::AppError;
pub use crate::state::AppState;

/// Upper bound on request bodies; table bundles are the largest payloads.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::index::router())
        .merge(routes::tables::router())
        .merge(routes::compare::router())
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 "ready" once a table set is loaded, 503 before.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if !state.has_tables() {
        return (StatusCode::SERVICE_UNAVAILABLE, "no tax tables loaded").into_response();
    }
    (StatusCode::OK, "ready").into_response()
}
