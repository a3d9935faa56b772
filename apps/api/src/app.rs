//! Application assembly: shared state and the top-level router.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use motowash_db::Database;

use crate::routes;

/// Shared application state.
///
/// `Database` is itself a cheap clone over a pool, so one `Arc` layer
/// is all the handlers need.
pub struct AppState {
    pub db: Database,
}

/// Builds the full application router.
///
/// The same router serves production and tests; tests bind it to an
/// ephemeral port over an in-memory database.
pub fn build_app(db: Database) -> Router {
    let state = Arc::new(AppState { db });

    Router::new()
        .route("/health", get(health))
        .nest("/api", routes::api_router())
        .layer(Extension(state))
}

/// Liveness + database reachability.
async fn health(
    Extension(state): Extension<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "database unavailable" })),
        )
    }
}
