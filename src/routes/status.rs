//! App status endpoint.
//!
//! GET /api/v1/status
//!
//! Returns the configured login, filtered repo count, uptime, and version.

use axum::{extract::State, routing::get, Json, Router};

use crate::app::SharedApp;
use crate::error::Result;
use crate::models::StatusInfo;

pub fn routes(app: SharedApp) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .with_state(app)
}

async fn get_status(State(app): State<SharedApp>) -> Result<Json<StatusInfo>> {
    Ok(Json(StatusInfo {
        login: app.login.clone(),
        repo_count: app.repos()?.len(),
        uptime_secs: app.uptime_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
