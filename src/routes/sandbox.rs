//! Sandbox lifecycle endpoints.
//!
//! - POST   /api/v1/sandbox/open  — boot runtime + load the entry file
//! - GET    /api/v1/sandbox       — phase, code, notice, output snapshot
//! - POST   /api/v1/sandbox/run   — guarded execution; 409 while in flight
//! - DELETE /api/v1/sandbox       — drop the session
//!
//! A bootstrap failure is terminal: status and run report 503 until a new
//! open replaces the slot. User-code failures are never errors here — they
//! come back as output lines in the status snapshot.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::app::SharedApp;
use crate::error::Result;
use crate::models::SandboxStatus;

pub fn routes(app: SharedApp) -> Router {
    Router::new()
        .route("/api/v1/sandbox/open", post(open_sandbox))
        .route("/api/v1/sandbox", get(get_sandbox).delete(close_sandbox))
        .route("/api/v1/sandbox/run", post(run_sandbox))
        .with_state(app)
}

#[derive(Debug, Deserialize)]
struct OpenBody {
    repo: String,
}

async fn open_sandbox(
    State(app): State<SharedApp>,
    Json(body): Json<OpenBody>,
) -> Result<Json<SandboxStatus>> {
    Ok(Json(app.open_sandbox(&body.repo).await?))
}

async fn get_sandbox(State(app): State<SharedApp>) -> Result<Json<SandboxStatus>> {
    Ok(Json(app.sandbox_status().await?))
}

async fn run_sandbox(State(app): State<SharedApp>) -> Result<Json<SandboxStatus>> {
    Ok(Json(app.run_sandbox().await?))
}

async fn close_sandbox(State(app): State<SharedApp>) -> Result<()> {
    app.close_sandbox().await;
    Ok(())
}
