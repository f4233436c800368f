use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::app::SharedApp;
use crate::error::Result;
use crate::models::{GithubRepo, GithubUser};

pub fn routes(app: SharedApp) -> Router {
    Router::new()
        .route("/api/v1/profile", get(get_profile))
        .route("/api/v1/profile/reload", post(reload_profile))
        .route("/api/v1/repos", get(get_repos))
        .with_state(app)
}

async fn get_profile(State(app): State<SharedApp>) -> Result<Json<GithubUser>> {
    Ok(Json(app.user()?))
}

/// Repositories with the profile-readme entry already filtered out.
async fn get_repos(State(app): State<SharedApp>) -> Result<Json<Vec<GithubRepo>>> {
    Ok(Json(app.repos()?))
}

/// Refetch user + repos concurrently; commits both or neither.
async fn reload_profile(State(app): State<SharedApp>) -> Result<Json<GithubUser>> {
    app.load().await?;
    Ok(Json(app.user()?))
}
