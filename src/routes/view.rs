use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::app::SharedApp;
use crate::error::Result;
use crate::models::ViewInfo;

pub fn routes(app: SharedApp) -> Router {
    Router::new()
        .route("/api/v1/view", get(get_view))
        .route("/api/v1/view/select", post(select_repo))
        .route("/api/v1/view/back", post(back_to_list))
        .with_state(app)
}

async fn get_view(State(app): State<SharedApp>) -> Result<Json<ViewInfo>> {
    Ok(Json(app.view()?))
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    name: String,
}

/// Switch to the detail view for a known repository; 404 otherwise.
async fn select_repo(
    State(app): State<SharedApp>,
    Json(body): Json<SelectBody>,
) -> Result<Json<ViewInfo>> {
    Ok(Json(app.select_repo(&body.name)?))
}

async fn back_to_list(State(app): State<SharedApp>) -> Result<Json<ViewInfo>> {
    Ok(Json(app.back_to_list()?))
}
