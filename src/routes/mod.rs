//! API route handlers - maps HTTP endpoints to application state operations.
//!
//! Each submodule defines routes for a feature area:
//! - `profile`: User profile and repository list (+ atomic reload)
//! - `view`: List/detail view state machine
//! - `readme`: Rendered, sanitized README for one repository
//! - `sandbox`: Python sandbox lifecycle (open/status/run/close)
//! - `status`: App status

pub mod profile;
pub mod readme;
pub mod sandbox;
pub mod status;
pub mod view;

use axum::Router;

use crate::app::SharedApp;

pub fn create_router(app: SharedApp) -> Router {
    Router::new()
        .merge(profile::routes(app.clone()))
        .merge(view::routes(app.clone()))
        .merge(readme::routes(app.clone()))
        .merge(sandbox::routes(app.clone()))
        .merge(status::routes(app))
}
