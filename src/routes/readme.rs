//! Rendered README endpoint.
//!
//! GET /api/v1/repos/{name}/readme
//!
//! Fetches the repository's README, renders it through the markdown pipeline
//! (image-link resolution + sanitization), and returns the HTML fragment.
//! Absence is not an error: a repository without a README gets the fixed
//! placeholder fragment with `found: false`.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::app::SharedApp;
use crate::error::Result;
use crate::models::ReadmeResponse;
use crate::render::{ReadmeRenderer, README_MISSING_HTML};

pub fn routes(app: SharedApp) -> Router {
    Router::new()
        .route("/api/v1/repos/{name}/readme", get(get_readme))
        .with_state(app)
}

async fn get_readme(
    State(app): State<SharedApp>,
    Path(name): Path<String>,
) -> Result<Json<ReadmeResponse>> {
    // Unknown repositories 404 before any fetch.
    let repo = app.find_repo(&name)?;

    let readme = app.client().fetch_readme(&app.login, &repo.name).await?;
    let renderer = ReadmeRenderer::new(app.login.as_str(), repo.name.as_str());

    Ok(Json(to_response(readme, &renderer)))
}

/// Sanitized markdown when a README exists, the fixed placeholder when not.
fn to_response(readme: Option<String>, renderer: &ReadmeRenderer) -> ReadmeResponse {
    match readme {
        Some(markdown) => ReadmeResponse {
            html: renderer.render(&markdown),
            found: true,
        },
        None => ReadmeResponse {
            html: README_MISSING_HTML.to_string(),
            found: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_readme_yields_exactly_the_placeholder() {
        let renderer = ReadmeRenderer::new("alice", "tool-x");
        let response = to_response(None, &renderer);
        assert!(!response.found);
        assert_eq!(response.html, README_MISSING_HTML);
    }

    #[test]
    fn present_readme_is_rendered_and_sanitized() {
        let renderer = ReadmeRenderer::new("alice", "tool-x");
        let response = to_response(Some("# Hi\n\n<script>x()</script>".to_string()), &renderer);
        assert!(response.found);
        assert!(response.html.contains("<h1"));
        assert!(!response.html.contains("<script"));
    }
}
