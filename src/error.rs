//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for all error conditions and implements Axum's
//! `IntoResponse` to automatically convert errors to appropriate HTTP responses
//! with JSON error bodies.
//!
//! A 404 from the GitHub API is *not* an `AppError` — singular resources that
//! may legitimately be missing (user profile, README) surface as `Option::None`
//! and list resources degrade to an empty vec. Everything below models genuine
//! failures.
//!
//! Error mappings:
//! - `NotFound` → 404
//! - `BadRequest` → 400
//! - `RunInFlight` → 409
//! - `Http`, `Api`, `Decode` → 502
//! - `SandboxUnavailable` → 503
//! - `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Transport-level failure talking to the GitHub API.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx, non-404 response from the GitHub API, carrying the
    /// server-provided message when one was present.
    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// A 2xx response whose body did not match the expected schema.
    #[error("Malformed {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Sandbox runtime bootstrap failed; terminal for the session.
    #[error("Sandbox unavailable: {0}")]
    SandboxUnavailable(String),

    /// A sandbox run was triggered while a previous one is still in flight.
    #[error("A run is already in progress")]
    RunInFlight,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Http(e) => (StatusCode::BAD_GATEWAY, format!("Request failed: {}", e)),
            AppError::Api { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Decode { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Not found: {}", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid request: {}", msg))
            }
            AppError::SandboxUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Sandbox unavailable: {}", msg),
            ),
            AppError::RunInFlight => (StatusCode::CONFLICT, self.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
