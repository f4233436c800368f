//! Thin typed wrapper over the GitHub REST API.
//!
//! Contract (shared by every fetch):
//! - 404 on a singular resource is absence, returned as `None`
//! - 404 on a list resource degrades to an empty vec, never an absent
//!   collection
//! - any other non-2xx raises `AppError::Api` carrying the server's
//!   `message` field when the body is parseable, else a generic
//!   status-based message
//! - 2xx bodies that do not match the expected schema fail fast with
//!   `AppError::Decode`
//!
//! The request timeout configured at construction is the deadline for every
//! network suspension point; no call can hang past it.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{GithubRepo, GithubUser, ReadmeData, RepoEntry};

pub const API_BASE_URL: &str = "https://api.github.com";

/// Fixed page size for the repository list; no further pagination.
const REPOS_PER_PAGE: u32 = 100;

pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(API_BASE_URL, timeout)
    }

    /// Build a client against an alternate base URL (used by tests).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        // GitHub rejects requests without a User-Agent.
        let http = reqwest::Client::builder()
            .user_agent(concat!("showcase-viewer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_user(&self, login: &str) -> Result<Option<GithubUser>> {
        self.get_optional(&format!("/users/{}", login), "user profile")
            .await
    }

    /// Repositories sorted by last update, newest first, one fixed page.
    pub async fn fetch_repos(&self, login: &str) -> Result<Vec<GithubRepo>> {
        let path = format!("/users/{}/repos?sort=updated&per_page={}", login, REPOS_PER_PAGE);
        let repos = self.get_optional(&path, "repository list").await?;
        Ok(repos.unwrap_or_default())
    }

    /// Decoded README text, or `None` when the repository has no README
    /// (or the payload is not base64-encoded).
    pub async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<Option<String>> {
        let path = format!("/repos/{}/{}/readme", owner, repo);
        let readme: Option<ReadmeData> = self.get_optional(&path, "readme").await?;

        match readme {
            Some(data) if data.encoding == "base64" => decode_base64(&data.content).map(Some),
            _ => Ok(None),
        }
    }

    /// Root directory listing; empty when the repository has no contents.
    pub async fn fetch_contents(&self, owner: &str, repo: &str) -> Result<Vec<RepoEntry>> {
        let path = format!("/repos/{}/{}/contents", owner, repo);
        let entries = self.get_optional(&path, "directory listing").await?;
        Ok(entries.unwrap_or_default())
    }

    /// Raw file body from an arbitrary `download_url`. No absence case here:
    /// any non-success status is a failure.
    pub async fn fetch_raw_file(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AppError::Api {
                status: status.as_u16(),
                message: format!("Failed to fetch file content from {}", url),
            });
        }

        Ok(response.text().await?)
    }

    /// GET a JSON resource; `Ok(None)` on 404, typed error otherwise.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        context: &'static str,
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::Api {
                status: status.as_u16(),
                message: api_error_message(&body, status.as_u16()),
            });
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| AppError::Decode { context, source })
    }
}

/// Pull the server's `message` field out of an error body, falling back to a
/// generic status-based message.
fn api_error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| format!("API request failed with status {}", status))
}

/// Decode a base64 payload as GitHub emits it: line-wrapped, so ASCII
/// whitespace is stripped before decoding.
pub fn decode_base64(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| AppError::Internal(format!("Invalid base64 content: {}", e)))?;

    String::from_utf8(bytes).map_err(|_| AppError::Internal("File is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_server_message() {
        let body = r#"{"message": "API rate limit exceeded", "documentation_url": "..."}"#;
        assert_eq!(api_error_message(body, 403), "API rate limit exceeded");
    }

    #[test]
    fn error_message_falls_back_on_unparseable_body() {
        assert_eq!(
            api_error_message("<html>bad gateway</html>", 502),
            "API request failed with status 502"
        );
        assert_eq!(
            api_error_message(r#"{"no_message": true}"#, 500),
            "API request failed with status 500"
        );
    }

    #[test]
    fn decodes_line_wrapped_base64() {
        // GitHub wraps content at 60 chars with embedded newlines.
        let wrapped = "cHJpbnQoImhlbGxv\nIHdvcmxkIik=\n";
        assert_eq!(decode_base64(wrapped).unwrap(), r#"print("hello world")"#);
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(decode_base64("not!!valid@@base64").is_err());
    }
}
