//! View-state and status DTOs.
//!
//! - `ViewInfo`: which of the two views is active (detail always carries
//!   its selected repository)
//! - `ReadmeResponse`: sanitized README HTML for the detail view
//! - `StatusInfo`: app status (header display / health check)

use serde::{Deserialize, Serialize};

use crate::models::GithubRepo;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "view")]
pub enum ViewInfo {
    List,
    Detail { selected: GithubRepo },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeResponse {
    /// Sanitized HTML fragment, or the fixed placeholder when no README
    /// exists for the repository.
    pub html: String,
    pub found: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub login: String,
    pub repo_count: usize,
    pub uptime_secs: u64,
    pub version: String,
}
