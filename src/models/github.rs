//! Wire types for the GitHub REST API.
//!
//! Responses are deserialized into these structs at the gateway boundary so
//! that malformed payloads fail fast with a decoding error instead of
//! propagating half-formed shapes downstream. Unknown fields are ignored;
//! fields the API documents as nullable are `Option`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub user profile (`GET /users/{login}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
}

/// A repository summary (`GET /users/{login}/repos`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub watchers_count: u32,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub homepage: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// A root directory-listing entry (`GET /repos/{owner}/{repo}/contents`).
///
/// Inline `content` is only present for small files; larger ones expose a
/// `download_url` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub size: Option<u64>,
    pub download_url: Option<String>,
    pub content: Option<String>,
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// The README content wrapper (`GET /repos/{owner}/{repo}/readme`).
///
/// Transient: exists only while decoding, discarded once the text is out.
#[derive(Debug, Deserialize)]
pub struct ReadmeData {
    pub name: String,
    pub path: String,
    pub content: String,
    pub encoding: String,
}
