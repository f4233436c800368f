//! Data transfer objects (DTOs) for API payloads.
//!
//! - `github`: Wire types deserialized from the GitHub REST API
//!   (GithubUser, GithubRepo, RepoEntry, ReadmeData)
//! - `sandbox`: Sandbox session phase and status snapshot
//! - `view`: View-state, status, and rendered-README responses

pub mod github;
pub mod sandbox;
pub mod view;

pub use github::*;
pub use sandbox::*;
pub use view::*;
