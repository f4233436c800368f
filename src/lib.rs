//! GitHub profile showcase viewer.
//!
//! Fetches a user's profile and repositories from the GitHub REST API,
//! renders repository READMEs as sanitized HTML, and runs a repository's
//! Python entry file in a local sandbox — all behind a small JSON API with
//! an embedded frontend.

pub mod app;
pub mod error;
pub mod github;
pub mod models;
pub mod render;
pub mod routes;
pub mod sandbox;
