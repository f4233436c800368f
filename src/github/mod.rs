//! GitHub REST API gateway.
//!
//! `GithubClient` is the only module that talks to the network; everything
//! above it consumes typed results. Absence (404) and failure (any other
//! non-2xx) are kept strictly apart — see `error.rs`.

mod client;

pub use client::{decode_base64, GithubClient, API_BASE_URL};
