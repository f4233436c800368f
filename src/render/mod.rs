//! README rendering pipeline.
//!
//! Raw markdown in, sanitized HTML fragment out. Image references are
//! resolved against the repository's raw-content URL before sanitization;
//! the sanitizer runs on every render with no bypass path.

mod markdown;

pub use markdown::{ReadmeRenderer, DEFAULT_BRANCH, README_MISSING_HTML, RAW_CONTENT_HOST};
