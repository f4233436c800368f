//! Sandbox session DTOs.

use serde::{Deserialize, Serialize};

/// Where a sandbox session currently sits in its lifecycle.
///
/// Bootstrap states are not represented here: a session only exists after the
/// runtime booted successfully, and a failed bootstrap is recorded as a
/// terminal error slot instead of a session. `Running` rejects re-entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Runtime booted, no runnable source loaded.
    RuntimeReady,
    /// Source text cached and ready to execute.
    SourceReady,
    /// An execution is in flight.
    Running,
}

/// Point-in-time snapshot of a sandbox session, serialized for the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxStatus {
    pub repo: String,
    pub phase: SessionPhase,
    /// Loaded source text, if an entry file was found.
    pub code: Option<String>,
    /// Human-readable note when no source could be loaded
    /// (no candidate file, or its content was not accessible).
    pub notice: Option<String>,
    /// Captured output lines in emission order.
    pub output: Vec<String>,
}
